//! Media playback capability.
//!
//! The player surface drives audio through these traits without knowing how
//! it is decoded or rendered. A backend opens one [`MediaElement`] per episode;
//! the element reports what actually happens through [`MediaEvent`]s on the
//! channel it was opened with.

use crate::episode::Episode;
use crate::error::Result;
use std::time::Duration;
use tokio::sync::mpsc;

/// Notifications sent by a media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration is known and playback can be positioned
    MetadataReady { duration: Duration },
    /// Periodic position report while playing
    TimeUpdate { current_time: f64 },
    /// Playback started (or resumed)
    Played,
    /// Playback paused
    Paused,
    /// The end of the audio was reached
    Ended,
}

/// Sending half handed to a backend when an element is opened
pub type MediaEventSender = mpsc::UnboundedSender<MediaEvent>;

/// Receiving half kept by the player surface for the current element
pub type MediaEventReceiver = mpsc::UnboundedReceiver<MediaEvent>;

/// A loaded audio resource.
///
/// Commands are fire-and-forget: the element confirms through
/// [`MediaEvent::Played`] and [`MediaEvent::Paused`].
pub trait MediaElement: Send {
    /// Start or resume playback
    ///
    /// # Errors
    ///
    /// Returns an error if the element refuses to play.
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot pause.
    fn pause(&mut self) -> Result<()>;

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Move the playback position
    fn set_current_time(&mut self, seconds: f64);
}

/// Opens media elements for episodes.
pub trait MediaBackend: Send + Sync {
    /// The element type this backend produces
    type Element: MediaElement;

    /// Open the audio of `episode`, reporting through `events`.
    ///
    /// Dropping the returned element releases the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the audio cannot be opened.
    fn open(&self, episode: &Episode, events: MediaEventSender) -> Result<Self::Element>;
}
