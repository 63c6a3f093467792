//! Playback queue state machine.
//!
//! Holds the episodes eligible for sequential playback, the position of the
//! loaded episode, and the playing/looping/shuffling flags. The queue is only
//! ever replaced wholesale; navigation moves the index.
//!
//! Invariants:
//! - `current_index`, when set, indexes into `episodes`
//! - an empty queue has no current index and is never playing

use crate::episode::Episode;
use crate::error::{CoreError, Result};
use rand::Rng;

/// Queue contents plus playback flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackQueue {
    episodes: Vec<Episode>,
    current_index: Option<usize>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
}

impl PlaybackQueue {
    /// Create an empty queue (nothing selected)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a single episode and start playing it.
    pub fn play_episode(&mut self, episode: Episode) {
        self.episodes = vec![episode];
        self.current_index = Some(0);
        self.is_playing = true;
    }

    /// Replace the queue with `episodes` and start playing at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QueueIndexOutOfRange`] if `index` is not a valid
    /// position in `episodes`; the queue is left untouched.
    pub fn play_list(&mut self, episodes: Vec<Episode>, index: usize) -> Result<()> {
        if index >= episodes.len() {
            return Err(CoreError::QueueIndexOutOfRange {
                index,
                len: episodes.len(),
            });
        }

        self.episodes = episodes;
        self.current_index = Some(index);
        self.is_playing = true;
        Ok(())
    }

    /// Flip the playing flag. Does nothing while the queue is empty.
    pub fn toggle_play(&mut self) {
        if self.current_index.is_some() {
            self.is_playing = !self.is_playing;
        }
    }

    /// Set the playing flag to match what the media capability reports.
    ///
    /// Returns `true` if the flag changed. Ignored while the queue is empty.
    pub fn set_playing_state(&mut self, is_playing: bool) -> bool {
        if self.current_index.is_none() || self.is_playing == is_playing {
            return false;
        }
        self.is_playing = is_playing;
        true
    }

    /// Flip the looping flag
    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
    }

    /// Flip the shuffling flag
    pub fn toggle_shuffle(&mut self) {
        self.is_shuffling = !self.is_shuffling;
    }

    /// Advance to the next episode.
    ///
    /// While shuffling, picks a uniformly random index, which may be the
    /// current one. Otherwise moves forward by one when there is a next
    /// episode. Returns the new index, or `None` if nothing moved.
    pub fn play_next<R: Rng>(&mut self, rng: &mut R) -> Option<usize> {
        let current = self.current_index?;

        let next = if self.is_shuffling {
            rng.gen_range(0..self.episodes.len())
        } else if current + 1 < self.episodes.len() {
            current + 1
        } else {
            return None;
        };

        self.current_index = Some(next);
        Some(next)
    }

    /// Step back to the previous episode in queue order.
    ///
    /// Shuffle does not change this: the previous queue position is used when
    /// one exists. Returns the new index, or `None` if nothing moved.
    pub fn play_previous(&mut self) -> Option<usize> {
        let previous = self.current_index?.checked_sub(1)?;
        self.current_index = Some(previous);
        Some(previous)
    }

    /// Return to the empty state
    pub fn clear(&mut self) {
        self.episodes.clear();
        self.current_index = None;
        self.is_playing = false;
    }

    /// Whether a previous episode can be selected from the controls.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        !self.is_shuffling && self.current_index.is_some_and(|index| index > 0)
    }

    /// Whether a next episode can be selected from the controls.
    ///
    /// Always true while shuffling with an episode loaded.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_index
            .is_some_and(|index| self.is_shuffling || index + 1 < self.episodes.len())
    }

    /// Episode at the current index, if any
    #[must_use]
    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_index.and_then(|index| self.episodes.get(index))
    }

    #[must_use]
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.is_looping
    }

    #[must_use]
    pub const fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.episodes.len()
    }
}
