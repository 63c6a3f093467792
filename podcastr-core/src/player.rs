//! Player surface: binds the shared queue to a media capability.

use crate::context::{PlayerContext, PlayerEvent};
use crate::episode::Episode;
use crate::error::{CoreError, Result};
use crate::media::{MediaBackend, MediaElement, MediaEvent, MediaEventReceiver};
use crate::time::{whole_seconds, DurationExt};
use crate::view::PlayerView;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "podcastr::player";

/// Elapsed playback time shown by the progress display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub elapsed_secs: u64,
}

/// One unit of work for the player surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceInput {
    /// State change announced by the player context
    Player(PlayerEvent),
    /// Notification from the current media element
    Media(MediaEvent),
    /// Player events were dropped; state must be re-read
    Lagged(u64),
    /// The player context is gone
    Closed,
}

/// Episode currently opened in the media capability
struct LoadedEpisode<E> {
    episode: Episode,
    index: usize,
    element: E,
    media_rx: MediaEventReceiver,
    /// Set once metadata arrived; time updates are ignored before that
    tracking: bool,
    /// Last play/pause command sent to the element
    play_requested: bool,
}

/// Drives a [`MediaBackend`] from [`PlayerContext`] state and feeds media
/// notifications back into the context.
///
/// Inputs are handled one at a time: the surface owns the element of the
/// current episode and replaces it whenever the context loads another one.
pub struct PlayerSurface<B: MediaBackend> {
    context: Arc<PlayerContext>,
    backend: B,
    player_rx: broadcast::Receiver<PlayerEvent>,
    loaded: Option<LoadedEpisode<B::Element>>,
    progress: ProgressState,
}

impl<B: MediaBackend> PlayerSurface<B> {
    /// Create a surface subscribed to `context`.
    ///
    /// # Arguments
    /// * `context` - Shared playback state to observe and update
    /// * `backend` - Opens media elements for episodes
    pub fn new(context: Arc<PlayerContext>, backend: B) -> Self {
        let player_rx = context.subscribe();
        Self {
            context,
            backend,
            player_rx,
            loaded: None,
            progress: ProgressState::default(),
        }
    }

    /// Wait for the next input. Cancel safe.
    pub async fn next_input(&mut self) -> SurfaceInput {
        let player_rx = &mut self.player_rx;
        let loaded = &mut self.loaded;

        let media = async move {
            match loaded {
                Some(loaded) => loaded.media_rx.recv().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            event = player_rx.recv() => match event {
                Ok(event) => SurfaceInput::Player(event),
                Err(RecvError::Lagged(n)) => SurfaceInput::Lagged(n),
                Err(RecvError::Closed) => SurfaceInput::Closed,
            },
            Some(event) = media => SurfaceInput::Media(event),
        }
    }

    /// Handle everything already queued without waiting.
    ///
    /// Returns the number of inputs handled.
    pub async fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;

        loop {
            let input = match self.player_rx.try_recv() {
                Ok(event) => SurfaceInput::Player(event),
                Err(TryRecvError::Lagged(n)) => SurfaceInput::Lagged(n),
                Err(TryRecvError::Closed) => SurfaceInput::Closed,
                Err(TryRecvError::Empty) => {
                    match self.loaded.as_mut().map(|l| l.media_rx.try_recv()) {
                        Some(Ok(event)) => SurfaceInput::Media(event),
                        _ => return handled,
                    }
                }
            };

            handled += 1;
            if !self.handle(input).await {
                return handled;
            }
        }
    }

    /// Handle one input, logging failures.
    ///
    /// Returns `false` once the context is closed.
    pub async fn handle(&mut self, input: SurfaceInput) -> bool {
        let result = match input {
            SurfaceInput::Player(event) => self.handle_player_event(event),
            SurfaceInput::Media(event) => self.handle_media_event(event).await,
            SurfaceInput::Lagged(n) => {
                warn!(target: LOG_TARGET, "Missed {} player events, resyncing", n);
                self.resync().await
            }
            SurfaceInput::Closed => {
                info!(target: LOG_TARGET, "Player event channel closed");
                return false;
            }
        };

        if let Err(e) = result {
            warn!(target: LOG_TARGET, "Player surface error: {}", e);
        }
        true
    }

    /// React to a queue state change.
    ///
    /// # Errors
    ///
    /// Returns an error if the media capability rejects a command.
    pub fn handle_player_event(&mut self, event: PlayerEvent) -> Result<()> {
        match event {
            PlayerEvent::EpisodeChanged { episode, index, .. } => self.load(episode, index),
            PlayerEvent::PlayingChanged { is_playing } => {
                let Some(loaded) = self.loaded.as_mut() else {
                    return Ok(());
                };
                if loaded.play_requested == is_playing {
                    return Ok(());
                }
                loaded.play_requested = is_playing;
                if is_playing {
                    loaded.element.play()
                } else {
                    loaded.element.pause()
                }
            }
            PlayerEvent::Cleared => {
                self.unload();
                Ok(())
            }
            PlayerEvent::LoopingChanged { is_looping } => {
                debug!(target: LOG_TARGET, "Looping: {}", is_looping);
                Ok(())
            }
            PlayerEvent::ShufflingChanged { is_shuffling } => {
                debug!(target: LOG_TARGET, "Shuffling: {}", is_shuffling);
                Ok(())
            }
        }
    }

    /// React to a notification from the media element.
    ///
    /// # Errors
    ///
    /// Returns an error if restarting a looped episode fails.
    pub async fn handle_media_event(&mut self, event: MediaEvent) -> Result<()> {
        match event {
            MediaEvent::MetadataReady { duration } => {
                if let Some(loaded) = self.loaded.as_mut() {
                    debug!(
                        target: LOG_TARGET,
                        "Metadata ready for {} ({})", loaded.episode.id, duration.to_time_string()
                    );
                    loaded.element.set_current_time(0.0);
                    loaded.tracking = true;
                    self.progress.elapsed_secs = 0;
                }
            }
            MediaEvent::TimeUpdate { current_time } => {
                if self.loaded.as_ref().is_some_and(|l| l.tracking) {
                    self.progress.elapsed_secs = whole_seconds(current_time);
                }
            }
            MediaEvent::Played => self.context.set_playing_state(true).await,
            MediaEvent::Paused => self.context.set_playing_state(false).await,
            MediaEvent::Ended => return self.handle_ended().await,
        }
        Ok(())
    }

    async fn handle_ended(&mut self) -> Result<()> {
        if self.context.is_looping().await {
            if let Some(loaded) = self.loaded.as_mut() {
                debug!(target: LOG_TARGET, "Looping {}", loaded.episode.id);
                loaded.element.set_current_time(0.0);
                self.progress.elapsed_secs = 0;
                loaded.play_requested = true;
                loaded.element.play()?;
            }
            return Ok(());
        }

        if self.context.has_next().await {
            self.context.play_next().await;
        } else {
            info!(target: LOG_TARGET, "Reached the end of the queue");
            self.context.clear_player_state().await;
        }
        Ok(())
    }

    /// Jump to `amount` seconds into the current episode.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoEpisodeLoaded`] when the player is empty and
    /// [`CoreError::SeekOutOfRange`] past the end of the episode.
    pub fn seek(&mut self, amount: u64) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(CoreError::NoEpisodeLoaded)?;

        if amount > loaded.episode.duration {
            return Err(CoreError::SeekOutOfRange {
                amount,
                duration: loaded.episode.duration,
            });
        }

        #[allow(clippy::cast_precision_loss)]
        loaded.element.set_current_time(amount as f64);
        self.progress.elapsed_secs = amount;
        Ok(())
    }

    /// Reload from a fresh snapshot after missed events.
    ///
    /// # Errors
    ///
    /// Returns an error if the media capability rejects a command.
    pub async fn resync(&mut self) -> Result<()> {
        let snapshot = self.context.snapshot().await;

        let (Some(episode), Some(index)) = (snapshot.current_episode(), snapshot.current_index)
        else {
            self.unload();
            return Ok(());
        };

        let up_to_date = self
            .loaded
            .as_ref()
            .is_some_and(|l| l.index == index && l.episode == *episode);
        if !up_to_date {
            self.load(episode.clone(), index)?;
        }

        self.handle_player_event(PlayerEvent::PlayingChanged {
            is_playing: snapshot.is_playing,
        })
    }

    fn load(&mut self, episode: Episode, index: usize) -> Result<()> {
        // Release the previous element before opening the next one
        self.unload();

        let (events_tx, media_rx) = mpsc::unbounded_channel();
        let element = self.backend.open(&episode, events_tx)?;
        info!(
            target: LOG_TARGET,
            "Loaded episode #{}: {} ({})", index, episode.title, episode.duration_as_string
        );

        let loaded = self.loaded.insert(LoadedEpisode {
            episode,
            index,
            element,
            media_rx,
            tracking: false,
            play_requested: true,
        });

        // New episodes always start playing; the element's Played report
        // brings the queue's playing flag in line.
        loaded.element.play()
    }

    fn unload(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            debug!(target: LOG_TARGET, "Unloaded episode {}", loaded.episode.id);
        }
        self.progress = ProgressState::default();
    }

    /// Build the player panel from current state
    pub async fn view(&self) -> PlayerView {
        PlayerView::build(&self.context.snapshot().await, self.progress.elapsed_secs)
    }

    #[must_use]
    pub const fn progress(&self) -> ProgressState {
        self.progress
    }

    /// Episode whose element is currently open
    #[must_use]
    pub fn loaded_episode(&self) -> Option<&Episode> {
        self.loaded.as_ref().map(|l| &l.episode)
    }

    /// Position reported by the open element, in seconds
    #[must_use]
    pub fn media_position(&self) -> Option<f64> {
        self.loaded.as_ref().map(|l| l.element.current_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaEventSender;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default, Clone)]
    struct Recorder {
        commands: Arc<Mutex<Vec<String>>>,
        senders: Arc<Mutex<Vec<(String, MediaEventSender)>>>,
    }

    impl Recorder {
        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.commands.lock().unwrap().clear();
        }

        /// Send an event from the most recently opened element of `id`
        fn emit(&self, id: &str, event: MediaEvent) {
            let senders = self.senders.lock().unwrap();
            let (_, tx) = senders.iter().rev().find(|(open_id, _)| open_id == id).unwrap();
            let _ = tx.send(event);
        }
    }

    struct FakeElement {
        id: String,
        position: f64,
        recorder: Recorder,
    }

    impl MediaElement for FakeElement {
        fn play(&mut self) -> Result<()> {
            self.recorder.commands.lock().unwrap().push(format!("play:{}", self.id));
            Ok(())
        }

        fn pause(&mut self) -> Result<()> {
            self.recorder.commands.lock().unwrap().push(format!("pause:{}", self.id));
            Ok(())
        }

        fn current_time(&self) -> f64 {
            self.position
        }

        fn set_current_time(&mut self, seconds: f64) {
            self.position = seconds;
            self.recorder
                .commands
                .lock()
                .unwrap()
                .push(format!("seek:{}:{}", self.id, seconds));
        }
    }

    struct FakeBackend {
        recorder: Recorder,
    }

    impl MediaBackend for FakeBackend {
        type Element = FakeElement;

        fn open(&self, episode: &Episode, events: MediaEventSender) -> Result<FakeElement> {
            self.recorder
                .commands
                .lock()
                .unwrap()
                .push(format!("open:{}", episode.id));
            self.recorder
                .senders
                .lock()
                .unwrap()
                .push((episode.id.clone(), events));
            Ok(FakeElement {
                id: episode.id.clone(),
                position: 0.0,
                recorder: self.recorder.clone(),
            })
        }
    }

    fn episode(id: &str, duration: u64) -> Episode {
        Episode::new(id, format!("Episode {id}"), "Host", "1 Jan 21", "thumb", duration, "audio")
    }

    fn surface() -> (PlayerSurface<FakeBackend>, Arc<PlayerContext>, Recorder) {
        let context = PlayerContext::with_seed(9);
        let recorder = Recorder::default();
        let surface = PlayerSurface::new(
            context.clone(),
            FakeBackend {
                recorder: recorder.clone(),
            },
        );
        (surface, context, recorder)
    }

    #[tokio::test]
    async fn test_load_autoplays_and_tracks_progress() {
        let (mut surface, context, recorder) = surface();

        context.play_episode(episode("a", 120)).await;
        surface.dispatch_pending().await;
        assert_eq!(recorder.commands(), vec!["open:a", "play:a"]);

        // Time updates before metadata are ignored
        recorder.emit("a", MediaEvent::TimeUpdate { current_time: 5.0 });
        recorder.emit(
            "a",
            MediaEvent::MetadataReady {
                duration: Duration::from_secs(120),
            },
        );
        recorder.emit("a", MediaEvent::TimeUpdate { current_time: 12.7 });
        surface.dispatch_pending().await;

        assert_eq!(surface.progress().elapsed_secs, 12);
        assert!(recorder.commands().contains(&"seek:a:0".to_string()));

        let view = surface.view().await;
        assert_eq!(view.elapsed, "00:00:12");
        assert_eq!(view.duration, "00:02:00");
    }

    #[tokio::test]
    async fn test_toggle_play_pauses_element() {
        let (mut surface, context, recorder) = surface();
        context.play_episode(episode("a", 60)).await;
        surface.dispatch_pending().await;
        recorder.clear();

        context.toggle_play().await;
        surface.dispatch_pending().await;
        context.toggle_play().await;
        surface.dispatch_pending().await;

        assert_eq!(recorder.commands(), vec!["pause:a", "play:a"]);
    }

    #[tokio::test]
    async fn test_element_reports_sync_playing_flag() {
        let (mut surface, context, recorder) = surface();
        context.play_episode(episode("a", 60)).await;
        surface.dispatch_pending().await;
        recorder.clear();

        recorder.emit("a", MediaEvent::Paused);
        surface.dispatch_pending().await;
        assert!(!context.is_playing().await);
        assert_eq!(recorder.commands(), vec!["pause:a"]);

        recorder.emit("a", MediaEvent::Played);
        surface.dispatch_pending().await;
        assert!(context.is_playing().await);
    }

    #[tokio::test]
    async fn test_end_of_track_advances_then_clears() {
        let (mut surface, context, recorder) = surface();
        context
            .play_list(vec![episode("a", 30), episode("b", 40)], 0)
            .await
            .unwrap();
        surface.dispatch_pending().await;

        recorder.emit("a", MediaEvent::MetadataReady { duration: Duration::from_secs(30) });
        recorder.emit("a", MediaEvent::TimeUpdate { current_time: 29.9 });
        recorder.emit("a", MediaEvent::Ended);
        surface.dispatch_pending().await;

        assert_eq!(context.snapshot().await.current_index, Some(1));
        assert_eq!(surface.loaded_episode().map(|e| e.id.as_str()), Some("b"));
        assert_eq!(surface.progress().elapsed_secs, 0);
        assert!(recorder.commands().ends_with(&["open:b".to_string(), "play:b".to_string()]));

        recorder.emit("b", MediaEvent::Ended);
        surface.dispatch_pending().await;

        let snapshot = context.snapshot().await;
        assert_eq!(snapshot.current_index, None);
        assert!(snapshot.episodes.is_empty());
        assert!(!snapshot.is_playing);
        assert!(surface.loaded_episode().is_none());
        assert!(surface.view().await.is_empty());
    }

    #[tokio::test]
    async fn test_events_from_replaced_element_are_dropped() {
        let (mut surface, context, recorder) = surface();
        context
            .play_list(vec![episode("a", 30), episode("b", 40)], 0)
            .await
            .unwrap();
        surface.dispatch_pending().await;

        context.play_next().await;
        surface.dispatch_pending().await;

        recorder.emit("a", MediaEvent::Ended);
        surface.dispatch_pending().await;

        assert_eq!(context.snapshot().await.current_index, Some(1));
        assert_eq!(surface.loaded_episode().map(|e| e.id.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn test_loop_restarts_instead_of_advancing() {
        let (mut surface, context, recorder) = surface();
        context
            .play_list(vec![episode("a", 30), episode("b", 40)], 0)
            .await
            .unwrap();
        context.toggle_loop().await;
        surface.dispatch_pending().await;
        surface.seek(20).unwrap();
        recorder.clear();

        recorder.emit("a", MediaEvent::Ended);
        surface.dispatch_pending().await;

        assert_eq!(context.snapshot().await.current_index, Some(0));
        assert_eq!(recorder.commands(), vec!["seek:a:0", "play:a"]);
        assert_eq!(surface.progress().elapsed_secs, 0);
    }

    #[tokio::test]
    async fn test_seek_to_end_sets_exact_progress() {
        let (mut surface, context, recorder) = surface();
        context.play_episode(episode("a", 3981)).await;
        surface.dispatch_pending().await;

        surface.seek(3981).unwrap();

        assert_eq!(surface.progress().elapsed_secs, 3981);
        assert_eq!(surface.media_position().map(whole_seconds), Some(3981));
        assert!(recorder.commands().contains(&"seek:a:3981".to_string()));
        assert_eq!(
            surface.view().await.slider.map(|s| (s.max, s.value)),
            Some((3981, 3981))
        );
    }

    #[tokio::test]
    async fn test_seek_errors() {
        let (mut surface, context, _recorder) = surface();
        assert!(matches!(surface.seek(1), Err(CoreError::NoEpisodeLoaded)));

        context.play_episode(episode("a", 10)).await;
        surface.dispatch_pending().await;
        assert!(matches!(
            surface.seek(11),
            Err(CoreError::SeekOutOfRange { amount: 11, duration: 10 })
        ));
        assert_eq!(surface.progress().elapsed_secs, 0);
    }

    #[tokio::test]
    async fn test_resync_loads_current_state() {
        let (mut surface, context, recorder) = surface();
        context.play_episode(episode("a", 10)).await;
        context.toggle_play().await;

        surface.resync().await.unwrap();
        assert_eq!(surface.loaded_episode().map(|e| e.id.as_str()), Some("a"));
        assert_eq!(recorder.commands(), vec!["open:a", "play:a", "pause:a"]);

        context.clear_player_state().await;
        surface.resync().await.unwrap();
        assert!(surface.loaded_episode().is_none());
    }

    #[tokio::test]
    async fn test_next_input_yields_player_events() {
        let (mut surface, context, _recorder) = surface();

        context.play_episode(episode("a", 10)).await;
        let input = tokio::time::timeout(Duration::from_secs(5), surface.next_input())
            .await
            .unwrap();
        assert!(matches!(
            input,
            SurfaceInput::Player(PlayerEvent::EpisodeChanged { index: 0, .. })
        ));
        assert!(surface.handle(input).await);
        assert_eq!(surface.loaded_episode().map(|e| e.id.as_str()), Some("a"));

        assert!(!surface.handle(SurfaceInput::Closed).await);
    }
}
