use crate::episode::Episode;
use crate::error::Result;
use crate::queue::PlaybackQueue;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Events emitted by the player context after each state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A different queue position was loaded (also fired when shuffle lands
    /// on the episode already playing, which restarts it)
    EpisodeChanged {
        episode: Episode,
        index: usize,
        is_playing: bool,
    },
    /// The playing flag flipped
    PlayingChanged { is_playing: bool },
    /// The looping flag flipped
    LoopingChanged { is_looping: bool },
    /// The shuffling flag flipped
    ShufflingChanged { is_shuffling: bool },
    /// The queue was emptied
    Cleared,
}

/// Point-in-time copy of the queue with its derived flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub episodes: Vec<Episode>,
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PlaybackSnapshot {
    /// Episode at the current index, if any
    #[must_use]
    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_index.and_then(|index| self.episodes.get(index))
    }
}

impl From<&PlaybackQueue> for PlaybackSnapshot {
    fn from(queue: &PlaybackQueue) -> Self {
        Self {
            episodes: queue.episodes().to_vec(),
            current_index: queue.current_index(),
            is_playing: queue.is_playing(),
            is_looping: queue.is_looping(),
            is_shuffling: queue.is_shuffling(),
            has_next: queue.has_next(),
            has_previous: queue.has_previous(),
        }
    }
}

/// Player context state
struct PlayerContextInner {
    queue: PlaybackQueue,
    rng: StdRng,
}

/// Shared owner of the playback queue.
///
/// The listing and the player surface both hold an `Arc<PlayerContext>`;
/// every mutation goes through a named method and is announced on the event
/// channel once the new state is in place.
pub struct PlayerContext {
    inner: RwLock<PlayerContextInner>,
    event_tx: broadcast::Sender<PlayerEvent>,
}

impl PlayerContext {
    /// Create a new player context with an entropy-seeded shuffle
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_rng(StdRng::from_entropy()))
    }

    /// Create a player context with a fixed shuffle seed
    #[must_use]
    pub fn with_seed(seed: u64) -> Arc<Self> {
        Arc::new(Self::with_rng(StdRng::seed_from_u64(seed)))
    }

    fn with_rng(rng: StdRng) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            inner: RwLock::new(PlayerContextInner {
                queue: PlaybackQueue::new(),
                rng,
            }),
            event_tx,
        }
    }

    /// Subscribe to player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: PlayerEvent) {
        // No subscribers is fine: nothing is listening yet
        let _ = self.event_tx.send(event);
    }

    fn emit_loaded(&self, queue: &PlaybackQueue, was_playing: bool) {
        if let (Some(episode), Some(index)) = (queue.current_episode(), queue.current_index()) {
            self.emit(PlayerEvent::EpisodeChanged {
                episode: episode.clone(),
                index,
                is_playing: queue.is_playing(),
            });
        }
        if was_playing != queue.is_playing() {
            self.emit(PlayerEvent::PlayingChanged {
                is_playing: queue.is_playing(),
            });
        }
    }

    /// Play a single episode, replacing the queue
    pub async fn play_episode(&self, episode: Episode) {
        let mut inner = self.inner.write().await;
        let was_playing = inner.queue.is_playing();

        debug!("Playing single episode {}", episode.id);
        inner.queue.play_episode(episode);
        self.emit_loaded(&inner.queue, was_playing);
    }

    /// Play `episodes` starting at `index`, replacing the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range; no event is emitted.
    pub async fn play_list(&self, episodes: Vec<Episode>, index: usize) -> Result<()> {
        let mut inner = self.inner.write().await;
        let was_playing = inner.queue.is_playing();

        debug!("Playing list of {} episode(s) from {}", episodes.len(), index);
        inner.queue.play_list(episodes, index)?;
        self.emit_loaded(&inner.queue, was_playing);
        Ok(())
    }

    /// Flip between playing and paused
    pub async fn toggle_play(&self) {
        let mut inner = self.inner.write().await;
        let was_playing = inner.queue.is_playing();

        inner.queue.toggle_play();
        if was_playing != inner.queue.is_playing() {
            self.emit(PlayerEvent::PlayingChanged {
                is_playing: inner.queue.is_playing(),
            });
        }
    }

    /// Record a play/pause reported by the media capability
    pub async fn set_playing_state(&self, is_playing: bool) {
        let mut inner = self.inner.write().await;

        if inner.queue.set_playing_state(is_playing) {
            self.emit(PlayerEvent::PlayingChanged { is_playing });
        }
    }

    /// Flip the looping flag
    pub async fn toggle_loop(&self) {
        let mut inner = self.inner.write().await;
        inner.queue.toggle_loop();
        self.emit(PlayerEvent::LoopingChanged {
            is_looping: inner.queue.is_looping(),
        });
    }

    /// Flip the shuffling flag
    pub async fn toggle_shuffle(&self) {
        let mut inner = self.inner.write().await;
        inner.queue.toggle_shuffle();
        self.emit(PlayerEvent::ShufflingChanged {
            is_shuffling: inner.queue.is_shuffling(),
        });
    }

    /// Advance to the next (or a random, while shuffling) episode.
    ///
    /// Returns the new index, or `None` when there is no next episode.
    pub async fn play_next(&self) -> Option<usize> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let index = inner.queue.play_next(&mut inner.rng)?;
        self.emit_loaded(&inner.queue, inner.queue.is_playing());
        Some(index)
    }

    /// Step back to the previous episode in queue order.
    ///
    /// Returns the new index, or `None` when already at the start.
    pub async fn play_previous(&self) -> Option<usize> {
        let mut inner = self.inner.write().await;

        let index = inner.queue.play_previous()?;
        self.emit_loaded(&inner.queue, inner.queue.is_playing());
        Some(index)
    }

    /// Empty the queue and stop
    pub async fn clear_player_state(&self) {
        let mut inner = self.inner.write().await;
        let had_episode = inner.queue.current_index().is_some();

        inner.queue.clear();
        if had_episode {
            self.emit(PlayerEvent::Cleared);
        }
    }

    /// Get a copy of the current state
    pub async fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot::from(&self.inner.read().await.queue)
    }

    /// Get the episode currently loaded
    pub async fn current_episode(&self) -> Option<Episode> {
        self.inner.read().await.queue.current_episode().cloned()
    }

    pub async fn has_next(&self) -> bool {
        self.inner.read().await.queue.has_next()
    }

    pub async fn has_previous(&self) -> bool {
        self.inner.read().await.queue.has_previous()
    }

    pub async fn is_playing(&self) -> bool {
        self.inner.read().await.queue.is_playing()
    }

    pub async fn is_looping(&self) -> bool {
        self.inner.read().await.queue.is_looping()
    }
}

impl Default for PlayerContext {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}
