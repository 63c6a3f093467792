use crate::context::PlaybackSnapshot;
use crate::episode::Episode;
use crate::time::format_duration;

/// Seek slider state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderState {
    /// Upper bound of the slider (episode duration in seconds)
    pub max: u64,
    /// Current value (elapsed seconds)
    pub value: u64,
}

/// Which player controls accept input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ControlsState {
    pub shuffle: bool,
    pub previous: bool,
    pub play: bool,
    pub next: bool,
    pub repeat: bool,
}

/// Everything the player panel renders
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PlayerView {
    /// Now-playing episode, `None` shows the empty-player prompt
    pub episode: Option<Episode>,
    /// Elapsed time as `HH:MM:SS`
    pub elapsed: String,
    /// Episode length as `HH:MM:SS` (`00:00:00` when empty)
    pub duration: String,
    /// Slider, absent when no episode is loaded
    pub slider: Option<SliderState>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub controls: ControlsState,
}

impl PlayerView {
    /// Build the view from queue state and elapsed seconds
    #[must_use]
    pub fn build(snapshot: &PlaybackSnapshot, elapsed_secs: u64) -> Self {
        let episode = snapshot.current_episode().cloned();
        let loaded = episode.is_some();
        let duration_secs = episode.as_ref().map_or(0, |e| e.duration);

        Self {
            elapsed: format_duration(elapsed_secs),
            duration: format_duration(duration_secs),
            slider: episode.as_ref().map(|e| SliderState {
                max: e.duration,
                value: elapsed_secs,
            }),
            is_playing: snapshot.is_playing,
            is_looping: snapshot.is_looping,
            is_shuffling: snapshot.is_shuffling,
            controls: ControlsState {
                shuffle: loaded && snapshot.episodes.len() > 1,
                previous: loaded && snapshot.has_previous,
                play: loaded,
                next: loaded && snapshot.has_next,
                repeat: loaded,
            },
            episode,
        }
    }

    /// Whether the player has nothing loaded
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.episode.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::PlaybackQueue;

    fn episode(id: &str, duration: u64) -> Episode {
        Episode::new(id, format!("Episode {id}"), "Host", "1 Jan 21", "thumb", duration, "audio")
    }

    #[test]
    fn test_empty_view() {
        let view = PlayerView::build(&PlaybackSnapshot::default(), 0);

        assert!(view.is_empty());
        assert_eq!(view.elapsed, "00:00:00");
        assert_eq!(view.duration, "00:00:00");
        assert!(view.slider.is_none());
        assert_eq!(view.controls, ControlsState::default());
    }

    #[test]
    fn test_loaded_view() {
        let mut queue = PlaybackQueue::new();
        queue
            .play_list(vec![episode("a", 100), episode("b", 3661), episode("c", 5)], 1)
            .unwrap();

        let view = PlayerView::build(&PlaybackSnapshot::from(&queue), 65);

        assert_eq!(view.episode.as_ref().map(|e| e.id.as_str()), Some("b"));
        assert_eq!(view.elapsed, "00:01:05");
        assert_eq!(view.duration, "01:01:01");
        assert_eq!(view.slider, Some(SliderState { max: 3661, value: 65 }));
        assert!(view.is_playing);
        assert_eq!(
            view.controls,
            ControlsState {
                shuffle: true,
                previous: true,
                play: true,
                next: true,
                repeat: true,
            }
        );
    }

    #[test]
    fn test_single_episode_disables_shuffle_and_navigation() {
        let mut queue = PlaybackQueue::new();
        queue.play_episode(episode("solo", 30));

        let controls = PlayerView::build(&PlaybackSnapshot::from(&queue), 0).controls;

        assert!(!controls.shuffle);
        assert!(!controls.previous);
        assert!(!controls.next);
        assert!(controls.play);
        assert!(controls.repeat);
    }

    #[test]
    fn test_shuffle_enables_next_and_disables_previous() {
        let mut queue = PlaybackQueue::new();
        queue
            .play_list(vec![episode("a", 1), episode("b", 1)], 1)
            .unwrap();
        queue.toggle_shuffle();

        let view = PlayerView::build(&PlaybackSnapshot::from(&queue), 0);

        assert!(view.is_shuffling);
        assert!(view.controls.next);
        assert!(!view.controls.previous);
    }
}
