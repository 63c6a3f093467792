use podcastr_core::PlayerEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};

const LOG_TARGET: &str = "podcastr::bridge";

/// Log every player state change until the context goes away
pub async fn log_player_events(mut rx: broadcast::Receiver<PlayerEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => log_player_event(&event),
            Err(RecvError::Closed) => {
                info!(target: LOG_TARGET, "Player event channel closed");
                break;
            }
            Err(RecvError::Lagged(n)) => {
                info!(target: LOG_TARGET, "Missed {} player events", n);
            }
        }
    }
}

fn log_player_event(event: &PlayerEvent) {
    match event {
        PlayerEvent::EpisodeChanged {
            episode,
            index,
            is_playing,
        } => {
            info!(
                target: LOG_TARGET,
                "Episode changed: #{} {} - {} [{}] (playing: {})",
                index, episode.title, episode.members, episode.duration_as_string, is_playing
            );
        }
        PlayerEvent::PlayingChanged { is_playing: true } => {
            info!(target: LOG_TARGET, "Playback resumed");
        }
        PlayerEvent::PlayingChanged { is_playing: false } => {
            info!(target: LOG_TARGET, "Playback paused");
        }
        PlayerEvent::LoopingChanged { is_looping } => {
            debug!(target: LOG_TARGET, "Loop {}", if *is_looping { "on" } else { "off" });
        }
        PlayerEvent::ShufflingChanged { is_shuffling } => {
            debug!(target: LOG_TARGET, "Shuffle {}", if *is_shuffling { "on" } else { "off" });
        }
        PlayerEvent::Cleared => {
            info!(target: LOG_TARGET, "Player cleared");
        }
    }
}
