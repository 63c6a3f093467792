use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please edit it and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Episode source errors
    #[error("Episode source {source_name} failed: {reason}")]
    SourceFailed { source_name: String, reason: String },

    #[error("Invalid episode {id}: {reason}")]
    InvalidEpisode { id: String, reason: String },

    // Playback errors
    #[error("Queue index {index} out of range for a queue of {len} episode(s)")]
    QueueIndexOutOfRange { index: usize, len: usize },

    #[error("No episode loaded in the player")]
    NoEpisodeLoaded,

    #[error("Cannot seek to {amount}s in an episode lasting {duration}s")]
    SeekOutOfRange { amount: u64, duration: u64 },

    #[error("Media capability failed: {reason}")]
    MediaFailed { reason: String },

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Network request failed: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
