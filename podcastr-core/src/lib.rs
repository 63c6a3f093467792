#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod context;
pub mod episode;
pub mod error;
pub mod listing;
pub mod media;
pub mod paths;
pub mod player;
pub mod queue;
pub mod source;
pub mod time;
pub mod view;

pub use config::{
    ApiConfig, ListingConfig, LoggingConfig, PlaybackConfig, PodcastrConfig, CONFIG_TEMPLATE,
};
pub use context::{PlaybackSnapshot, PlayerContext, PlayerEvent};
pub use episode::{DateFormatter, Episode, RawDuration, RawEpisode, RawEpisodeFile};
pub use error::{CoreError, Result};
pub use listing::{load_listing, HomeListing};
pub use media::{MediaBackend, MediaElement, MediaEvent, MediaEventReceiver, MediaEventSender};
pub use paths::{
    config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME,
};
pub use player::{PlayerSurface, ProgressState, SurfaceInput};
pub use queue::PlaybackQueue;
pub use source::{EpisodeQuery, EpisodeSource, SortOrder, StaticEpisodeSource};
pub use time::{format_duration, parse_time_string, whole_seconds, DurationExt};
pub use view::{ControlsState, PlayerView, SliderState};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
