use crate::episode::DateFormatter;
use crate::error::{CoreError, Result};
use crate::source::{EpisodeQuery, SortOrder, SORTABLE_FIELDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodcastrConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where episodes come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_episodes_path")]
    pub episodes_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Read episodes from a local JSON file instead of the API
    #[serde(default)]
    pub episodes_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_episodes_path() -> String {
    "episodes".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_retries() -> u32 {
    3
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            episodes_path: default_episodes_path(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            episodes_file: None,
        }
    }
}

/// Home listing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub order: SortOrder,
    /// Episodes shown in the "latest" section
    #[serde(default = "default_latest_count")]
    pub latest_count: usize,
    /// strftime pattern for publication dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

const fn default_limit() -> usize {
    12
}

fn default_sort() -> String {
    "published_at".to_string()
}

const fn default_latest_count() -> usize {
    2
}

fn default_date_format() -> String {
    "%-d %b %y".to_string()
}

fn default_locale() -> String {
    "pt_BR".to_string()
}

impl ListingConfig {
    /// Query matching these settings
    #[must_use]
    pub fn query(&self) -> EpisodeQuery {
        EpisodeQuery::new(self.limit, self.sort.clone(), self.order)
    }

    /// Formatter for publication dates
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern or locale is invalid.
    pub fn date_formatter(&self) -> Result<DateFormatter> {
        DateFormatter::new(self.date_format.clone(), &self.locale)
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            sort: default_sort(),
            order: SortOrder::default(),
            latest_count: default_latest_count(),
            date_format: default_date_format(),
            locale: default_locale(),
        }
    }
}

/// Simulated media clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Media seconds advanced per wall-clock second
    #[serde(default = "default_speed")]
    pub speed: f64,
}

const fn default_tick_interval() -> u64 {
    250
}

const fn default_speed() -> f64 {
    1.0
}

impl PlaybackConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            speed: default_speed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to `~/.config/podcastr/podcastr.log`
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_level(),
        }
    }
}

impl PodcastrConfig {
    /// Get the configuration directory path (~/.config/podcastr/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/podcastr/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from `path`, or write the template there on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after creating the template, or an
    /// error if the file cannot be read, parsed, or validated.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() && self.api.episodes_file.is_none() {
            return Err(CoreError::ConfigMissingField {
                field: "api.base_url".to_string(),
            });
        }
        if self.listing.limit == 0 {
            return Err(invalid("listing.limit must be at least 1"));
        }
        if !SORTABLE_FIELDS.contains(&self.listing.sort.as_str()) {
            return Err(invalid(format!(
                "listing.sort must be one of {}",
                SORTABLE_FIELDS.join(", ")
            )));
        }
        if self.playback.tick_interval_ms == 0 {
            return Err(invalid("playback.tick_interval_ms must be at least 1"));
        }
        if !(self.playback.speed.is_finite() && self.playback.speed > 0.0) {
            return Err(invalid("playback.speed must be a positive number"));
        }
        self.listing.date_formatter()?;
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ConfigInvalid {
        message: message.into(),
    }
}

pub const CONFIG_TEMPLATE: &str = r#"# Podcastr Configuration
# ~/.config/podcastr/config.toml

[api]
# json-server style API serving /episodes
base_url = "http://localhost:3333"
episodes_path = "episodes"
timeout_secs = 10
max_retries = 3
# Optional: read episodes from a local file instead (db.json or a plain array)
# episodes_file = "/path/to/db.json"

[listing]
limit = 12
# "id", "title", "members" or "published_at"
sort = "published_at"
order = "desc"  # "asc" or "desc"
# Episodes shown under "Latest releases"; the rest go to "All episodes"
latest_count = 2
date_format = "%-d %b %y"
locale = "pt_BR"

[playback]
# Simulated player clock
tick_interval_ms = 250
speed = 1.0

[logging]
# Also write logs to ~/.config/podcastr/podcastr.log
enabled = false
level = "info"  # overridden by RUST_LOG
"#;
