use crate::error::{CoreError, Result};
use crate::time::format_duration;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Locale, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A podcast episode ready for display and playback.
///
/// Episodes are produced by normalizing [`RawEpisode`] records and are never
/// mutated afterwards; the queue holds clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Stable identifier from the episode API
    pub id: String,
    /// Episode title
    pub title: String,
    /// Hosts and guests, as a display string
    pub members: String,
    /// Published date, already localized for display
    pub published_at: String,
    /// Thumbnail image URL
    pub thumbnail: String,
    /// Episode length in whole seconds
    pub duration: u64,
    /// Episode length as `HH:MM:SS`
    pub duration_as_string: String,
    /// Playable audio resource
    pub url: String,
}

impl Episode {
    /// Create an episode, deriving the formatted duration.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        members: impl Into<String>,
        published_at: impl Into<String>,
        thumbnail: impl Into<String>,
        duration: u64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            members: members.into(),
            published_at: published_at.into(),
            thumbnail: thumbnail.into(),
            duration,
            duration_as_string: format_duration(duration),
            url: url.into(),
        }
    }

    /// Episode length as a [`Duration`]
    #[must_use]
    pub const fn length(&self) -> Duration {
        Duration::from_secs(self.duration)
    }
}

/// Episode record as served by the episode API.
///
/// Fields the player does not use (such as `description`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    pub id: String,
    pub title: String,
    pub members: String,
    pub thumbnail: String,
    pub published_at: String,
    pub file: RawEpisodeFile,
}

/// Audio file block of a [`RawEpisode`]
#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisodeFile {
    pub url: String,
    pub duration: RawDuration,
}

/// The API serves durations as numeric strings, some mirrors as plain numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Number(f64),
    Text(String),
}

impl RawDuration {
    fn seconds(&self) -> Option<u64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };

        if value.is_finite() && value >= 0.0 {
            Some(crate::time::whole_seconds(value))
        } else {
            None
        }
    }
}

impl RawEpisode {
    /// Normalize into an [`Episode`], localizing the published date.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEpisode`] if the date or duration cannot be parsed.
    pub fn normalize(&self, dates: &DateFormatter) -> Result<Episode> {
        let duration = self
            .file
            .duration
            .seconds()
            .ok_or_else(|| CoreError::InvalidEpisode {
                id: self.id.clone(),
                reason: format!("unreadable duration {:?}", self.file.duration),
            })?;

        let published_at = dates.format(&self.published_at).ok_or_else(|| {
            CoreError::InvalidEpisode {
                id: self.id.clone(),
                reason: format!("unreadable published_at {:?}", self.published_at),
            }
        })?;

        Ok(Episode::new(
            &self.id,
            &self.title,
            &self.members,
            published_at,
            &self.thumbnail,
            duration,
            &self.file.url,
        ))
    }
}

/// Formats API timestamps for display with a strftime pattern and locale.
#[derive(Debug, Clone)]
pub struct DateFormatter {
    pattern: String,
    locale: Locale,
}

impl DateFormatter {
    /// Create a formatter, resolving the locale name (e.g. `pt_BR`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] for an unknown locale or a malformed pattern.
    pub fn new(pattern: impl Into<String>, locale: &str) -> Result<Self> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(CoreError::ConfigInvalid {
                message: format!("invalid date format {pattern:?}"),
            });
        }

        let locale = Locale::try_from(locale).map_err(|_| CoreError::ConfigInvalid {
            message: format!("unknown locale {locale:?}"),
        })?;

        Ok(Self { pattern, locale })
    }

    /// Format an ISO-8601 style timestamp, keeping its wall-clock time.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and bare dates.
    #[must_use]
    pub fn format(&self, timestamp: &str) -> Option<String> {
        let naive = parse_timestamp(timestamp.trim())?;
        let date: DateTime<Utc> = Utc.from_utc_datetime(&naive);
        Some(date.format_localized(&self.pattern, self.locale).to_string())
    }
}

fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.naive_local());
    }

    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, pattern) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
