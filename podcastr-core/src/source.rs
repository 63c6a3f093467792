//! Episode source trait and an in-memory source backed by a JSON document.

use crate::episode::RawEpisode;
use crate::error::{CoreError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

/// Sort direction for episode queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Query-string form used by the episode API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters for fetching episodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeQuery {
    /// Maximum number of episodes to return
    pub limit: usize,
    /// Raw record field to sort by (e.g. `published_at`)
    pub sort: String,
    /// Sort direction
    pub order: SortOrder,
}

impl EpisodeQuery {
    /// Create a query for the first `limit` episodes sorted by `sort`.
    pub fn new(limit: usize, sort: impl Into<String>, order: SortOrder) -> Self {
        Self {
            limit,
            sort: sort.into(),
            order,
        }
    }
}

impl Default for EpisodeQuery {
    fn default() -> Self {
        Self::new(12, "published_at", SortOrder::Desc)
    }
}

/// Trait for episode sources.
///
/// A source returns raw API records in query order; normalization happens in
/// [`crate::listing::load_listing`].
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch raw episode records matching a query
    async fn fetch(&self, query: &EpisodeQuery) -> Result<Vec<RawEpisode>>;
}

/// Record fields episodes can be sorted by
pub const SORTABLE_FIELDS: &[&str] = &["id", "title", "members", "published_at"];

/// Source serving episodes from a JSON document already in memory.
///
/// Accepts either a bare array of records or a json-server database object
/// with an `episodes` array, and applies sorting and limits the way the
/// episode API does.
#[derive(Debug, Clone)]
pub struct StaticEpisodeSource {
    episodes: Vec<RawEpisode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpisodeDocument {
    Bare(Vec<RawEpisode>),
    Database { episodes: Vec<RawEpisode> },
}

impl StaticEpisodeSource {
    /// Create a source from already-decoded records
    #[must_use]
    pub const fn new(episodes: Vec<RawEpisode>) -> Self {
        Self { episodes }
    }

    /// Decode a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid episode JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: EpisodeDocument = serde_json::from_str(json)?;
        let episodes = match document {
            EpisodeDocument::Bare(episodes) | EpisodeDocument::Database { episodes } => episodes,
        };
        Ok(Self::new(episodes))
    }

    /// Read and decode a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!("Loaded episode file {}", path.display());
        Self::from_json(&content)
    }

    fn compare(field: &str, a: &RawEpisode, b: &RawEpisode) -> Ordering {
        match field {
            "id" => a.id.cmp(&b.id),
            "title" => a.title.cmp(&b.title),
            "members" => a.members.cmp(&b.members),
            // ISO timestamps sort lexicographically
            "published_at" => a.published_at.cmp(&b.published_at),
            _ => Ordering::Equal,
        }
    }
}

#[async_trait]
impl EpisodeSource for StaticEpisodeSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, query: &EpisodeQuery) -> Result<Vec<RawEpisode>> {
        if !SORTABLE_FIELDS.contains(&query.sort.as_str()) {
            return Err(CoreError::SourceFailed {
                source_name: self.name().to_string(),
                reason: format!("cannot sort by {:?}", query.sort),
            });
        }

        let mut episodes = self.episodes.clone();
        episodes.sort_by(|a, b| {
            let ordering = Self::compare(&query.sort, a, b);
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        episodes.truncate(query.limit);

        Ok(episodes)
    }
}
