//! Home listing: "latest releases" plus "all episodes", sharing one play queue.

use crate::config::ListingConfig;
use crate::context::PlayerContext;
use crate::episode::Episode;
use crate::error::{CoreError, Result};
use crate::source::EpisodeSource;
use tracing::{info, warn};

/// Episodes split into the two home sections.
///
/// Playing from either section queues the full listing in display order, so
/// a row in the second section sits at `row + latest().len()` in the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeListing {
    latest: Vec<Episode>,
    remaining: Vec<Episode>,
}

impl HomeListing {
    /// Split `episodes` after the first `latest_count`
    #[must_use]
    pub fn from_episodes(mut episodes: Vec<Episode>, latest_count: usize) -> Self {
        let split = latest_count.min(episodes.len());
        let remaining = episodes.split_off(split);
        Self {
            latest: episodes,
            remaining,
        }
    }

    #[must_use]
    pub fn latest(&self) -> &[Episode] {
        &self.latest
    }

    #[must_use]
    pub fn remaining(&self) -> &[Episode] {
        &self.remaining
    }

    /// Play queue: latest followed by remaining
    #[must_use]
    pub fn queue(&self) -> Vec<Episode> {
        self.latest.iter().chain(&self.remaining).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.latest.len() + self.remaining.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty() && self.remaining.is_empty()
    }

    /// Queue position of a row in the "all episodes" section
    #[must_use]
    pub fn remaining_queue_index(&self, row: usize) -> usize {
        row + self.latest.len()
    }

    /// Look an episode up by id in either section
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Episode> {
        self.latest.iter().chain(&self.remaining).find(|e| e.id == id)
    }

    /// Queue the whole listing starting at a "latest releases" row.
    ///
    /// # Errors
    ///
    /// Returns an error if `row` is past the end of the section.
    pub async fn play_latest(&self, context: &PlayerContext, row: usize) -> Result<()> {
        Self::check_row(row, self.latest.len())?;
        context.play_list(self.queue(), row).await
    }

    /// Queue the whole listing starting at an "all episodes" row.
    ///
    /// # Errors
    ///
    /// Returns an error if `row` is past the end of the section.
    pub async fn play_remaining(&self, context: &PlayerContext, row: usize) -> Result<()> {
        Self::check_row(row, self.remaining.len())?;
        context
            .play_list(self.queue(), self.remaining_queue_index(row))
            .await
    }

    fn check_row(row: usize, len: usize) -> Result<()> {
        if row < len {
            Ok(())
        } else {
            Err(CoreError::QueueIndexOutOfRange { index: row, len })
        }
    }
}

/// Fetch, normalize, and split episodes for the home listing.
///
/// Records that cannot be normalized are logged and left out.
///
/// # Errors
///
/// Returns an error if the source fails or the date settings are invalid.
pub async fn load_listing(
    source: &dyn EpisodeSource,
    config: &ListingConfig,
) -> Result<HomeListing> {
    let dates = config.date_formatter()?;
    let raw = source.fetch(&config.query()).await?;
    let fetched = raw.len();

    let episodes: Vec<Episode> = raw
        .iter()
        .filter_map(|record| match record.normalize(&dates) {
            Ok(episode) => Some(episode),
            Err(e) => {
                warn!("Skipping episode from {}: {}", source.name(), e);
                None
            }
        })
        .collect();

    info!(
        "Loaded {} of {} episode(s) from {}",
        episodes.len(),
        fetched,
        source.name()
    );
    Ok(HomeListing::from_episodes(episodes, config.latest_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticEpisodeSource;

    const EPISODES: &str = r#"[
        {
            "id": "oldest", "title": "Oldest", "members": "Ana",
            "published_at": "2021-01-10 08:00:00", "thumbnail": "t",
            "file": { "url": "u1", "duration": "60" }
        },
        {
            "id": "newest", "title": "Newest", "members": "Bia",
            "published_at": "2021-01-22 08:00:00", "thumbnail": "t",
            "file": { "url": "u2", "duration": "3981" }
        },
        {
            "id": "broken", "title": "Broken", "members": "Caio",
            "published_at": "yesterday", "thumbnail": "t",
            "file": { "url": "u3", "duration": "10" }
        },
        {
            "id": "middle", "title": "Middle", "members": "Duda",
            "published_at": "2021-01-15 08:00:00", "thumbnail": "t",
            "file": { "url": "u4", "duration": "1200.7" }
        }
    ]"#;

    fn episode(id: &str) -> Episode {
        Episode::new(id, id, "Host", "1 Jan 21", "thumb", 10, "audio")
    }

    fn listing(count: usize, latest: usize) -> HomeListing {
        let episodes = (0..count).map(|i| episode(&i.to_string())).collect();
        HomeListing::from_episodes(episodes, latest)
    }

    #[test]
    fn test_split_sections() {
        let home = listing(5, 2);
        assert_eq!(home.latest().len(), 2);
        assert_eq!(home.remaining().len(), 3);
        assert_eq!(home.remaining()[0].id, "2");
        assert_eq!(home.remaining_queue_index(1), 3);
        assert_eq!(home.queue()[3].id, "3");
        assert_eq!(home.len(), 5);
    }

    #[test]
    fn test_short_listing_has_no_remaining() {
        let home = listing(1, 2);
        assert_eq!(home.latest().len(), 1);
        assert!(home.remaining().is_empty());
        assert!(!home.is_empty());
        assert!(HomeListing::default().is_empty());
    }

    #[tokio::test]
    async fn test_play_remaining_row_maps_into_full_queue() {
        let home = listing(4, 2);
        let context = PlayerContext::with_seed(1);

        home.play_remaining(&context, 1).await.unwrap();

        let snapshot = context.snapshot().await;
        assert_eq!(snapshot.episodes.len(), 4);
        assert_eq!(snapshot.current_index, Some(3));
        assert_eq!(snapshot.current_episode().unwrap().id, "3");
        assert!(snapshot.has_previous);
        assert!(!snapshot.has_next);
    }

    #[tokio::test]
    async fn test_play_latest_and_bad_rows() {
        let home = listing(4, 2);
        let context = PlayerContext::with_seed(1);

        home.play_latest(&context, 1).await.unwrap();
        assert_eq!(context.snapshot().await.current_index, Some(1));

        assert!(matches!(
            home.play_latest(&context, 2).await,
            Err(CoreError::QueueIndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(home.play_remaining(&context, 2).await.is_err());
        assert_eq!(context.snapshot().await.current_index, Some(1));
    }

    #[tokio::test]
    async fn test_load_listing_normalizes_and_skips_bad_records() {
        let source = StaticEpisodeSource::from_json(EPISODES).unwrap();
        let config = ListingConfig {
            locale: "en_US".to_string(),
            ..ListingConfig::default()
        };

        let home = load_listing(&source, &config).await.unwrap();

        let latest: Vec<_> = home.latest().iter().map(|e| e.id.as_str()).collect();
        let remaining: Vec<_> = home.remaining().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(latest, vec!["newest", "middle"]);
        assert_eq!(remaining, vec!["oldest"]);

        let newest = home.find("newest").unwrap();
        assert_eq!(newest.published_at, "22 Jan 21");
        assert_eq!(newest.duration, 3981);
        assert_eq!(newest.duration_as_string, "01:06:21");
        assert_eq!(home.find("middle").unwrap().duration, 1200);
        assert!(home.find("broken").is_none());
    }

    #[tokio::test]
    async fn test_load_listing_respects_limit() {
        let source = StaticEpisodeSource::from_json(EPISODES).unwrap();
        let config = ListingConfig {
            limit: 2,
            latest_count: 1,
            locale: "en_US".to_string(),
            ..ListingConfig::default()
        };

        let home = load_listing(&source, &config).await.unwrap();

        // "yesterday" sorts above the ISO dates, so the limit keeps it and it is dropped
        assert_eq!(home.len(), 1);
        assert_eq!(home.latest()[0].id, "newest");
    }
}
