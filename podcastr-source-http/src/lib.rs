#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use async_trait::async_trait;
use podcastr_core::{ApiConfig, CoreError, EpisodeQuery, EpisodeSource, RawEpisode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("Podcastr/", env!("CARGO_PKG_VERSION"));

/// Episode source backed by a json-server style REST API.
///
/// Queries map to `GET {base_url}/{episodes_path}?_limit=&_sort=&_order=`.
pub struct HttpEpisodeSource {
    client: ClientWithMiddleware,
    endpoint: Url,
}

impl HttpEpisodeSource {
    /// Create a source from API settings, with retries on transient failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is malformed or the HTTP client
    /// cannot be created.
    pub fn new(config: &ApiConfig) -> Result<Self, CoreError> {
        let endpoint = Self::endpoint(&config.base_url, &config.episodes_path)?;

        let base_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT)
            .build()?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, endpoint })
    }

    /// Full URL of the episode collection
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.endpoint
    }

    fn endpoint(base_url: &str, episodes_path: &str) -> Result<Url, CoreError> {
        // A base without a trailing slash would lose its last segment on join
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Url::parse(&base)
            .and_then(|base| base.join(episodes_path.trim_start_matches('/')))
            .map_err(|e| CoreError::ConfigInvalid {
                message: format!("api.base_url {base_url:?}: {e}"),
            })
    }
}

#[async_trait]
impl EpisodeSource for HttpEpisodeSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, query: &EpisodeQuery) -> Result<Vec<RawEpisode>, CoreError> {
        let limit = query.limit.to_string();
        info!(
            "Fetching {} episode(s) from {} sorted by {} {}",
            query.limit, self.endpoint, query.sort, query.order
        );

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("_limit", limit.as_str()),
                ("_sort", query.sort.as_str()),
                ("_order", query.order.as_str()),
            ])
            .send()
            .await?;
        debug!("Episode API response status: {}", response.status());

        if !response.status().is_success() {
            warn!("Episode API returned status: {}", response.status());
            return Err(CoreError::SourceFailed {
                source_name: self.name().to_string(),
                reason: format!("episode API returned status: {}", response.status()),
            });
        }

        let episodes: Vec<RawEpisode> = response.json().await?;
        info!("Episode API returned {} record(s)", episodes.len());
        Ok(episodes)
    }
}
