#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod app;
mod bridge;
mod commands;
mod render;
mod timer;

use crate::app::App;
use crate::bridge::log_player_events;
use crate::timer::TimerBackend;
use podcastr_core::{
    load_listing, ApiConfig, CoreError, EpisodeSource, PlayerContext, PodcastrConfig,
    StaticEpisodeSource,
};
use podcastr_source_http::HttpEpisodeSource;
use std::fs::File;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    // Logging settings are read before the full config so that config
    // errors are logged too
    let logging = check_logging_settings();
    init_tracing(&logging);

    let config_path = PodcastrConfig::config_path();
    let config = match PodcastrConfig::load_or_create(&config_path) {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            println!(
                "Created a configuration template at {}.\nEdit it if needed and run podcastr again.",
                path.display()
            );
            std::process::exit(0);
        }
        Err(CoreError::ConfigParseError(parse_error)) => {
            error!(
                "Config file {} has syntax errors: {}",
                config_path.display(),
                parse_error
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    if let Err(e) = runtime.block_on(run(config, cancel_token)) {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: PodcastrConfig, cancel_token: CancellationToken) -> Result<(), CoreError> {
    let source = create_source(&config.api)?;
    info!("Using episode source: {}", source.name());

    let listing = load_listing(source.as_ref(), &config.listing).await?;

    let context = PlayerContext::new();
    tokio::spawn(log_player_events(context.subscribe()));

    let backend = TimerBackend::new(&config.playback);
    App::new(listing, context, backend, cancel_token).run().await;

    info!("Goodbye");
    Ok(())
}

fn create_source(config: &ApiConfig) -> Result<Box<dyn EpisodeSource>, CoreError> {
    if let Some(path) = &config.episodes_file {
        info!("Reading episodes from {}", path.display());
        return Ok(Box::new(StaticEpisodeSource::from_file(path)?));
    }

    let source = HttpEpisodeSource::new(config)?;
    info!("Fetching episodes from {}", source.url());
    Ok(Box::new(source))
}

#[derive(serde::Deserialize, Default)]
struct PartialLoggingConfig {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    level: Option<String>,
}

fn check_logging_settings() -> PartialLoggingConfig {
    // Minimal struct to parse just the [logging] table
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }

    let Ok(content) = std::fs::read_to_string(PodcastrConfig::config_path()) else {
        return PartialLoggingConfig::default();
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging)
        .unwrap_or_default()
}

/// Initialize tracing with stderr output and optional file logging
fn init_tracing(logging: &PartialLoggingConfig) {
    let default_level = logging.level.as_deref().unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the listing and player output
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if logging.enabled {
        let log_path = podcastr_core::paths::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
