//! Host process around the archiver: configuration, logging, the file-backed
//! bookmark store and url intake.
mod config;
mod error;
mod intake;
mod logging;
mod persistence;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use archiver_engine::{ArchivePipeline, BackgroundArchiver, ReqwestFetcher};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use tokio::io::BufReader;

pub use config::{AppConfig, DEFAULT_CONFIG_FILE};
pub use error::AppError;

/// Loads the config, wires the archiver and runs until interrupted.
pub async fn run_app(config_path: &Path) -> Result<(), AppError> {
    let config_exists = config_path.exists();
    let config = if config_exists {
        AppConfig::load(config_path)?
    } else {
        AppConfig::default()
    };
    logging::initialize(config.log_destination, config.level()?, &config.data_dir);
    if config_exists {
        engine_info!("Loaded config from {:?}", config_path);
    } else {
        engine_warn!("Config {:?} not found, using defaults", config_path);
    }

    let options = config.archiver_options()?;
    let store = Arc::new(persistence::RonBookmarkStore::open(&config.data_dir).await?);

    let settings = config.fetch_settings();
    let client = settings.build_client()?;
    let fetcher = Arc::new(ReqwestFetcher::new(client, settings));
    let pipeline = ArchivePipeline::new(
        fetcher,
        &config.data_dir,
        Arc::new(|| Utc::now().to_rfc3339()),
    );
    engine_info!("Archives go to {:?}", pipeline.archive_dir());

    let archiver = BackgroundArchiver::new(store.clone(), Arc::new(pipeline), options)?;
    archiver.start()?;
    if config.scan_on_start {
        archiver.notify();
    }

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        stats = intake::run(stdin, &store, &archiver) => {
            let stats = stats?;
            let total = store.len().await;
            engine_info!(
                "Input closed ({} added, {} duplicates, {} rejected, {} bookmarks total); waiting for interrupt",
                stats.added,
                stats.duplicates,
                stats.rejected,
                total
            );
            tokio::signal::ctrl_c().await?;
        }
        interrupted = tokio::signal::ctrl_c() => interrupted?,
    }

    engine_info!("Interrupt received, shutting down");
    archiver.stop().await?;
    Ok(())
}

pub fn config_path_from_args() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
