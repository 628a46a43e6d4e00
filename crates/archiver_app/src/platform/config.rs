use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use archiver_core::ArchiverOptions;
use archiver_engine::FetchSettings;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "archiver.ron";

/// Settings read from `archiver.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub concurrent: usize,
    pub scan_interval_secs: u64,
    /// Run one scan right after start instead of waiting a full interval.
    pub scan_on_start: bool,
    pub request_timeout_secs: u64,
    pub max_page_bytes: u64,
    pub user_agent: Option<String>,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let options = ArchiverOptions::default();
        let fetch = FetchSettings::default();
        Self {
            data_dir: PathBuf::from("data"),
            concurrent: options.concurrent,
            scan_interval_secs: options.scan_interval.as_secs(),
            scan_on_start: true,
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_page_bytes: fetch.max_bytes,
            user_agent: None,
            log_level: "info".to_string(),
            log_destination: LogDestination::Terminal,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    pub fn archiver_options(&self) -> Result<ArchiverOptions, AppError> {
        Ok(ArchiverOptions::new(
            self.concurrent,
            Duration::from_secs(self.scan_interval_secs),
        )?)
    }

    pub fn level(&self) -> Result<LevelFilter, AppError> {
        engine_logging::parse_level(&self.log_level)
            .ok_or_else(|| AppError::LogLevel(self.log_level.clone()))
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        let mut settings = FetchSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_page_bytes,
            ..FetchSettings::default()
        };
        if let Some(agent) = &self.user_agent {
            settings.user_agent = agent.clone();
        }
        settings
    }
}
