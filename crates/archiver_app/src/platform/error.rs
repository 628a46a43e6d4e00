use std::io;
use std::path::PathBuf;

use archiver_core::{ConfigError, LifecycleError};
use archiver_engine::{FetchError, StartError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("http client: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Start(#[from] StartError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
