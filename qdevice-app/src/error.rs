//! Error types for the application shell.

use std::path::PathBuf;

use qdevice_core::{AlgorithmError, StartupError};

/// Errors surfaced by the application shell.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unknown decision algorithm name '{0}'")]
    UnknownAlgorithm(String),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}
