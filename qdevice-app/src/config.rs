//! Device configuration.
//!
//! ```json
//! { "algorithm": "lms", "wait_for_all": true, "log_filter": "qdevice_core=debug" }
//! ```
//!
//! `algorithm` may also be a raw numeric id. Raw ids are not range
//! checked here; an unbound id is caught when the session first dispatches.

use std::path::Path;

use qdevice_core::{AlgorithmId, InstanceOptions};
use serde::Deserialize;

use crate::error::AppError;

/// How the configuration names the decision algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AlgorithmSelector {
    Id(u8),
    Name(String),
}

impl AlgorithmSelector {
    pub fn resolve(&self) -> Result<AlgorithmId, AppError> {
        match self {
            Self::Id(raw) => Ok(AlgorithmId::new(*raw)),
            Self::Name(name) => AlgorithmId::from_name(name)
                .ok_or_else(|| AppError::UnknownAlgorithm(name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    pub algorithm: AlgorithmSelector,
    #[serde(default)]
    pub wait_for_all: bool,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl DeviceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn algorithm_id(&self) -> Result<AlgorithmId, AppError> {
        self.algorithm.resolve()
    }

    pub fn instance_options(&self) -> InstanceOptions {
        InstanceOptions {
            wait_for_all: self.wait_for_all,
        }
    }
}
