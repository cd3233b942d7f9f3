//! Configuration loading errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("no jx-requirements.yml found in dir {} or its parents", .0.display())]
    RequirementsNotFound(PathBuf),

    #[error("failed to parse time offset {value}: {message}")]
    InvalidOffset { value: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
