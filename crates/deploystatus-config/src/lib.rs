//! Configuration loading for deploystatus.
//!
//! This crate handles loading of:
//! - The release report (`docs/releases.yaml`)
//! - Cluster requirements (`jx-requirements.yml`)
//! - Source config (`.jx/gitops/source-config.yaml`)
//! - The deploy offset window

pub mod error;
pub mod offset;
pub mod report;
pub mod requirements;
pub mod source;

pub use error::{ConfigError, ConfigResult};
pub use offset::{deploy_cutoff, parse_duration};
pub use report::load_release_report;
pub use requirements::{ClusterConfig, EnvironmentConfig, Requirements, load_requirements};
pub use source::{SourceConfig, SourceConfigSpec, load_source_config};

use std::path::Path;

/// Read and parse a YAML file.
pub(crate) fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
