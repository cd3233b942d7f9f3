//! Source config (`.jx/gitops/source-config.yaml`).

use deploystatus_core::kind::{GITHUB_URL, deserialize_optional};
use deploystatus_core::{GitKind, RepositoryGroup};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{ConfigResult, load_yaml};

pub const SOURCE_CONFIG_PATH: &str = ".jx/gitops/source-config.yaml";

/// Declares which repositories this instance manages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub spec: SourceConfigSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfigSpec {
    /// Default owner for groups that do not set one.
    #[serde(default)]
    pub owner: String,
    /// Default git server for groups that do not set one.
    #[serde(default)]
    pub provider: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub provider_kind: Option<GitKind>,
    #[serde(default)]
    pub groups: Vec<RepositoryGroup>,
}

impl SourceConfig {
    /// Fill in group settings from the spec-level defaults.
    ///
    /// The provider falls back to the spec provider then GitHub; the kind
    /// falls back to the spec kind then whatever the provider URL implies.
    pub fn apply_defaults(&mut self) {
        let spec = &mut self.spec;
        for group in &mut spec.groups {
            if group.owner.is_empty() {
                group.owner = spec.owner.clone();
            }
            if group.provider.is_empty() {
                group.provider = if spec.provider.is_empty() {
                    GITHUB_URL.to_string()
                } else {
                    spec.provider.clone()
                };
            }
            if group.provider_kind.is_none() {
                group.provider_kind = spec
                    .provider_kind
                    .clone()
                    .or_else(|| GitKind::from_saas_server(&group.provider));
            }
        }
    }
}

/// Load the source config for the GitOps repository at `dir`.
///
/// A missing file yields an empty config; defaults are applied to every group.
pub fn load_source_config(dir: &Path) -> ConfigResult<SourceConfig> {
    let path = dir.join(SOURCE_CONFIG_PATH);
    let mut config = if path.is_file() {
        load_yaml::<Option<SourceConfig>>(&path)?.unwrap_or_default()
    } else {
        debug!(path = %path.display(), "No source config file");
        SourceConfig::default()
    };
    config.apply_defaults();
    Ok(config)
}
