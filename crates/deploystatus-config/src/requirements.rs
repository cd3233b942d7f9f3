//! Cluster requirements (`jx-requirements.yml`).

use deploystatus_core::GitKind;
use deploystatus_core::kind::{GITHUB_URL, deserialize_optional};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigResult, load_yaml};

pub const REQUIREMENTS_FILE_NAME: &str = "jx-requirements.yml";

/// The parts of the cluster requirements used to report deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
}

/// Cluster-level git settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub git_server: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub git_kind: Option<GitKind>,
    #[serde(default)]
    pub git_name: String,
    #[serde(default)]
    pub environment_git_owner: String,
}

/// A promotion environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub key: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub git_server: String,
    #[serde(default)]
    pub git_url: String,
    #[serde(default)]
    pub remote_cluster: bool,
}

impl EnvironmentConfig {
    /// Namespace the environment deploys into, defaulting to `jx` for `dev`
    /// and `jx-<key>` otherwise.
    pub fn namespace(&self) -> String {
        if !self.namespace.is_empty() {
            self.namespace.clone()
        } else if self.key == "dev" {
            "jx".to_string()
        } else {
            format!("jx-{}", self.key)
        }
    }
}

impl Requirements {
    pub fn environment(&self, key: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|e| e.key == key)
    }

    /// Git server of the cluster, defaulting to GitHub.
    pub fn git_server(&self) -> &str {
        if self.cluster.git_server.is_empty() {
            GITHUB_URL
        } else {
            &self.cluster.git_server
        }
    }

    /// Git URL of an environment repository.
    ///
    /// Empty when the environment is unknown or its owner or repository
    /// cannot be determined.
    pub fn environment_git_url(&self, key: &str) -> String {
        let Some(env) = self.environment(key) else {
            return String::new();
        };
        if !env.git_url.is_empty() {
            return env.git_url.clone();
        }

        let owner = if env.owner.is_empty() {
            &self.cluster.environment_git_owner
        } else {
            &env.owner
        };
        if owner.is_empty() || env.repository.is_empty() {
            return String::new();
        }
        let server = if env.git_server.is_empty() {
            self.git_server()
        } else {
            &env.git_server
        };
        format!(
            "{}/{}/{}.git",
            server.trim_end_matches('/'),
            owner,
            env.repository
        )
    }
}

/// Find `jx-requirements.yml` in `dir` or one of its ancestors.
pub fn find_requirements_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|d| d.join(REQUIREMENTS_FILE_NAME))
        .find(|p| p.is_file())
}

/// Load the requirements for the GitOps repository at `dir`.
///
/// Accepts both the `apiVersion`/`kind`/`spec` layout and the older flat one.
pub fn load_requirements(dir: &Path) -> ConfigResult<Requirements> {
    let path = find_requirements_file(dir)
        .ok_or_else(|| ConfigError::RequirementsNotFound(dir.to_path_buf()))?;

    let mut value: serde_yaml::Value = load_yaml(&path)?;
    if let Some(spec) = value.get("spec").cloned() {
        value = spec;
    }
    serde_yaml::from_value(value).map_err(|source| ConfigError::Parse { path, source })
}
