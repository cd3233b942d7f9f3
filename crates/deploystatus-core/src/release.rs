//! Release report types.
//!
//! The release report lists, per namespace, the Helm releases that were
//! deployed along with the chart metadata recorded at install time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The releases deployed into a single namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceReleases {
    /// Path of the helmfile that produced these releases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// A deployed Helm chart instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default)]
    pub name: String,
    /// Chart version; empty when the report could not determine it.
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// Source URLs recorded in the chart metadata.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "repositoryURL")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_deployed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deployed: Option<DateTime<Utc>>,
    #[serde(default, rename = "applicationURL")]
    pub application_url: String,
    #[serde(default, rename = "logsURL")]
    pub logs_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "resourcesURL")]
    pub resources_url: Option<String>,
}

impl Release {
    /// Whether the release was deployed strictly after `cutoff`.
    ///
    /// Releases without a deploy timestamp are never considered recent.
    pub fn deployed_after(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_deployed.is_some_and(|t| t > cutoff)
    }
}
