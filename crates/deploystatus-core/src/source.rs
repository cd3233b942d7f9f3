//! Repository groups declaring which git provider manages which repositories.

use serde::{Deserialize, Serialize};

use crate::GitKind;

/// A set of repositories under one owner on one git provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryGroup {
    #[serde(default)]
    pub owner: String,
    /// Git server URL, e.g. `https://github.com`.
    #[serde(default)]
    pub provider: String,
    #[serde(
        default,
        deserialize_with = "crate::kind::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_kind: Option<GitKind>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// A repository managed by this instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
}
