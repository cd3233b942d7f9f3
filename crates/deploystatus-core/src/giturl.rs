//! Git URL parsing and repository names.

use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::{Error, Result};

// scp-like syntax: git@github.com:owner/repo.git
static SCP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_.-]+@)?([A-Za-z0-9_.-]+):(.+)$").expect("valid scp url regex")
});

/// A provider-side repository name of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{owner}/{name}")]
pub struct FullRepoName {
    pub owner: String,
    pub name: String,
}

impl FullRepoName {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// The parts of a git URL needed to identify a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepository {
    pub host: String,
    pub organisation: String,
    pub name: String,
    pub url: String,
}

impl GitRepository {
    /// Parse an https, ssh or scp-style git URL.
    ///
    /// The first path segment is the organisation and the last one the
    /// repository name, so nested group paths keep their top-level owner.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(invalid(text, "empty URL"));
        }

        if text.contains("://") {
            let url = Url::parse(text).map_err(|e| invalid(text, &e.to_string()))?;
            let host = url
                .host_str()
                .filter(|h| !h.is_empty())
                .ok_or_else(|| invalid(text, "missing host"))?;
            return Self::from_path(text, host, url.path());
        }

        let captures = SCP_REGEX
            .captures(text)
            .ok_or_else(|| invalid(text, "unsupported git URL format"))?;
        Self::from_path(text, &captures[1], &captures[2])
    }

    fn from_path(text: &str, host: &str, path: &str) -> Result<Self> {
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(invalid(text, "expected an owner and repository in the path"));
        }

        Ok(Self {
            host: host.to_string(),
            organisation: segments[0].to_string(),
            name: segments[segments.len() - 1].to_string(),
            url: text.to_string(),
        })
    }

    pub fn full_name(&self) -> FullRepoName {
        FullRepoName::new(&self.organisation, &self.name)
    }
}

fn invalid(url: &str, message: &str) -> Error {
    Error::InvalidGitUrl {
        url: url.to_string(),
        message: message.to_string(),
    }
}
