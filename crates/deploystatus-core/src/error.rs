//! Error types for deploystatus.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no provider defined for owner {0}")]
    NoProvider(String),

    #[error("no git provider kind for owner {0}")]
    NoProviderKind(String),

    #[error("unknown git provider kind: {0}")]
    UnknownKind(String),

    #[error("invalid git URL {url}: {message}")]
    InvalidGitUrl { url: String, message: String },

    #[error("failed to create scm client for {server}: {message}")]
    Client { server: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to {action} for repository {repository}: {message}")]
    Api {
        action: String,
        repository: String,
        message: String,
    },
}

impl Error {
    /// Build a provider API error for an operation on a repository.
    pub fn api(
        action: impl Into<String>,
        repository: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            action: action.into(),
            repository: repository.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
