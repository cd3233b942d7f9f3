use deploystatus_config::ConfigError;
use thiserror::Error;

/// Errors that end a status run.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to update status for repository {repository}")]
    Repository {
        repository: String,
        #[source]
        source: deploystatus_core::Error,
    },
}

impl StatusError {
    pub(crate) fn repository(repository: impl ToString, source: deploystatus_core::Error) -> Self {
        StatusError::Repository {
            repository: repository.to_string(),
            source,
        }
    }
}

pub type StatusResult<T> = std::result::Result<T, StatusError>;
