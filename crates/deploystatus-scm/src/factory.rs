//! Construction of provider clients.

use deploystatus_core::{Error, GitKind, Result, ScmClient};
use std::sync::Arc;

use crate::github::GitHubClient;

/// Builds a client for a git server.
pub trait ClientFactory {
    fn create(&self, kind: GitKind, server: &str) -> Result<ScmClient>;
}

/// Token-authenticated factory for the supported providers.
///
/// GitHub clients expose deployments; other provider kinds get a client
/// without the deployment capability.
#[derive(Clone)]
pub struct TokenClientFactory {
    token: String,
}

impl TokenClientFactory {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for TokenClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenClientFactory")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ClientFactory for TokenClientFactory {
    fn create(&self, kind: GitKind, server: &str) -> Result<ScmClient> {
        match kind {
            GitKind::Github => {
                let client = GitHubClient::new(server, self.token.clone())?;
                Ok(ScmClient::deploying(GitKind::Github, server, Arc::new(client)))
            }
            GitKind::Other(name) => Err(Error::UnknownKind(name)),
            _ => Ok(ScmClient::basic(kind, server)),
        }
    }
}
