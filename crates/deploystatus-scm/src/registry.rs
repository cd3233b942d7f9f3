//! Per-server cache of provider clients.

use deploystatus_core::{Error, GitKind, Result, ScmClient};
use std::collections::HashMap;
use tracing::debug;

use crate::ClientFactory;

/// Creates one client per git server and reuses it for the rest of the run.
///
/// Clients are keyed by server URL, so owners on the same server share a
/// client. The registry is not synchronised: `get_or_create` takes
/// `&mut self` and is meant to be driven from a single task. Processing
/// repositories in parallel would need a lock around the cache.
pub struct ScmClientRegistry {
    factory: Box<dyn ClientFactory>,
    clients: HashMap<String, ScmClient>,
}

impl ScmClientRegistry {
    pub fn new(factory: Box<dyn ClientFactory>) -> Self {
        Self {
            factory,
            clients: HashMap::new(),
        }
    }

    /// Register a pre-built client for a server.
    pub fn insert(&mut self, server: impl Into<String>, client: ScmClient) {
        self.clients.insert(server.into(), client);
    }

    /// Return the cached client for `server`, creating it on first use.
    ///
    /// Without an explicit `kind` the provider kind is inferred from
    /// well-known SaaS hosts. A kind without a client implementation fails
    /// with [`Error::UnknownKind`]. `owner` is only used in error messages.
    pub fn get_or_create(
        &mut self,
        owner: &str,
        server: &str,
        kind: Option<GitKind>,
    ) -> Result<ScmClient> {
        if let Some(client) = self.clients.get(server) {
            return Ok(client.clone());
        }

        if server.is_empty() {
            return Err(Error::NoProvider(owner.to_string()));
        }
        let kind = kind
            .or_else(|| GitKind::from_saas_server(server))
            .ok_or_else(|| Error::NoProviderKind(owner.to_string()))?;
        if !kind.is_known() {
            return Err(Error::UnknownKind(kind.to_string()));
        }

        debug!(server = %server, kind = %kind, "Creating scm client");
        let client = self.factory.create(kind, server)?;
        self.clients.insert(server.to_string(), client.clone());
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
