//! Git provider clients for deploystatus.
//!
//! Provides:
//! - A GitHub REST client implementing the deployment capability
//! - The client factory used to build clients per provider kind
//! - A per-server client registry
//! - An in-memory provider for tests

pub mod factory;
pub mod fake;
pub mod github;
pub mod registry;

pub use factory::{ClientFactory, TokenClientFactory};
pub use fake::FakeDeployments;
pub use github::GitHubClient;
pub use registry::ScmClientRegistry;
