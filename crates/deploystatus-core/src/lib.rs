//! Core domain types and traits for deploystatus.
//!
//! This crate contains:
//! - Release report types (what Helm says is running)
//! - Provider-side deployment and deployment status types
//! - The deployment capability trait and the provider client handle
//! - Git provider kinds and git URL parsing
//! - Repository groups and environments

pub mod deployment;
pub mod environment;
pub mod error;
pub mod giturl;
pub mod kind;
pub mod release;
pub mod source;

pub use deployment::{
    Deployment, DeploymentInput, DeploymentService, DeploymentStatus, DeploymentStatusInput,
    ScmClient,
};
pub use environment::Environment;
pub use error::{Error, Result};
pub use giturl::{FullRepoName, GitRepository};
pub use kind::GitKind;
pub use release::{NamespaceReleases, Release};
pub use source::{Repository, RepositoryGroup};
