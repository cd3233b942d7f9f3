//! Deployment status reconciliation.
//!
//! Walks the release report of a GitOps repository and makes sure the git
//! provider has a deployment and a success status for every recent release.

pub mod driver;
pub mod environment;
pub mod error;
pub mod event;
pub mod matcher;
pub mod reconciler;

pub use driver::{Driver, RunSummary, StatusOptions, report_deployment_status};
pub use environment::EnvironmentResolver;
pub use error::{StatusError, StatusResult};
pub use event::{ReconcileEvent, Reconciliation, SkipReason};
pub use matcher::{RepositoryMatch, RepositoryMatcher};
pub use reconciler::{DeploymentReconciler, ReconcileOptions, ReconcileTarget};
