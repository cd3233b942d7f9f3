//! Deployment status reporting command.

use anyhow::{Context, Result};
use deploystatus_reconciler::{StatusError, StatusOptions, report_deployment_status};
use deploystatus_scm::{ScmClientRegistry, TokenClientFactory};
use std::path::PathBuf;
use tracing::warn;

pub struct StatusArgs {
    pub dir: PathBuf,
    pub fail_on_error: bool,
    pub auto_inactive: bool,
    pub deploy_offset: String,
    pub git_token: String,
}

/// Report deployment status for every recent release in `args.dir`.
pub async fn run(args: StatusArgs) -> Result<()> {
    if args.git_token.is_empty() {
        warn!("No git token configured, provider requests will be unauthenticated");
    }

    let options = StatusOptions {
        dir: args.dir,
        fail_on_error: args.fail_on_error,
        auto_inactive: args.auto_inactive,
        deploy_offset: args.deploy_offset,
    };
    let mut registry = ScmClientRegistry::new(Box::new(TokenClientFactory::new(args.git_token)));

    let summary = report_deployment_status(&options, &mut registry)
        .await
        .with_context(|| {
            format!(
                "Failed to report deployment status in dir {}",
                options.dir.display()
            )
        })?;

    println!(
        "Reconciled {} releases: {} updated, {} warnings",
        summary.reconciliations.len(),
        summary.updated(),
        summary.warnings()
    );
    for failure in summary.failures {
        println!("  {}", describe_failure(failure));
    }
    Ok(())
}

/// One-line description of a failure with its causes.
fn describe_failure(failure: StatusError) -> String {
    format!("{:#}", anyhow::Error::from(failure))
}
