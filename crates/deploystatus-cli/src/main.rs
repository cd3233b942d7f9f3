//! deploystatus CLI tool.
//!
//! Reports git provider deployment status for the releases of a GitOps
//! repository after a Helm release.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "deploystatus")]
#[command(about = "Updates the git deployment status after a release", long_about = None)]
struct Cli {
    /// Directory that contains the GitOps repository
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Fail if the deployment status of a repository cannot be reported
    #[arg(short, long)]
    fail: bool,

    /// Mark the status of previous deployments as inactive
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    auto_inactive: bool,

    /// Only releases deployed within this offset are updated (e.g. 2h, 1h30m). Empty updates all
    #[arg(long, default_value = "2h")]
    deploy_offset: String,

    /// Token used to authenticate with the git provider
    #[arg(long, env = "GIT_TOKEN", default_value = "", hide_env_values = true)]
    git_token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    commands::status::run(cli.into()).await
}

impl From<Cli> for commands::status::StatusArgs {
    fn from(cli: Cli) -> Self {
        Self {
            dir: cli.dir,
            fail_on_error: cli.fail,
            auto_inactive: cli.auto_inactive,
            deploy_offset: cli.deploy_offset,
            git_token: cli.git_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["deploystatus"]).unwrap();
        assert_eq!(cli.dir, PathBuf::from("."));
        assert!(!cli.fail);
        assert!(cli.auto_inactive);
        assert_eq!(cli.deploy_offset, "2h");
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "deploystatus",
            "--dir",
            "/tmp/env",
            "--fail",
            "--auto-inactive",
            "false",
            "--deploy-offset",
            "",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp/env"));
        assert!(cli.fail);
        assert!(!cli.auto_inactive);
        assert!(cli.deploy_offset.is_empty());
    }
}
