//! Release report loading.

use deploystatus_core::NamespaceReleases;
use std::path::Path;
use tracing::info;

use crate::{ConfigResult, load_yaml};

/// Location of the release report relative to the GitOps repository root.
pub const RELEASE_REPORT_PATH: &str = "docs/releases.yaml";

/// Load the release report from `dir`.
///
/// Returns `None` when no report exists, which happens before the first
/// successful release.
pub fn load_release_report(dir: &Path) -> ConfigResult<Option<Vec<NamespaceReleases>>> {
    let path = dir.join(RELEASE_REPORT_PATH);
    if !path.is_file() {
        info!(path = %path.display(), "No release report so cannot report deployment status");
        return Ok(None);
    }

    let report: Option<Vec<NamespaceReleases>> = load_yaml(&path)?;
    Ok(Some(report.unwrap_or_default()))
}
