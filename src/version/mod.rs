//! Workspace format version checking.
//!
//! Workspaces record the format version they were written with in
//! `config.json`; the daemon compares it against its own version before
//! operating so that a workspace written by a newer daemon is handled in
//! degraded mode instead of being silently rewritten.

mod types;

pub use types::{SemVer, VersionComparison, VersionError};

use crate::config::read_config;
use crate::utils::TOOL_VERSION;
use std::path::Path;
use tracing::warn;

/// The running daemon's version as a SemVer.
pub fn tool_version() -> SemVer {
    SemVer::parse(TOOL_VERSION).expect("CARGO_PKG_VERSION is valid semver")
}

/// Compare a workspace format version against the daemon version.
pub fn compare_versions(workspace: &SemVer, daemon: &SemVer) -> VersionComparison {
    match workspace.cmp(daemon) {
        std::cmp::Ordering::Equal => VersionComparison::Equal,
        std::cmp::Ordering::Less => VersionComparison::WorkspaceBehind,
        std::cmp::Ordering::Greater => VersionComparison::WorkspaceAhead,
    }
}

/// Check the workspace under the given managed root against the daemon
/// version, logging a warning when the workspace is ahead.
///
/// A missing config or missing version field counts as current: fresh
/// workspaces are always written at the daemon's own version.
pub async fn check_workspace_version(root: &Path) -> VersionComparison {
    let daemon = tool_version();

    if let Ok(Some(config)) = read_config(root).await {
        if let Some(recorded) = config.version.as_deref() {
            if let Ok(workspace) = SemVer::parse(recorded) {
                let comparison = compare_versions(&workspace, &daemon);

                if comparison == VersionComparison::WorkspaceAhead {
                    warn!(
                        workspace_version = %workspace,
                        daemon_version = %daemon,
                        "Workspace format is newer than this daemon, operating in degraded mode"
                    );
                }

                return comparison;
            }
        }
    }

    VersionComparison::Equal
}
