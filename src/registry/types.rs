use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored per workspace in the index file (timestamps only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedWorkspace {
    pub first_accessed: String,
    pub last_accessed: String,
}

/// The on-disk index of every workspace this daemon has touched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceIndex {
    /// Schema version for future migrations.
    pub schema_version: u32,

    /// When the index was last modified.
    pub updated_at: String,

    /// Map of workspace path -> timestamps.
    pub workspaces: HashMap<String, TrackedWorkspace>,
}

impl WorkspaceIndex {
    pub fn new() -> Self {
        Self {
            schema_version: 1,
            updated_at: crate::utils::now_iso(),
            workspaces: HashMap::new(),
        }
    }
}

/// Returned by queries, enriched with live data read from the workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceInfo {
    /// Absolute path to the workspace.
    pub path: String,

    /// When the workspace was first tracked.
    pub first_accessed: String,

    /// When the workspace was last touched by any RPC.
    pub last_accessed: String,

    /// Whether the managed root carries a manifest (fetched live).
    pub initialized: bool,

    /// Number of manifest entries, zero when uninitialized (fetched live).
    pub managed_count: u32,

    /// Workspace directory name (fetched live).
    pub name: Option<String>,

    /// Workspace format version from config, when recorded (fetched live).
    pub version: Option<String>,
}
