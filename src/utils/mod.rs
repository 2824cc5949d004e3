mod hash;

pub use hash::{hash_bytes, hash_file, DIRECTORY_HASH};

use std::path::{Path, PathBuf};

/// Name of the hidden folder trellis owns inside a workspace.
pub const TRELLIS_DIR: &str = ".trellis";

/// Name of the manifest file, directly under the managed root.
pub const MANIFEST_FILE: &str = ".trellis-manifest.json";

/// Version of the running tool.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Managed root for a workspace (`<workspace>/.trellis`).
pub fn managed_root(workspace: &Path) -> PathBuf {
    workspace.join(TRELLIS_DIR)
}

/// Path of the manifest file under a managed root.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Current timestamp in ISO 8601 format.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
