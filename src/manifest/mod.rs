mod types;

pub use types::{ManagedFile, ManagedFileType, WorkspaceManifest, SCHEMA_VERSION};

use crate::utils::{manifest_path, now_iso, TOOL_VERSION};
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to serialize manifest: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Read the manifest under the given managed root.
///
/// A missing file and an unparsable file both yield `None`: either way the
/// engine has no baseline and re-derives state from disk on the next run.
pub async fn read_manifest(root: &Path) -> Result<Option<WorkspaceManifest>, ManifestError> {
    let path = manifest_path(root);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).await?;
    match serde_json::from_str(&content) {
        Ok(manifest) => Ok(Some(manifest)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Manifest unparsable, treating as absent");
            Ok(None)
        }
    }
}

/// Persist the manifest under the given managed root.
pub async fn write_manifest(root: &Path, manifest: &WorkspaceManifest) -> Result<(), ManifestError> {
    let path = manifest_path(root);
    let content = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, content).await?;
    Ok(())
}

/// Create a new empty manifest stamped with the current tool version.
pub fn new_manifest() -> WorkspaceManifest {
    let now = now_iso();
    WorkspaceManifest {
        schema_version: SCHEMA_VERSION,
        tool_version: TOOL_VERSION.to_string(),
        created_at: now.clone(),
        updated_at: now,
        managed_files: Vec::new(),
    }
}

/// Add or replace an entry, keyed by path.
pub fn upsert_managed_file(manifest: &mut WorkspaceManifest, file: ManagedFile) {
    manifest.managed_files.retain(|f| f.path != file.path);
    manifest.managed_files.push(file);
    manifest.updated_at = now_iso();
}

/// Find an entry by path.
pub fn find_managed_file<'a>(
    manifest: &'a WorkspaceManifest,
    path: &str,
) -> Option<&'a ManagedFile> {
    manifest.managed_files.iter().find(|f| f.path == path)
}

/// Build an entry stamped now with the current tool version.
pub fn managed_file_entry(path: String, hash: String, file_type: ManagedFileType) -> ManagedFile {
    ManagedFile {
        path,
        hash,
        version: TOOL_VERSION.to_string(),
        created_at: now_iso(),
        file_type,
    }
}
