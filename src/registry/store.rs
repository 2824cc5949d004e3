use super::types::{TrackedWorkspace, WorkspaceIndex, WorkspaceInfo};
use super::RegistryError;
use crate::config::read_config;
use crate::manifest::read_manifest;
use crate::utils::{managed_root, manifest_path, now_iso, TRELLIS_DIR};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

/// Name of the index file inside the config directory.
pub const INDEX_FILE: &str = "workspaces.json";

/// Handle on the global workspace index (`~/.trellis/workspaces.json` by
/// default). Clones share one write lock; pass the handle to whoever needs
/// it instead of going through process globals.
#[derive(Clone)]
pub struct WorkspaceRegistry {
    config_dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl WorkspaceRegistry {
    /// Registry under the user's home directory.
    pub fn from_home() -> Result<Self, RegistryError> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| RegistryError::HomeDirNotFound)?;

        Ok(Self::new(PathBuf::from(home).join(TRELLIS_DIR)))
    }

    /// Registry under an explicit config directory.
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.config_dir.join(INDEX_FILE)
    }

    /// Record an access to the workspace, creating the entry on first
    /// contact. Called from every RPC that names a workspace.
    pub async fn track(&self, workspace_path: &str) -> Result<(), RegistryError> {
        let key = canonical_key(workspace_path);

        // One lock spans the whole read-modify-write cycle.
        let _guard = self.lock.lock().await;

        let mut index = self.read_index().await?;
        let now = now_iso();

        if let Some(entry) = index.workspaces.get_mut(&key) {
            entry.last_accessed = now.clone();
        } else {
            index.workspaces.insert(
                key,
                TrackedWorkspace {
                    first_accessed: now.clone(),
                    last_accessed: now.clone(),
                },
            );
        }

        index.updated_at = now;
        self.write_index(&index).await
    }

    /// Fire-and-forget variant of [`track`](Self::track); failures are
    /// logged and never block the calling operation.
    pub fn track_detached(&self, workspace_path: String) {
        let registry = self.clone();
        tokio::spawn(async move {
            if let Err(e) = registry.track(&workspace_path).await {
                warn!(workspace = %workspace_path, error = %e, "Failed to track workspace");
            }
        });
    }

    /// Remove a workspace from the index. The workspace itself is not
    /// touched.
    pub async fn untrack(&self, workspace_path: &str) -> Result<(), RegistryError> {
        let key = canonical_key(workspace_path);

        let _guard = self.lock.lock().await;

        let mut index = self.read_index().await?;
        if index.workspaces.remove(&key).is_none()
            && index.workspaces.remove(workspace_path).is_none()
        {
            return Err(RegistryError::WorkspaceNotFound(workspace_path.to_string()));
        }

        index.updated_at = now_iso();
        self.write_index(&index).await
    }

    /// List tracked workspaces enriched with live data, most recently
    /// accessed first. Entries whose path no longer exists are skipped
    /// unless `include_missing` is set.
    pub async fn list(&self, include_missing: bool) -> Result<Vec<WorkspaceInfo>, RegistryError> {
        let index = self.read_index().await?;

        let mut workspaces = Vec::new();
        for (path, tracked) in &index.workspaces {
            if !include_missing && !Path::new(path).exists() {
                continue;
            }
            workspaces.push(enrich(path, tracked).await);
        }

        workspaces.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        Ok(workspaces)
    }

    /// Live info for one tracked workspace, `None` when it is not indexed.
    pub async fn info(&self, workspace_path: &str) -> Result<Option<WorkspaceInfo>, RegistryError> {
        let key = canonical_key(workspace_path);
        let index = self.read_index().await?;

        let tracked = index
            .workspaces
            .get(&key)
            .or_else(|| index.workspaces.get(workspace_path));

        match tracked {
            Some(tracked) => Ok(Some(enrich(&key, tracked).await)),
            None => Ok(None),
        }
    }

    async fn read_index(&self) -> Result<WorkspaceIndex, RegistryError> {
        let path = self.index_path();

        if !path.exists() {
            return Ok(WorkspaceIndex::new());
        }

        let content = fs::read_to_string(&path).await?;
        let index: WorkspaceIndex = serde_json::from_str(&content)?;
        Ok(index)
    }

    /// Atomic write via temp file + rename. Caller holds the lock.
    async fn write_index(&self, index: &WorkspaceIndex) -> Result<(), RegistryError> {
        let path = self.index_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(index)?;
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }
}

/// Canonicalized path string for consistent index keys; falls back to the
/// given string when canonicalization fails (e.g. the path is gone).
fn canonical_key(workspace_path: &str) -> String {
    Path::new(workspace_path)
        .canonicalize()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| workspace_path.to_string())
}

/// Join index timestamps with live data read from the workspace itself.
async fn enrich(path: &str, tracked: &TrackedWorkspace) -> WorkspaceInfo {
    let workspace = Path::new(path);
    let root = managed_root(workspace);

    let initialized = manifest_path(&root).exists();
    let managed_count = match read_manifest(&root).await {
        Ok(Some(manifest)) => manifest.managed_files.len() as u32,
        _ => 0,
    };
    let version = match read_config(&root).await {
        Ok(Some(config)) => config.version,
        _ => None,
    };
    let name = workspace
        .file_name()
        .map(|n| n.to_string_lossy().to_string());

    WorkspaceInfo {
        path: path.to_string(),
        first_accessed: tracked.first_accessed.clone(),
        last_accessed: tracked.last_accessed.clone(),
        initialized,
        managed_count,
        name,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry(temp: &tempfile::TempDir) -> WorkspaceRegistry {
        WorkspaceRegistry::new(temp.path().join("config"))
    }

    #[test]
    fn test_index_path_under_config_dir() {
        let temp = tempfile::tempdir().unwrap();
        let registry = test_registry(&temp);
        assert!(registry.index_path().ends_with("config/workspaces.json"));
    }

    #[tokio::test]
    async fn test_track_creates_then_touches_entry() {
        let temp = tempfile::tempdir().unwrap();
        let registry = test_registry(&temp);
        let workspace = temp.path().join("ws");
        fs::create_dir_all(&workspace).await.unwrap();
        let workspace = workspace.to_string_lossy().to_string();

        registry.track(&workspace).await.unwrap();
        let first = registry.info(&workspace).await.unwrap().unwrap();

        registry.track(&workspace).await.unwrap();
        let second = registry.info(&workspace).await.unwrap().unwrap();

        assert_eq!(first.first_accessed, second.first_accessed);
        assert!(second.last_accessed >= first.last_accessed);
    }

    #[tokio::test]
    async fn test_untrack_unknown_workspace_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let registry = test_registry(&temp);

        let result = registry.untrack("/nowhere/in/particular").await;
        assert!(matches!(result, Err(RegistryError::WorkspaceNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_skips_missing_paths_unless_asked() {
        let temp = tempfile::tempdir().unwrap();
        let registry = test_registry(&temp);

        let gone = temp.path().join("gone");
        fs::create_dir_all(&gone).await.unwrap();
        let gone = gone.to_string_lossy().to_string();
        registry.track(&gone).await.unwrap();
        fs::remove_dir_all(&gone).await.unwrap();

        assert!(registry.list(false).await.unwrap().is_empty());
        assert_eq!(registry.list(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_leftover_temp_file_after_write() {
        let temp = tempfile::tempdir().unwrap();
        let registry = test_registry(&temp);
        let workspace = temp.path().join("ws");
        fs::create_dir_all(&workspace).await.unwrap();

        registry
            .track(&workspace.to_string_lossy())
            .await
            .unwrap();

        assert!(registry.index_path().exists());
        assert!(!registry.index_path().with_extension("json.tmp").exists());
    }
}
