use super::scan::scan_managed_root;
use crate::manifest::{find_managed_file, ManagedFileType, ManifestError, WorkspaceManifest};
use crate::scaffold::TemplateRegistry;
use crate::utils::{hash_bytes, hash_file, DIRECTORY_HASH};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

const PREVIEW_CHARS: usize = 100;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    ManifestError(#[from] ManifestError),
}

/// One path with enough context to describe the change it needs.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub file_type: ManagedFileType,
    /// Digest of what is on disk right now; empty when the path is absent
    /// or a directory.
    pub current_hash: String,
    /// Digest the engine would converge the path to: the manifest hash for
    /// tracked paths, the canonical template hash otherwise.
    pub expected_hash: String,
    pub content_preview: Option<String>,
}

/// Every managed path classified into exactly one bucket, plus the on-disk
/// paths the scaffold does not own.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    pub to_create: Vec<FileInfo>,
    pub to_restore: Vec<FileInfo>,
    pub to_reset: Vec<FileInfo>,
    pub up_to_date: Vec<FileInfo>,
    pub user_files: Vec<FileInfo>,
}

impl ReconciliationPlan {
    /// True when applying the plan would need per-item consent.
    pub fn needs_decisions(&self) -> bool {
        !self.to_restore.is_empty() || !self.to_reset.is_empty()
    }
}

/// Classify every canonical managed path by the cross of on-disk presence
/// and manifest tracking.
///
/// Absent and untracked is a plain creation; absent but tracked means the
/// user deleted something the tool once wrote, so it becomes a restore
/// candidate. Present paths diff against a baseline that depends on
/// tracking: tracked paths compare to the hash recorded at last write, so a
/// changed template alone never flags an untouched file, while untracked
/// paths have no recorded baseline and compare to the canonical template
/// content (matching content is adopted silently).
pub async fn build_reconciliation_plan(
    root: &Path,
    manifest: Option<&WorkspaceManifest>,
    registry: &dyn TemplateRegistry,
) -> Result<ReconciliationPlan, PlanError> {
    let on_disk = scan_managed_root(root);
    let managed_paths = registry.managed_paths();
    let managed_set: HashSet<&str> = managed_paths.iter().map(String::as_str).collect();

    let mut plan = ReconciliationPlan::default();

    for path in &managed_paths {
        let file_type = match registry.path_type(path) {
            Some(t) => t,
            None => continue,
        };
        let template_hash = match file_type {
            ManagedFileType::Directory => DIRECTORY_HASH.to_string(),
            ManagedFileType::File => hash_bytes(&registry.content_for(path).unwrap_or_default()),
        };
        let preview = content_preview(registry, path);

        let tracked = manifest.and_then(|m| find_managed_file(m, path));

        if !on_disk.contains(path.as_str()) {
            let info = FileInfo {
                path: path.clone(),
                file_type,
                current_hash: String::new(),
                expected_hash: match tracked {
                    Some(entry) => entry.hash.clone(),
                    None => template_hash,
                },
                content_preview: preview,
            };
            if tracked.is_some() {
                plan.to_restore.push(info);
            } else {
                plan.to_create.push(info);
            }
            continue;
        }

        let current_hash = match file_type {
            ManagedFileType::Directory => DIRECTORY_HASH.to_string(),
            ManagedFileType::File => hash_file(&root.join(path)).await?,
        };
        let info = FileInfo {
            path: path.clone(),
            file_type,
            expected_hash: match tracked {
                Some(entry) => entry.hash.clone(),
                None => template_hash,
            },
            current_hash,
            content_preview: preview,
        };
        if info.current_hash == info.expected_hash {
            plan.up_to_date.push(info);
        } else {
            plan.to_reset.push(info);
        }
    }

    // Everything else under the root belongs to the user: reported for
    // visibility, never touched.
    for disk_path in &on_disk {
        if managed_set.contains(disk_path.as_str()) {
            continue;
        }
        let is_dir = disk_path.ends_with('/');
        plan.user_files.push(FileInfo {
            path: disk_path.clone(),
            file_type: if is_dir {
                ManagedFileType::Directory
            } else {
                ManagedFileType::File
            },
            current_hash: if is_dir {
                DIRECTORY_HASH.to_string()
            } else {
                hash_file(&root.join(disk_path)).await?
            },
            expected_hash: String::new(),
            content_preview: None,
        });
    }

    Ok(plan)
}

fn content_preview(registry: &dyn TemplateRegistry, path: &str) -> Option<String> {
    registry.content_for(path).map(|content| {
        String::from_utf8_lossy(&content)
            .chars()
            .take(PREVIEW_CHARS)
            .collect()
    })
}
