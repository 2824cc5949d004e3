use super::decisions::ReconciliationDecisions;
use super::plan::{FileInfo, ReconciliationPlan};
use crate::manifest::{
    find_managed_file, managed_file_entry, new_manifest, upsert_managed_file, ManagedFileType,
    WorkspaceManifest,
};
use crate::scaffold::TemplateRegistry;
use crate::utils::hash_bytes;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No template content for managed file '{0}'")]
    MissingTemplate(String),
}

/// Paths applied (or deliberately skipped) so far, in execution order.
#[derive(Debug, Clone, Default)]
pub struct AppliedChanges {
    pub created: Vec<String>,
    pub restored: Vec<String>,
    pub reset: Vec<String>,
    pub skipped: Vec<String>,
}

/// Execution halted mid-plan. `completed` reports exactly which operations
/// landed before the failure; the manifest was not persisted, so the next
/// run re-derives state from disk and converges.
#[derive(Error, Debug)]
#[error("Reconciliation aborted at '{path}': {source}")]
pub struct ExecuteError {
    pub path: String,
    pub completed: AppliedChanges,
    #[source]
    pub source: ApplyError,
}

/// What a completed execution changed, plus the evolved manifest.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub changes: AppliedChanges,
    pub manifest: WorkspaceManifest,
}

/// Apply a plan against the filesystem.
///
/// Creations are unconditional; restores and resets happen only for paths
/// the decisions approved. A skipped candidate touches neither the
/// filesystem nor the manifest, so an identical rerun reproduces the same
/// classification. The base manifest is taken by value and returned
/// evolved; persisting it is the caller's job, after the whole execution
/// succeeded.
pub async fn execute_reconciliation(
    root: &Path,
    plan: &ReconciliationPlan,
    decisions: &ReconciliationDecisions,
    base: Option<WorkspaceManifest>,
    registry: &dyn TemplateRegistry,
) -> Result<ExecutionResult, ExecuteError> {
    let mut manifest = base.unwrap_or_else(new_manifest);
    let mut changes = AppliedChanges::default();

    for info in &plan.to_create {
        materialize(root, info, registry, &mut manifest)
            .await
            .map_err(|source| halt(&info.path, &changes, source))?;
        changes.created.push(info.path.clone());
    }

    for info in &plan.to_restore {
        if decisions.restore.contains(&info.path) {
            materialize(root, info, registry, &mut manifest)
                .await
                .map_err(|source| halt(&info.path, &changes, source))?;
            changes.restored.push(info.path.clone());
        } else {
            changes.skipped.push(info.path.clone());
        }
    }

    for info in &plan.to_reset {
        if decisions.reset.contains(&info.path) {
            materialize(root, info, registry, &mut manifest)
                .await
                .map_err(|source| halt(&info.path, &changes, source))?;
            changes.reset.push(info.path.clone());
        } else {
            changes.skipped.push(info.path.clone());
        }
    }

    // Adopt up-to-date paths the manifest does not know yet; entries it
    // already tracks stay exactly as recorded.
    for info in &plan.up_to_date {
        if find_managed_file(&manifest, &info.path).is_none() {
            upsert_managed_file(
                &mut manifest,
                managed_file_entry(info.path.clone(), info.current_hash.clone(), info.file_type),
            );
        }
    }

    Ok(ExecutionResult { changes, manifest })
}

fn halt(path: &str, completed: &AppliedChanges, source: ApplyError) -> ExecuteError {
    ExecuteError {
        path: path.to_string(),
        completed: completed.clone(),
        source,
    }
}

/// Write canonical content for a file (or create the directory) and record
/// the entry in the manifest.
async fn materialize(
    root: &Path,
    info: &FileInfo,
    registry: &dyn TemplateRegistry,
    manifest: &mut WorkspaceManifest,
) -> Result<(), ApplyError> {
    let full_path = root.join(info.path.trim_end_matches('/'));

    let hash = match info.file_type {
        ManagedFileType::Directory => {
            fs::create_dir_all(&full_path).await?;
            String::new()
        }
        ManagedFileType::File => {
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            let content = registry
                .content_for(&info.path)
                .ok_or_else(|| ApplyError::MissingTemplate(info.path.clone()))?;
            fs::write(&full_path, &content).await?;
            hash_bytes(&content)
        }
    };

    upsert_managed_file(
        manifest,
        managed_file_entry(info.path.clone(), hash, info.file_type),
    );
    Ok(())
}
