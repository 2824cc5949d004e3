use super::decisions::{gather_decisions, DecisionMode, ReconciliationDecisions};
use super::execute::{execute_reconciliation, AppliedChanges};
use super::plan::{build_reconciliation_plan, PlanError, ReconciliationPlan};
use crate::manifest::{read_manifest, write_manifest};
use crate::scaffold::{BuiltinScaffold, TemplateRegistry};
use crate::utils::managed_root;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info};

/// Outcome of one reconciliation run, success or not.
///
/// Stage failures land here as `success = false` plus a message; operations
/// applied before an execution abort are still reported, never silently
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub success: bool,
    pub error: Option<String>,
    /// True when this run created the managed root itself.
    pub fresh_root: bool,
    pub created: Vec<String>,
    pub restored: Vec<String>,
    pub reset: Vec<String>,
    pub skipped: Vec<String>,
    pub user_files: Vec<String>,
}

impl ReconcileReport {
    fn fail(mut self, message: String) -> Self {
        self.success = false;
        self.error = Some(message);
        self
    }

    fn absorb(&mut self, changes: AppliedChanges) {
        self.created = changes.created;
        self.restored = changes.restored;
        self.reset = changes.reset;
        self.skipped = changes.skipped;
    }
}

enum DecisionSource<'a> {
    Mode(&'a DecisionMode),
    Ready(ReconciliationDecisions),
}

/// Drives scan, plan, decide, execute and persist for one workspace.
///
/// Holds the injected template registry; construct one per process and pass
/// it where it is needed instead of reaching for shared globals.
pub struct Reconciler {
    registry: Arc<dyn TemplateRegistry>,
}

impl Reconciler {
    pub fn new(registry: Arc<dyn TemplateRegistry>) -> Self {
        Self { registry }
    }

    /// Reconciler over the built-in trellis scaffold.
    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinScaffold::new()))
    }

    pub fn registry(&self) -> Arc<dyn TemplateRegistry> {
        Arc::clone(&self.registry)
    }

    /// Classify the workspace without touching it.
    pub async fn plan(&self, workspace: &Path) -> Result<ReconciliationPlan, PlanError> {
        let root = managed_root(workspace);
        let manifest = read_manifest(&root).await?;
        build_reconciliation_plan(&root, manifest.as_ref(), self.registry.as_ref()).await
    }

    /// Initialize or repair the workspace: ensure the managed root exists,
    /// classify every managed path, settle restore/reset questions in the
    /// given mode, apply what was approved and persist the updated
    /// manifest. Failures are folded into the report rather than returned.
    pub async fn reconcile(&self, workspace: &Path, mode: &DecisionMode) -> ReconcileReport {
        self.run(workspace, DecisionSource::Mode(mode)).await
    }

    /// Like [`reconcile`](Self::reconcile), but with verdicts the caller
    /// already gathered, e.g. from a remote client that ran its own
    /// prompts. Candidates the decisions do not approve are skipped.
    pub async fn reconcile_with(
        &self,
        workspace: &Path,
        decisions: ReconciliationDecisions,
    ) -> ReconcileReport {
        self.run(workspace, DecisionSource::Ready(decisions)).await
    }

    async fn run(&self, workspace: &Path, source: DecisionSource<'_>) -> ReconcileReport {
        let root = managed_root(workspace);
        let mut report = ReconcileReport::default();

        report.fresh_root = !root.exists();
        if report.fresh_root {
            if let Err(e) = fs::create_dir_all(&root).await {
                return report.fail(format!("Failed to create managed root: {e}"));
            }
        }

        let manifest = match read_manifest(&root).await {
            Ok(m) => m,
            Err(e) => return report.fail(format!("Failed to read manifest: {e}")),
        };

        let plan =
            match build_reconciliation_plan(&root, manifest.as_ref(), self.registry.as_ref()).await
            {
                Ok(p) => p,
                Err(e) => return report.fail(format!("Failed to plan reconciliation: {e}")),
            };
        report.user_files = plan.user_files.iter().map(|f| f.path.clone()).collect();

        let decisions = match source {
            DecisionSource::Mode(mode) => gather_decisions(&plan, mode).await,
            DecisionSource::Ready(ready) => ready,
        };

        match execute_reconciliation(&root, &plan, &decisions, manifest, self.registry.as_ref())
            .await
        {
            Ok(result) => {
                report.absorb(result.changes);
                if let Err(e) = write_manifest(&root, &result.manifest).await {
                    return report.fail(format!("Failed to persist manifest: {e}"));
                }
                report.success = true;
                info!(
                    workspace = %workspace.display(),
                    fresh_root = report.fresh_root,
                    created = report.created.len(),
                    restored = report.restored.len(),
                    reset = report.reset.len(),
                    skipped = report.skipped.len(),
                    user_files = report.user_files.len(),
                    "Reconciliation complete"
                );
                report
            }
            Err(e) => {
                error!(workspace = %workspace.display(), error = %e, "Reconciliation aborted");
                report.absorb(e.completed.clone());
                report.fail(e.to_string())
            }
        }
    }
}
