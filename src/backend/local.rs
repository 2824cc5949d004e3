use super::{BackendError, ReconciliationBackend};
use crate::reconcile::{
    DecisionMode, ReconcileReport, ReconciliationDecisions, ReconciliationPlan, Reconciler,
};
use async_trait::async_trait;
use std::path::Path;

/// Runs the engine in-process against the local filesystem.
pub struct LocalBackend {
    reconciler: Reconciler,
}

impl LocalBackend {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }
}

#[async_trait]
impl ReconciliationBackend for LocalBackend {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn plan(&self, workspace: &Path) -> Result<ReconciliationPlan, BackendError> {
        Ok(self.reconciler.plan(workspace).await?)
    }

    async fn reconcile(
        &self,
        workspace: &Path,
        decisions: ReconciliationDecisions,
        forced: bool,
    ) -> Result<ReconcileReport, BackendError> {
        let report = if forced {
            self.reconciler
                .reconcile(workspace, &DecisionMode::Forced)
                .await
        } else {
            self.reconciler.reconcile_with(workspace, decisions).await
        };

        Ok(report)
    }
}
