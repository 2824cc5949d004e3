use std::path::Path;
use tempfile::TempDir;
use trellis_daemon::reconcile::{DecisionMode, ReconcileReport, Reconciler};

/// Create a temporary directory that lives for the duration of a test.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Should create temp dir")
}

/// Initialize a trellis workspace with the non-interactive defaults.
pub async fn init_workspace(workspace: &Path) -> ReconcileReport {
    let reconciler = Reconciler::builtin();
    let report = reconciler
        .reconcile(workspace, &DecisionMode::Forced)
        .await;
    assert!(
        report.success,
        "workspace init should succeed: {:?}",
        report.error
    );
    report
}
