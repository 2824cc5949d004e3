//! The reconciliation engine: state classification over a managed root,
//! consent gathering for destructive repairs and convergent plan execution.

mod decisions;
mod execute;
mod orchestrate;
mod plan;
mod scan;

pub use decisions::{gather_decisions, DecisionMode, ReconciliationDecisions};
pub use execute::{
    execute_reconciliation, AppliedChanges, ApplyError, ExecuteError, ExecutionResult,
};
pub use orchestrate::{ReconcileReport, Reconciler};
pub use plan::{build_reconciliation_plan, FileInfo, PlanError, ReconciliationPlan};
pub use scan::scan_managed_root;
