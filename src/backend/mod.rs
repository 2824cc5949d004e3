//! Where reconciliation runs: in-process against the local filesystem, or
//! delegated to a running daemon over gRPC. The choice is made once, by an
//! explicit reachability probe, instead of being inferred from failures
//! mid-operation.

mod local;
mod remote;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

use crate::reconcile::{
    ReconcileReport, ReconciliationDecisions, ReconciliationPlan, Reconciler,
};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Plan error: {0}")]
    PlanError(#[from] crate::reconcile::PlanError),

    #[error("Transport error: {0}")]
    TransportError(#[from] tonic::transport::Error),

    #[error("RPC error: {0}")]
    RpcError(#[from] tonic::Status),

    #[error("Daemon did not answer within {0:?}")]
    ProbeTimeout(std::time::Duration),
}

/// Executes plans and reconciliations for a workspace, wherever that
/// happens to run.
#[async_trait]
pub trait ReconciliationBackend: Send + Sync {
    /// Short name for logs.
    fn kind(&self) -> &'static str;

    /// Classify the workspace without touching it.
    async fn plan(&self, workspace: &Path) -> Result<ReconciliationPlan, BackendError>;

    /// Run a reconciliation with pre-gathered decisions, or with the
    /// non-interactive defaults when `forced` is set.
    async fn reconcile(
        &self,
        workspace: &Path,
        decisions: ReconciliationDecisions,
        forced: bool,
    ) -> Result<ReconcileReport, BackendError>;
}

/// Probe the daemon endpoint once and pick a backend: a daemon that
/// answers wins, anything else falls back to running in-process. The
/// outcome is logged and stays fixed for the life of the returned backend.
pub async fn select_backend(endpoint: Option<&str>) -> Box<dyn ReconciliationBackend> {
    if let Some(endpoint) = endpoint {
        match RemoteBackend::probe(endpoint).await {
            Ok(remote) => {
                info!(endpoint, "Reconciliation backend: remote daemon");
                return Box::new(remote);
            }
            Err(e) => {
                warn!(endpoint, error = %e, "Daemon unreachable, falling back to local backend");
            }
        }
    }

    Box::new(LocalBackend::new(Reconciler::builtin()))
}
