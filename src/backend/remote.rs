use super::{BackendError, ReconciliationBackend};
use crate::manifest::ManagedFileType;
use crate::reconcile::{FileInfo, ReconcileReport, ReconciliationDecisions, ReconciliationPlan};
use crate::server::proto;
use crate::server::proto::trellis_daemon_client::TrellisDaemonClient;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Delegates plan and reconcile to a running daemon over gRPC.
pub struct RemoteBackend {
    client: TrellisDaemonClient<Channel>,
}

impl RemoteBackend {
    /// Connect to the endpoint and verify it answers `GetDaemonInfo`
    /// within the probe timeout. Only the probe is bounded; later calls
    /// run at the server's pace.
    pub async fn probe(endpoint: &str) -> Result<Self, BackendError> {
        let uri = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        };

        let channel = Endpoint::from_shared(uri)?
            .connect_timeout(PROBE_TIMEOUT)
            .connect()
            .await?;

        let mut client = TrellisDaemonClient::new(channel);
        tokio::time::timeout(
            PROBE_TIMEOUT,
            client.get_daemon_info(proto::GetDaemonInfoRequest {}),
        )
        .await
        .map_err(|_| BackendError::ProbeTimeout(PROBE_TIMEOUT))??;

        Ok(Self { client })
    }
}

#[async_trait]
impl ReconciliationBackend for RemoteBackend {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn plan(&self, workspace: &Path) -> Result<ReconciliationPlan, BackendError> {
        let request = proto::GetReconciliationPlanRequest {
            workspace_path: workspace.to_string_lossy().to_string(),
        };

        let mut client = self.client.clone();
        let response = client.get_reconciliation_plan(request).await?;
        Ok(plan_from_proto(response.into_inner()))
    }

    async fn reconcile(
        &self,
        workspace: &Path,
        decisions: ReconciliationDecisions,
        forced: bool,
    ) -> Result<ReconcileReport, BackendError> {
        let request = proto::InitRequest {
            workspace_path: workspace.to_string_lossy().to_string(),
            force: forced,
            decisions: Some(proto::Decisions {
                restore: decisions.restore.into_iter().collect(),
                reset: decisions.reset.into_iter().collect(),
                skip: decisions.skip.into_iter().collect(),
            }),
        };

        let mut client = self.client.clone();
        let response = client.init(request).await?;
        Ok(report_from_proto(response.into_inner()))
    }
}

fn file_info_from_proto(info: proto::FileInfo) -> FileInfo {
    FileInfo {
        file_type: match proto::FileType::try_from(info.file_type) {
            Ok(proto::FileType::Directory) => ManagedFileType::Directory,
            _ => ManagedFileType::File,
        },
        path: info.path,
        current_hash: info.current_hash,
        expected_hash: info.expected_hash,
        content_preview: if info.content_preview.is_empty() {
            None
        } else {
            Some(info.content_preview)
        },
    }
}

fn plan_from_proto(plan: proto::ReconciliationPlan) -> ReconciliationPlan {
    ReconciliationPlan {
        to_create: plan.to_create.into_iter().map(file_info_from_proto).collect(),
        to_restore: plan
            .to_restore
            .into_iter()
            .map(file_info_from_proto)
            .collect(),
        to_reset: plan.to_reset.into_iter().map(file_info_from_proto).collect(),
        up_to_date: plan
            .up_to_date
            .into_iter()
            .map(file_info_from_proto)
            .collect(),
        user_files: plan
            .user_files
            .into_iter()
            .map(file_info_from_proto)
            .collect(),
    }
}

fn report_from_proto(response: proto::InitResponse) -> ReconcileReport {
    ReconcileReport {
        success: response.success,
        error: if response.error.is_empty() {
            None
        } else {
            Some(response.error)
        },
        fresh_root: response.fresh_root,
        created: response.created,
        restored: response.restored,
        reset: response.reset,
        skipped: response.skipped,
        user_files: response.user_files,
    }
}
