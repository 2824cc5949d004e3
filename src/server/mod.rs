use crate::manifest::{read_manifest, ManagedFileType as InternalFileType, SCHEMA_VERSION};
use crate::migration::{default_migrations, MigrationError, MigrationRunner};
use crate::reconcile::{DecisionMode, ReconcileReport, ReconciliationDecisions, Reconciler};
use crate::registry::{WorkspaceInfo as TrackedInfo, WorkspaceRegistry};
use crate::utils::{managed_root, manifest_path, TOOL_VERSION};
use crate::version::{check_workspace_version, SemVer};
use std::path::Path;
use tonic::{Request, Response, Status};

// Generated protobuf types
pub mod proto {
    tonic::include_proto!("trellis");
}

use proto::trellis_daemon_server::TrellisDaemon;
use proto::*;

/// The daemon's gRPC surface over one reconciler and one workspace
/// registry, both injected at construction.
pub struct TrellisDaemonService {
    reconciler: Reconciler,
    registry: WorkspaceRegistry,
}

impl TrellisDaemonService {
    pub fn new(reconciler: Reconciler, registry: WorkspaceRegistry) -> Self {
        Self {
            reconciler,
            registry,
        }
    }
}

#[tonic::async_trait]
impl TrellisDaemon for TrellisDaemonService {
    async fn get_daemon_info(
        &self,
        _request: Request<GetDaemonInfoRequest>,
    ) -> Result<Response<DaemonInfo>, Status> {
        Ok(Response::new(DaemonInfo {
            version: TOOL_VERSION.to_string(),
            manifest_schema_version: SCHEMA_VERSION,
        }))
    }

    async fn is_initialized(
        &self,
        request: Request<IsInitializedRequest>,
    ) -> Result<Response<IsInitializedResponse>, Status> {
        let req = request.into_inner();
        let root = managed_root(Path::new(&req.workspace_path));

        let initialized = manifest_path(&root).exists();
        let managed_root = if initialized {
            root.to_string_lossy().to_string()
        } else {
            String::new()
        };

        self.registry.track_detached(req.workspace_path);

        Ok(Response::new(IsInitializedResponse {
            initialized,
            managed_root,
        }))
    }

    async fn get_reconciliation_plan(
        &self,
        request: Request<GetReconciliationPlanRequest>,
    ) -> Result<Response<ReconciliationPlan>, Status> {
        let req = request.into_inner();
        let workspace_path = Path::new(&req.workspace_path);

        match self.reconciler.plan(workspace_path).await {
            Ok(plan) => {
                self.registry.track_detached(req.workspace_path);

                let needs_decisions = plan.needs_decisions();
                Ok(Response::new(ReconciliationPlan {
                    to_create: plan.to_create.into_iter().map(file_info_to_proto).collect(),
                    to_restore: plan
                        .to_restore
                        .into_iter()
                        .map(file_info_to_proto)
                        .collect(),
                    to_reset: plan.to_reset.into_iter().map(file_info_to_proto).collect(),
                    up_to_date: plan
                        .up_to_date
                        .into_iter()
                        .map(file_info_to_proto)
                        .collect(),
                    user_files: plan
                        .user_files
                        .into_iter()
                        .map(file_info_to_proto)
                        .collect(),
                    needs_decisions,
                }))
            }
            Err(e) => Err(Status::internal(e.to_string())),
        }
    }

    async fn init(&self, request: Request<InitRequest>) -> Result<Response<InitResponse>, Status> {
        let req = request.into_inner();
        let workspace_path = Path::new(&req.workspace_path);
        let root = managed_root(workspace_path);

        check_workspace_version(&root).await;

        // Forced mode applies the non-interactive defaults; otherwise the
        // caller already gathered consent and sends the verdicts along.
        let report = if req.force {
            self.reconciler
                .reconcile(workspace_path, &DecisionMode::Forced)
                .await
        } else {
            let decisions = req.decisions.map(decisions_from_proto).unwrap_or_default();
            self.reconciler
                .reconcile_with(workspace_path, decisions)
                .await
        };

        let manifest = if report.success {
            self.registry.track_detached(req.workspace_path);
            match read_manifest(&root).await {
                Ok(Some(m)) => Some(manifest_to_proto(&m)),
                _ => None,
            }
        } else {
            None
        };

        Ok(Response::new(init_response(report, manifest)))
    }

    async fn get_manifest(
        &self,
        request: Request<GetManifestRequest>,
    ) -> Result<Response<Manifest>, Status> {
        let req = request.into_inner();
        let root = managed_root(Path::new(&req.workspace_path));

        self.registry.track_detached(req.workspace_path);

        match read_manifest(&root).await {
            Ok(Some(manifest)) => Ok(Response::new(manifest_to_proto(&manifest))),
            Ok(None) => Err(Status::not_found("Manifest not found")),
            Err(e) => Err(Status::internal(e.to_string())),
        }
    }

    async fn list_workspaces(
        &self,
        request: Request<ListWorkspacesRequest>,
    ) -> Result<Response<ListWorkspacesResponse>, Status> {
        let req = request.into_inner();

        match self.registry.list(req.include_missing).await {
            Ok(workspaces) => {
                let total_count = workspaces.len() as i32;
                Ok(Response::new(ListWorkspacesResponse {
                    workspaces: workspaces
                        .into_iter()
                        .map(workspace_info_to_proto)
                        .collect(),
                    total_count,
                }))
            }
            Err(e) => Err(Status::internal(e.to_string())),
        }
    }

    async fn get_workspace_info(
        &self,
        request: Request<GetWorkspaceInfoRequest>,
    ) -> Result<Response<GetWorkspaceInfoResponse>, Status> {
        let req = request.into_inner();

        match self.registry.info(&req.workspace_path).await {
            Ok(Some(info)) => Ok(Response::new(GetWorkspaceInfoResponse {
                found: true,
                workspace: Some(workspace_info_to_proto(info)),
            })),
            Ok(None) => Ok(Response::new(GetWorkspaceInfoResponse {
                found: false,
                workspace: None,
            })),
            Err(e) => Err(Status::internal(e.to_string())),
        }
    }

    async fn untrack_workspace(
        &self,
        request: Request<UntrackWorkspaceRequest>,
    ) -> Result<Response<UntrackWorkspaceResponse>, Status> {
        let req = request.into_inner();

        match self.registry.untrack(&req.workspace_path).await {
            Ok(()) => Ok(Response::new(UntrackWorkspaceResponse {
                success: true,
                error: String::new(),
            })),
            Err(e) => Ok(Response::new(UntrackWorkspaceResponse {
                success: false,
                error: e.to_string(),
            })),
        }
    }

    async fn migrate_workspace(
        &self,
        request: Request<MigrateWorkspaceRequest>,
    ) -> Result<Response<MigrateWorkspaceResponse>, Status> {
        let req = request.into_inner();
        let root = managed_root(Path::new(&req.workspace_path));

        let target = SemVer::parse(&req.target_version)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        self.registry.track_detached(req.workspace_path);

        let runner = MigrationRunner::new(default_migrations());
        match runner.migrate(&root, &target).await {
            Ok(outcome) => Ok(Response::new(MigrateWorkspaceResponse {
                success: outcome.success,
                error: outcome.error.unwrap_or_default(),
                from_version: outcome.from_version,
                to_version: outcome.to_version,
                applied: outcome.applied,
            })),
            // An unroutable target version is the caller's mistake, like an
            // unparsable one.
            Err(e @ MigrationError::NoMigrationPath(_, _)) => {
                Err(Status::invalid_argument(e.to_string()))
            }
            Err(e) => Err(Status::internal(e.to_string())),
        }
    }
}

// ============ Conversion helpers ============

fn file_type_to_proto(file_type: InternalFileType) -> FileType {
    match file_type {
        InternalFileType::File => FileType::File,
        InternalFileType::Directory => FileType::Directory,
    }
}

fn manifest_to_proto(manifest: &crate::manifest::WorkspaceManifest) -> Manifest {
    Manifest {
        schema_version: manifest.schema_version,
        tool_version: manifest.tool_version.clone(),
        created_at: manifest.created_at.clone(),
        updated_at: manifest.updated_at.clone(),
        managed_files: manifest
            .managed_files
            .iter()
            .map(|f| ManagedFile {
                path: f.path.clone(),
                hash: f.hash.clone(),
                version: f.version.clone(),
                created_at: f.created_at.clone(),
                file_type: file_type_to_proto(f.file_type) as i32,
            })
            .collect(),
    }
}

fn file_info_to_proto(info: crate::reconcile::FileInfo) -> FileInfo {
    FileInfo {
        path: info.path,
        file_type: file_type_to_proto(info.file_type) as i32,
        current_hash: info.current_hash,
        expected_hash: info.expected_hash,
        content_preview: info.content_preview.unwrap_or_default(),
    }
}

fn decisions_from_proto(decisions: Decisions) -> ReconciliationDecisions {
    ReconciliationDecisions {
        restore: decisions.restore.into_iter().collect(),
        reset: decisions.reset.into_iter().collect(),
        skip: decisions.skip.into_iter().collect(),
    }
}

fn workspace_info_to_proto(info: TrackedInfo) -> WorkspaceInfo {
    WorkspaceInfo {
        path: info.path,
        first_accessed: info.first_accessed,
        last_accessed: info.last_accessed,
        initialized: info.initialized,
        managed_count: info.managed_count,
        name: info.name.unwrap_or_default(),
        version: info.version.unwrap_or_default(),
    }
}

fn init_response(report: ReconcileReport, manifest: Option<Manifest>) -> InitResponse {
    InitResponse {
        success: report.success,
        error: report.error.unwrap_or_default(),
        fresh_root: report.fresh_root,
        created: report.created,
        restored: report.restored,
        reset: report.reset,
        skipped: report.skipped,
        user_files: report.user_files,
        manifest,
    }
}
