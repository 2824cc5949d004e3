pub mod backend;
pub mod config;
pub mod confirm;
pub mod manifest;
pub mod migration;
pub mod reconcile;
pub mod registry;
pub mod scaffold;
pub mod server;
pub mod utils;
pub mod version;

// Re-export commonly used types
pub use backend::{
    select_backend, BackendError, LocalBackend, ReconciliationBackend, RemoteBackend,
};
pub use config::{read_config, write_config, ConfigError, WorkspaceConfig};
pub use confirm::{Confirmer, ScriptedConfirmer, StdioConfirmer};
pub use manifest::{ManagedFile, ManagedFileType, ManifestError, WorkspaceManifest};
pub use migration::{
    default_migrations, Migration, MigrationDirection, MigrationError, MigrationOutcome,
    MigrationRunner, MigrationSet,
};
pub use reconcile::{
    build_reconciliation_plan, execute_reconciliation, DecisionMode, ExecutionResult, FileInfo,
    ReconcileReport, ReconciliationDecisions, ReconciliationPlan, Reconciler,
};
pub use registry::{
    RegistryError, TrackedWorkspace, WorkspaceIndex, WorkspaceInfo, WorkspaceRegistry,
};
pub use scaffold::{BuiltinScaffold, TemplateRegistry};
pub use server::TrellisDaemonService;
pub use version::{compare_versions, tool_version, SemVer, VersionComparison, VersionError};
