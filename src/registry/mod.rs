mod store;
mod types;

pub use store::{WorkspaceRegistry, INDEX_FILE};
pub use types::{TrackedWorkspace, WorkspaceIndex, WorkspaceInfo};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to determine home directory")]
    HomeDirNotFound,

    #[error("Workspace not found in registry: {0}")]
    WorkspaceNotFound(String),
}
