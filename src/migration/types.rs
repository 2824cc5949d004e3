//! Types for the workspace migration system.

use crate::version::SemVer;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Version error: {0}")]
    VersionError(#[from] crate::version::VersionError),

    #[error("No migration path from {0} to {1}")]
    NoMigrationPath(String, String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// A single reversible transformation of a managed root between two
/// adjacent workspace versions.
#[async_trait]
pub trait Migration: Send + Sync {
    /// The version this migration upgrades FROM.
    fn from_version(&self) -> &SemVer;

    /// The version this migration upgrades TO.
    fn to_version(&self) -> &SemVer;

    /// Human-readable description of what this migration does.
    fn description(&self) -> &str;

    /// Apply the migration to the managed root.
    async fn up(&self, root: &Path) -> Result<(), MigrationError>;

    /// Revert the migration on the managed root.
    async fn down(&self, root: &Path) -> Result<(), MigrationError>;
}

/// Result of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub success: bool,
    pub from_version: String,
    pub to_version: String,
    /// Descriptions of the migrations that were applied, in order.
    pub applied: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    Up,
    Down,
}
