//! First migration: establishes version tracking for workspaces created
//! before the config carried a version field (0.0.0 to 0.1.0).

use super::types::{Migration, MigrationError};
use crate::version::SemVer;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::path::Path;

static FROM_VERSION: Lazy<SemVer> = Lazy::new(|| SemVer::new(0, 0, 0));
static TO_VERSION: Lazy<SemVer> = Lazy::new(|| SemVer::new(0, 1, 0));

/// No data changes shape in this step; the runner stamps the version into
/// the workspace config once the route completes.
pub struct EstablishVersionTracking;

impl EstablishVersionTracking {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EstablishVersionTracking {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Migration for EstablishVersionTracking {
    fn from_version(&self) -> &SemVer {
        &FROM_VERSION
    }

    fn to_version(&self) -> &SemVer {
        &TO_VERSION
    }

    fn description(&self) -> &str {
        "Establish version tracking for existing workspaces"
    }

    async fn up(&self, _root: &Path) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn down(&self, _root: &Path) -> Result<(), MigrationError> {
        Ok(())
    }
}
