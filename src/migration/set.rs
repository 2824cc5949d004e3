//! Ordered collection of migrations with path finding between versions.

use super::types::{Migration, MigrationDirection, MigrationError};
use crate::version::SemVer;
use std::sync::Arc;

/// All migrations this build of the daemon knows about.
///
/// Kept sorted by `from_version` so routing can walk adjacent steps.
pub struct MigrationSet {
    migrations: Vec<Arc<dyn Migration>>,
}

impl MigrationSet {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    pub fn register(&mut self, migration: Arc<dyn Migration>) {
        self.migrations.push(migration);
        self.migrations
            .sort_by(|a, b| a.from_version().cmp(b.from_version()));
    }

    /// Every version reachable through some registered migration.
    pub fn known_versions(&self) -> Vec<String> {
        let mut versions: Vec<SemVer> = self
            .migrations
            .iter()
            .flat_map(|m| vec![m.from_version().clone(), m.to_version().clone()])
            .collect();

        versions.sort();
        versions.dedup();
        versions.iter().map(|v| v.to_string()).collect()
    }

    /// Find the ordered migrations that take a workspace from one version
    /// to another, and whether that walk upgrades or downgrades.
    pub fn route(
        &self,
        from: &SemVer,
        to: &SemVer,
    ) -> Result<(Vec<Arc<dyn Migration>>, MigrationDirection), MigrationError> {
        if from == to {
            return Ok((Vec::new(), MigrationDirection::Up));
        }

        let direction = if from < to {
            MigrationDirection::Up
        } else {
            MigrationDirection::Down
        };

        let mut path = Vec::new();
        let mut current = from.clone();

        match direction {
            MigrationDirection::Up => {
                while &current < to {
                    let next = self
                        .migrations
                        .iter()
                        .find(|m| m.from_version() == &current)
                        .ok_or_else(|| {
                            MigrationError::NoMigrationPath(current.to_string(), to.to_string())
                        })?;

                    current = next.to_version().clone();
                    path.push(Arc::clone(next));
                }
            }
            MigrationDirection::Down => {
                while &current > to {
                    let prev = self
                        .migrations
                        .iter()
                        .find(|m| m.to_version() == &current)
                        .ok_or_else(|| {
                            MigrationError::NoMigrationPath(current.to_string(), to.to_string())
                        })?;

                    current = prev.from_version().clone();
                    path.push(Arc::clone(prev));
                }
            }
        }

        Ok((path, direction))
    }
}

impl Default for MigrationSet {
    fn default() -> Self {
        Self::new()
    }
}
