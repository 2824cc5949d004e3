//! Runs migration routes against a managed root.

use super::set::MigrationSet;
use super::types::{Migration, MigrationDirection, MigrationError, MigrationOutcome};
use crate::config::{read_config, write_config};
use crate::version::SemVer;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

pub struct MigrationRunner {
    set: Arc<MigrationSet>,
}

impl MigrationRunner {
    pub fn new(set: Arc<MigrationSet>) -> Self {
        Self { set }
    }

    /// Bring a managed root to the target version.
    ///
    /// The current version comes from the workspace config; a workspace
    /// without one predates version tracking and counts as 0.0.0. Steps run
    /// in route order, and a failing step triggers a reverse rollback of
    /// everything already applied. The config is rewritten with the target
    /// version only after the whole route succeeded.
    pub async fn migrate(
        &self,
        root: &Path,
        target_version: &SemVer,
    ) -> Result<MigrationOutcome, MigrationError> {
        let config = read_config(root)
            .await
            .map_err(|e| MigrationError::ConfigError(e.to_string()))?;

        let current_version = config
            .as_ref()
            .and_then(|c| c.version.as_ref())
            .map(|v| SemVer::parse(v))
            .transpose()?
            .unwrap_or_else(|| SemVer::new(0, 0, 0));

        info!(from = %current_version, to = %target_version, "Starting migration");

        let (migrations, direction) = self.set.route(&current_version, target_version)?;

        if migrations.is_empty() {
            info!("Already at target version, nothing to migrate");
            return Ok(MigrationOutcome {
                success: true,
                from_version: current_version.to_string(),
                to_version: target_version.to_string(),
                applied: vec![],
                error: None,
            });
        }

        let mut applied: Vec<Arc<dyn Migration>> = Vec::new();

        for migration in &migrations {
            let step_name = describe(migration);
            info!(migration = %step_name, "Applying migration");

            let result = match direction {
                MigrationDirection::Up => migration.up(root).await,
                MigrationDirection::Down => migration.down(root).await,
            };

            if let Err(e) = result {
                error!(migration = %step_name, error = %e, "Migration failed");

                for done in applied.iter().rev() {
                    let rollback_name = describe(done);
                    info!(migration = %rollback_name, "Rolling back migration");

                    if let Err(rollback_err) = self.revert_one(root, done, direction).await {
                        error!(
                            migration = %rollback_name,
                            error = %rollback_err,
                            "Rollback failed"
                        );
                    }
                }

                return Ok(MigrationOutcome {
                    success: false,
                    from_version: current_version.to_string(),
                    to_version: target_version.to_string(),
                    applied: vec![],
                    error: Some(format!("Migration {step_name} failed: {e}")),
                });
            }

            applied.push(Arc::clone(migration));
        }

        let mut config = config.unwrap_or_default();
        config.version = Some(target_version.to_string());
        write_config(root, &config)
            .await
            .map_err(|e| MigrationError::ConfigError(e.to_string()))?;

        info!(
            from = %current_version,
            to = %target_version,
            count = applied.len(),
            "Migration completed"
        );

        Ok(MigrationOutcome {
            success: true,
            from_version: current_version.to_string(),
            to_version: target_version.to_string(),
            applied: applied.iter().map(|m| describe(m)).collect(),
            error: None,
        })
    }

    /// Undo one applied step by running its opposite operation.
    async fn revert_one(
        &self,
        root: &Path,
        migration: &Arc<dyn Migration>,
        direction: MigrationDirection,
    ) -> Result<(), MigrationError> {
        match direction {
            MigrationDirection::Up => migration.down(root).await,
            MigrationDirection::Down => migration.up(root).await,
        }
    }
}

fn describe(migration: &Arc<dyn Migration>) -> String {
    format!(
        "{} -> {}: {}",
        migration.from_version(),
        migration.to_version(),
        migration.description()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;

    #[tokio::test]
    async fn test_migrate_unversioned_root_writes_target_version() {
        let temp = tempfile::tempdir().unwrap();
        let runner = MigrationRunner::new(super::super::default_migrations());

        let outcome = runner
            .migrate(temp.path(), &SemVer::new(0, 1, 0))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.from_version, "0.0.0");
        assert_eq!(outcome.to_version, "0.1.0");
        assert_eq!(outcome.applied.len(), 1);

        let config = read_config(temp.path()).await.unwrap().unwrap();
        assert_eq!(config.version.as_deref(), Some("0.1.0"));
    }

    #[tokio::test]
    async fn test_migrate_to_current_version_is_a_noop() {
        let temp = tempfile::tempdir().unwrap();
        let runner = MigrationRunner::new(super::super::default_migrations());

        write_config(
            temp.path(),
            &WorkspaceConfig {
                version: Some("0.1.0".to_string()),
            },
        )
        .await
        .unwrap();

        let outcome = runner
            .migrate(temp.path(), &SemVer::new(0, 1, 0))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.applied.is_empty());
    }

    #[tokio::test]
    async fn test_unroutable_target_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let runner = MigrationRunner::new(super::super::default_migrations());

        let result = runner.migrate(temp.path(), &SemVer::new(9, 9, 9)).await;
        assert!(matches!(result, Err(MigrationError::NoMigrationPath(_, _))));
    }
}
