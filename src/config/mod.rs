use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Name of the workspace config file under the managed root. Not a managed
/// path: once written it belongs to the user (and to migrations).
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Workspace-level settings stored in `.trellis/config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Workspace format version, recorded by migrations. Absent means the
    /// workspace predates version tracking (treated as 0.0.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Read the config under the given managed root, `None` if absent.
pub async fn read_config(root: &Path) -> Result<Option<WorkspaceConfig>, ConfigError> {
    let path = root.join(CONFIG_FILE);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).await?;
    let config: WorkspaceConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Persist the config under the given managed root.
pub async fn write_config(root: &Path, config: &WorkspaceConfig) -> Result<(), ConfigError> {
    let path = root.join(CONFIG_FILE);
    let content = serde_json::to_string_pretty(config)?;
    fs::write(&path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_config_is_none() {
        let temp = tempfile::tempdir().unwrap();
        assert!(read_config(temp.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig {
            version: Some("0.1.0".to_string()),
        };

        write_config(temp.path(), &config).await.unwrap();
        let read = read_config(temp.path()).await.unwrap().unwrap();
        assert_eq!(read.version.as_deref(), Some("0.1.0"));
    }

    #[tokio::test]
    async fn test_absent_version_field_tolerated() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "{}").await.unwrap();

        let read = read_config(temp.path()).await.unwrap().unwrap();
        assert!(read.version.is_none());
    }
}
