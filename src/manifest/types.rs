use serde::{Deserialize, Serialize};

/// Schema version written into every manifest this tool produces.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceManifest {
    pub schema_version: u32,
    pub tool_version: String,
    pub created_at: String,
    pub updated_at: String,
    pub managed_files: Vec<ManagedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedFile {
    /// POSIX-style path relative to the managed root; directories end with `/`.
    pub path: String,
    /// Lowercase hex SHA-256 of exact byte content; empty for directories.
    pub hash: String,
    /// Tool version that last wrote this entry.
    pub version: String,
    /// Timestamp of first creation.
    pub created_at: String,
    #[serde(rename = "type")]
    pub file_type: ManagedFileType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManagedFileType {
    File,
    Directory,
}
