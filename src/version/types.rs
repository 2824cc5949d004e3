//! Semantic version type shared by the manifest, registry and migrations.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
}

/// A semantic version (major.minor.patch).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemVer {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `major.minor.patch` string.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let mut numbers = s.split('.').map(|part| part.parse::<u32>());

        let mut next = || {
            numbers
                .next()
                .and_then(|n| n.ok())
                .ok_or_else(|| VersionError::InvalidFormat(s.to_string()))
        };

        let version = Self {
            major: next()?,
            minor: next()?,
            patch: next()?,
        };

        if s.split('.').count() != 3 {
            return Err(VersionError::InvalidFormat(s.to_string()));
        }
        Ok(version)
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of comparing a workspace's format version against the daemon's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComparison {
    /// Workspace matches the daemon version.
    Equal,
    /// Workspace is older than the daemon (can migrate up).
    WorkspaceBehind,
    /// Workspace is newer than the daemon (degraded mode).
    WorkspaceAhead,
}
