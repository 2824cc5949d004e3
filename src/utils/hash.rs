use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;

/// Digest recorded for directories, which carry no content.
pub const DIRECTORY_HASH: &str = "";

/// Compute the SHA-256 digest of a byte slice as lowercase hex.
pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Compute the SHA-256 digest of a file's contents.
///
/// I/O failures propagate: a missing file at a path the caller believed
/// existed is a caller bug, not something to paper over here.
pub async fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let content = fs::read(path).await?;
    Ok(hash_bytes(&content))
}
