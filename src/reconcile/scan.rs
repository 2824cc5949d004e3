use crate::utils::MANIFEST_FILE;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Scan a managed root and return every path under it, relative and
/// POSIX-style, directories marked with a trailing `/`. The manifest file
/// itself is excluded. A missing root is the fresh-install case and yields
/// an empty set.
pub fn scan_managed_root(root: &Path) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();

    if !root.exists() {
        return paths;
    }

    for entry in WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if let Ok(relative) = entry.path().strip_prefix(root) {
            let mut relative_str = relative.to_string_lossy().replace('\\', "/");

            if relative_str == MANIFEST_FILE {
                continue;
            }

            if entry.file_type().is_dir() {
                relative_str.push('/');
            }

            paths.insert(relative_str);
        }
    }

    paths
}
