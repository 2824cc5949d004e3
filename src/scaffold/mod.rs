//! Canonical managed paths and their content.
//!
//! The template registry is the source of truth for what belongs inside a
//! managed root: which paths exist, whether each is a file or a directory,
//! and the canonical bytes of every file. The reconciliation engine consumes
//! it only through the [`TemplateRegistry`] trait, so tests (and future
//! remote registries) can substitute their own scaffolds.

use crate::manifest::ManagedFileType;

/// One canonical managed path with its type and optional file content.
#[derive(Debug, Clone)]
pub struct ScaffoldEntry {
    pub path: &'static str,
    pub file_type: ManagedFileType,
    pub content: Option<&'static str>,
}

/// Source of canonical managed paths.
///
/// `managed_paths` is ordered: parent directories appear before anything
/// nested under them, and the executor materializes paths in exactly this
/// order. Directory paths carry a trailing `/`.
pub trait TemplateRegistry: Send + Sync {
    fn managed_paths(&self) -> Vec<String>;

    fn path_type(&self, path: &str) -> Option<ManagedFileType>;

    /// Canonical bytes for a file path; `None` for directories and unknown
    /// paths.
    fn content_for(&self, path: &str) -> Option<Vec<u8>>;
}

/// Workspace orientation text placed at the root of the managed folder.
const README_CONTENT: &str = r#"# Trellis Workspace

This folder is managed by [Trellis](https://github.com/trellis-tracker/trellis).

## Structure

- `tasks/` - One markdown file per task
- `notes/` - Free-form project notes
- `attachments/` - Files referenced by tasks and notes
- `templates/` - Skeleton files used when creating tasks and notes

## Getting Started

Create a new task:

```bash
trellis new task "Fix the flaky login test"
```

Everything under this folder except this scaffold is yours: trellis never
modifies files it did not create.
"#;

/// Explains the skeleton-file convention to users browsing `templates/`.
const TEMPLATES_README_CONTENT: &str = r#"# Templates

Skeleton files picked up by `trellis new` when creating tasks and notes.

## Usage

Place a markdown file in the matching folder and pass its name to `--template`:

- Tasks: `templates/tasks/` (e.g. `bug.md`, used by `trellis new task --template bug`)
- Notes: `templates/notes/` (e.g. `meeting.md`)

The file is copied verbatim as the starting content of the new task or note.
Delete a template to stop offering it; this folder itself is recreated on
`trellis init` if it goes missing.
"#;

/// The built-in trellis scaffold.
pub struct BuiltinScaffold {
    entries: Vec<ScaffoldEntry>,
}

impl BuiltinScaffold {
    pub fn new() -> Self {
        Self {
            entries: vec![
                ScaffoldEntry {
                    path: "tasks/",
                    file_type: ManagedFileType::Directory,
                    content: None,
                },
                ScaffoldEntry {
                    path: "notes/",
                    file_type: ManagedFileType::Directory,
                    content: None,
                },
                ScaffoldEntry {
                    path: "attachments/",
                    file_type: ManagedFileType::Directory,
                    content: None,
                },
                ScaffoldEntry {
                    path: "templates/",
                    file_type: ManagedFileType::Directory,
                    content: None,
                },
                ScaffoldEntry {
                    path: "templates/tasks/",
                    file_type: ManagedFileType::Directory,
                    content: None,
                },
                ScaffoldEntry {
                    path: "templates/notes/",
                    file_type: ManagedFileType::Directory,
                    content: None,
                },
                ScaffoldEntry {
                    path: "README.md",
                    file_type: ManagedFileType::File,
                    content: Some(README_CONTENT),
                },
                ScaffoldEntry {
                    path: "templates/README.md",
                    file_type: ManagedFileType::File,
                    content: Some(TEMPLATES_README_CONTENT),
                },
            ],
        }
    }

    fn find(&self, path: &str) -> Option<&ScaffoldEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

impl Default for BuiltinScaffold {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry for BuiltinScaffold {
    fn managed_paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.to_string()).collect()
    }

    fn path_type(&self, path: &str) -> Option<ManagedFileType> {
        self.find(path).map(|e| e.file_type)
    }

    fn content_for(&self, path: &str) -> Option<Vec<u8>> {
        self.find(path)
            .and_then(|e| e.content)
            .map(|c| c.as_bytes().to_vec())
    }
}
