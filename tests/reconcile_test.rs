mod common;

use common::{create_test_dir, init_workspace};
use std::sync::Arc;
use trellis_daemon::confirm::ScriptedConfirmer;
use trellis_daemon::manifest::{read_manifest, ManagedFileType};
use trellis_daemon::reconcile::{DecisionMode, Reconciler};
use trellis_daemon::scaffold::{BuiltinScaffold, TemplateRegistry};
use trellis_daemon::utils::{hash_bytes, managed_root};

#[tokio::test]
async fn test_fresh_workspace_creates_full_scaffold() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();

    let report = init_workspace(workspace).await;

    assert!(report.fresh_root);
    let expected = BuiltinScaffold::new().managed_paths();
    assert_eq!(report.created.len(), expected.len());
    assert!(report.restored.is_empty());
    assert!(report.reset.is_empty());
    assert!(report.skipped.is_empty());

    let root = managed_root(workspace);
    assert!(root.join("tasks").is_dir());
    assert!(root.join("notes").is_dir());
    assert!(root.join("attachments").is_dir());
    assert!(root.join("templates/tasks").is_dir());
    assert!(root.join("templates/notes").is_dir());
    assert!(root.join("README.md").is_file());
    assert!(root.join("templates/README.md").is_file());

    let manifest = read_manifest(&root)
        .await
        .expect("Should read manifest")
        .expect("Manifest should exist");
    assert_eq!(manifest.managed_files.len(), expected.len());
}

#[tokio::test]
async fn test_second_run_makes_no_changes() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();

    init_workspace(workspace).await;
    let manifest_before = read_manifest(&managed_root(workspace))
        .await
        .unwrap()
        .unwrap();

    let report = init_workspace(workspace).await;

    assert!(!report.fresh_root);
    assert!(report.created.is_empty());
    assert!(report.restored.is_empty());
    assert!(report.reset.is_empty());
    assert!(report.skipped.is_empty());

    let manifest_after = read_manifest(&managed_root(workspace))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        manifest_before.managed_files,
        manifest_after.managed_files
    );
}

#[tokio::test]
async fn test_converged_workspace_plans_everything_up_to_date() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();

    init_workspace(workspace).await;

    let plan = Reconciler::builtin().plan(workspace).await.unwrap();

    assert!(plan.to_create.is_empty());
    assert!(plan.to_restore.is_empty());
    assert!(plan.to_reset.is_empty());
    assert!(!plan.needs_decisions());
    assert_eq!(
        plan.up_to_date.len(),
        BuiltinScaffold::new().managed_paths().len()
    );
}

#[tokio::test]
async fn test_deleted_directory_is_restored_by_default() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;
    tokio::fs::remove_dir_all(root.join("tasks")).await.unwrap();

    let report = init_workspace(workspace).await;

    assert!(report.restored.contains(&"tasks/".to_string()));
    assert!(root.join("tasks").is_dir());
}

#[tokio::test]
async fn test_deleted_file_is_restored_with_recorded_content() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;
    tokio::fs::remove_file(root.join("README.md")).await.unwrap();

    let report = init_workspace(workspace).await;

    assert!(report.restored.contains(&"README.md".to_string()));
    let content = tokio::fs::read(root.join("README.md")).await.unwrap();
    assert_eq!(
        content,
        BuiltinScaffold::new().content_for("README.md").unwrap()
    );
}

#[tokio::test]
async fn test_drifted_file_is_preserved_by_default() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;
    tokio::fs::write(root.join("README.md"), "my own notes live here")
        .await
        .unwrap();

    let report = init_workspace(workspace).await;

    assert!(report.skipped.contains(&"README.md".to_string()));
    assert!(report.reset.is_empty());
    let content = tokio::fs::read_to_string(root.join("README.md"))
        .await
        .unwrap();
    assert_eq!(content, "my own notes live here");

    // The skip is a fixed point: nothing was rewritten, so the next run
    // reports the same drift again.
    let report = init_workspace(workspace).await;
    assert!(report.skipped.contains(&"README.md".to_string()));
}

#[tokio::test]
async fn test_combined_restore_and_reset_defaults_are_asymmetric() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;
    tokio::fs::remove_dir_all(root.join("notes")).await.unwrap();
    tokio::fs::write(root.join("README.md"), "drifted").await.unwrap();

    let report = init_workspace(workspace).await;

    assert!(report.restored.contains(&"notes/".to_string()));
    assert!(report.skipped.contains(&"README.md".to_string()));
    assert!(report.reset.is_empty());
    assert!(root.join("notes").is_dir());
    assert_eq!(
        tokio::fs::read_to_string(root.join("README.md")).await.unwrap(),
        "drifted"
    );
}

#[tokio::test]
async fn test_user_files_are_reported_and_untouched() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;
    tokio::fs::create_dir_all(root.join("projects")).await.unwrap();
    tokio::fs::write(root.join("projects/roadmap.md"), "Q3 plans")
        .await
        .unwrap();
    tokio::fs::write(root.join("scratch.md"), "loose thoughts")
        .await
        .unwrap();

    let report = init_workspace(workspace).await;

    assert!(report.user_files.contains(&"projects/".to_string()));
    assert!(report.user_files.contains(&"projects/roadmap.md".to_string()));
    assert!(report.user_files.contains(&"scratch.md".to_string()));
    assert_eq!(
        tokio::fs::read_to_string(root.join("projects/roadmap.md"))
            .await
            .unwrap(),
        "Q3 plans"
    );

    let manifest = read_manifest(&root).await.unwrap().unwrap();
    assert!(manifest
        .managed_files
        .iter()
        .all(|f| !f.path.starts_with("projects") && f.path != "scratch.md"));
}

#[tokio::test]
async fn test_matching_untracked_content_is_adopted() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);
    let registry = BuiltinScaffold::new();

    // Scaffold left behind by an install that kept no manifest.
    tokio::fs::create_dir_all(&root).await.unwrap();
    tokio::fs::write(
        root.join("README.md"),
        registry.content_for("README.md").unwrap(),
    )
    .await
    .unwrap();

    let report = init_workspace(workspace).await;

    assert!(!report.created.contains(&"README.md".to_string()));
    assert!(report.reset.is_empty());

    let manifest = read_manifest(&root).await.unwrap().unwrap();
    let entry = manifest
        .managed_files
        .iter()
        .find(|f| f.path == "README.md")
        .expect("README.md should be adopted into the manifest");
    assert_eq!(
        entry.hash,
        hash_bytes(&registry.content_for("README.md").unwrap())
    );
    assert_eq!(entry.file_type, ManagedFileType::File);
}

#[tokio::test]
async fn test_partial_scaffold_is_completed() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    // An interrupted earlier run: root and one directory exist, no manifest.
    tokio::fs::create_dir_all(root.join("tasks")).await.unwrap();

    let report = init_workspace(workspace).await;

    assert!(!report.fresh_root);
    assert!(!report.created.contains(&"tasks/".to_string()));
    assert!(report.created.contains(&"README.md".to_string()));

    let manifest = read_manifest(&root).await.unwrap().unwrap();
    assert_eq!(
        manifest.managed_files.len(),
        BuiltinScaffold::new().managed_paths().len()
    );

    // Converged: nothing left to do.
    let report = init_workspace(workspace).await;
    assert!(report.created.is_empty());
    assert!(report.restored.is_empty());
}

#[tokio::test]
async fn test_corrupt_manifest_is_rebuilt_without_touching_content() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;
    tokio::fs::write(root.join(".trellis-manifest.json"), "{broken")
        .await
        .unwrap();

    let report = init_workspace(workspace).await;

    assert!(report.success);
    assert!(report.created.is_empty());
    assert!(report.reset.is_empty());

    let manifest = read_manifest(&root).await.unwrap().unwrap();
    assert_eq!(
        manifest.managed_files.len(),
        BuiltinScaffold::new().managed_paths().len()
    );
}

#[tokio::test]
async fn test_stale_manifest_entries_are_carried() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;

    // Simulate an older tool that managed a path this build no longer ships.
    let manifest_path = root.join(".trellis-manifest.json");
    let raw = tokio::fs::read_to_string(&manifest_path).await.unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    value["managedFiles"].as_array_mut().unwrap().push(serde_json::json!({
        "path": "archive/",
        "hash": "",
        "version": "0.0.9",
        "createdAt": "2024-01-01T00:00:00+00:00",
        "type": "directory"
    }));
    tokio::fs::write(&manifest_path, serde_json::to_string_pretty(&value).unwrap())
        .await
        .unwrap();

    let report = init_workspace(workspace).await;

    assert!(report.success);
    assert!(!report.restored.contains(&"archive/".to_string()));
    assert!(!report.skipped.contains(&"archive/".to_string()));

    let manifest = read_manifest(&root).await.unwrap().unwrap();
    assert!(manifest.managed_files.iter().any(|f| f.path == "archive/"));
}

#[tokio::test]
async fn test_recorded_hashes_match_file_content() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;

    let manifest = read_manifest(&root).await.unwrap().unwrap();
    for entry in &manifest.managed_files {
        match entry.file_type {
            ManagedFileType::Directory => assert!(entry.hash.is_empty()),
            ManagedFileType::File => {
                let content = tokio::fs::read(root.join(&entry.path)).await.unwrap();
                assert_eq!(entry.hash, hash_bytes(&content), "path {}", entry.path);
                assert_eq!(entry.hash.len(), 64);
            }
        }
    }
}

#[tokio::test]
async fn test_interactive_decisions_drive_restore_and_reset() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);
    let registry = BuiltinScaffold::new();

    init_workspace(workspace).await;
    tokio::fs::remove_dir_all(root.join("notes")).await.unwrap();
    tokio::fs::write(root.join("README.md"), "drifted").await.unwrap();

    // Decline the restore, approve the reset.
    let confirmer = Arc::new(ScriptedConfirmer::new(["n", "y"]));
    let reconciler = Reconciler::builtin();
    let report = reconciler
        .reconcile(workspace, &DecisionMode::Interactive(confirmer))
        .await;

    assert!(report.success);
    assert!(report.skipped.contains(&"notes/".to_string()));
    assert!(report.reset.contains(&"README.md".to_string()));
    assert!(!root.join("notes").exists());
    assert_eq!(
        tokio::fs::read(root.join("README.md")).await.unwrap(),
        registry.content_for("README.md").unwrap()
    );
}

#[tokio::test]
async fn test_exhausted_input_declines_everything_remaining() {
    let temp_dir = create_test_dir();
    let workspace = temp_dir.path();
    let root = managed_root(workspace);

    init_workspace(workspace).await;
    tokio::fs::remove_dir_all(root.join("notes")).await.unwrap();
    tokio::fs::remove_dir_all(root.join("tasks")).await.unwrap();

    let confirmer = Arc::new(ScriptedConfirmer::new(Vec::<String>::new()));
    let reconciler = Reconciler::builtin();
    let report = reconciler
        .reconcile(workspace, &DecisionMode::Interactive(confirmer))
        .await;

    assert!(report.success);
    assert!(report.restored.is_empty());
    assert!(report.skipped.contains(&"tasks/".to_string()));
    assert!(report.skipped.contains(&"notes/".to_string()));
    assert!(!root.join("tasks").exists());
}
