//! Integration tests for the `todoscript` CLI.
//!
//! Each test lays out a source tree in a temp directory, runs `todoscript`
//! as a subprocess from a base directory beside it, and checks stdout
//! and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

/// Get the path to the built `todoscript` binary.
fn bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("todoscript");
    path
}

/// `<tmp>/src/{api,web}` plus an empty base directory `<tmp>/tool`.
fn create_tree(root: &Path) -> PathBuf {
    for dir in ["src/api", "src/web", "tool"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    root.join("tool")
}

/// Configured and generated workspace; returns the base directory.
fn create_workspace(root: &Path) -> PathBuf {
    let base = create_tree(root);
    run_ok(&base, &["init", "../src"]);
    run_ok(&base, &["generate"]);
    base
}

fn task_file(base: &Path, project: &str) -> PathBuf {
    base.join("TODOs").join(project).join("todos.txt")
}

/// Run `todoscript` with the given args in the given directory, returning (stdout, stderr, success).
fn run(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(bin())
        .args(args)
        .current_dir(dir)
        .env_remove("TODOSCRIPT_LOG")
        .output()
        .expect("failed to run todoscript");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `todoscript` expecting success, return stdout.
fn run_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run(dir, args);
    if !success {
        panic!(
            "todoscript {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `todoscript` expecting failure, return stderr.
fn run_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run(dir, args);
    if success {
        panic!("todoscript {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn test_unconfigured_asks_for_init() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_tree(tmp.path());
    let err = run_err(&base, &["projects"]);
    assert!(err.contains("todoscript init"));
}

#[test]
fn test_init_and_generate() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_tree(tmp.path());

    run_ok(&base, &["init", "../src"]);
    let config = fs::read_to_string(base.join("todoscript.toml")).unwrap();
    assert!(config.contains("parent_folder_name = \"TODOs\""));

    let out = run_ok(&base, &["generate"]);
    assert!(out.contains("created api"));
    assert!(out.contains("created web"));
    assert_eq!(
        fs::read_to_string(task_file(&base, "api")).unwrap(),
        "# api todos\n"
    );

    let out = run_ok(&base, &["generate"]);
    assert!(out.contains("exists  api"));

    let out = run_ok(&base, &["projects"]);
    assert_eq!(out, "1. api\n2. web\n");
}

#[test]
fn test_init_refuses_overwrite() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_tree(tmp.path());
    run_ok(&base, &["init", "../src"]);
    let err = run_err(&base, &["init", "../src", "--theme", "dracula"]);
    assert!(err.contains("already exists"));
    run_ok(&base, &["init", "../src", "--theme", "dracula", "--force"]);
}

#[test]
fn test_init_rejects_bad_folder_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_tree(tmp.path());
    let err = run_err(&base, &["init", "../src", "--parent-folder-name", "a/b"]);
    assert!(err.contains("invalid folder name"));
    assert!(!base.join("todoscript.toml").exists());
}

#[test]
fn test_config_set_preserves_document() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());

    run_ok(&base, &["config", "set", "theme", "monokai"]);
    let out = run_ok(&base, &["config", "show"]);
    assert!(out.contains("theme = \"monokai\""));
    assert!(out.contains("root_folder = \"../src\""));

    let err = run_err(&base, &["config", "set", "parent_folder_name", "Tasks"]);
    assert!(err.contains("cannot be changed"));
}

#[test]
fn test_base_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    let out = run_ok(tmp.path(), &["-C", base.to_str().unwrap(), "projects"]);
    assert_eq!(out, "1. api\n2. web\n");
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[test]
fn test_add_list_done() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());

    run_ok(&base, &["add", "api", "buy milk"]);
    let out = run_ok(&base, &["add", "api", "call mom @family", "--done"]);
    assert_eq!(out, "added 2. [x] call mom @family\n");

    let out = run_ok(&base, &["list", "api"]);
    assert_eq!(
        out,
        "== api ==\n1. [ ] buy milk\n2. [x] call mom @family\n\n[█████-----] 50% (1/2)\n"
    );

    run_ok(&base, &["done", "api", "1"]);
    assert_eq!(
        fs::read_to_string(task_file(&base, "api")).unwrap(),
        "# api todos\n[x] buy milk\n[x] call mom @family\n"
    );
}

#[test]
fn test_list_filters_keep_indices() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    fs::write(
        task_file(&base, "web"),
        "# web todos\n[ ] buy milk\n[x] call mom @family\n[ ] bake @family\n",
    )
    .unwrap();

    let out = run_ok(&base, &["list", "web", "--tag", "@family", "--strip-tags"]);
    assert!(out.contains("2. [x] call mom\n3. [ ] bake\n"));
    assert!(!out.contains("buy milk"));

    let out = run_ok(&base, &["list", "web", "--status", "pending"]);
    assert!(out.contains("1. [ ] buy milk\n3. [ ] bake @family\n"));
}

#[test]
fn test_list_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    fs::write(task_file(&base, "api"), "[ ] buy milk\n[x] call mom @family\n").unwrap();

    let out = run_ok(&base, &["--json", "list", "api"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["project"], "api");
    assert_eq!(value["tasks"][1]["index"], 2);
    assert_eq!(value["tasks"][1]["status"], "complete");
    assert_eq!(value["tasks"][1]["tags"][0], "family");
    assert_eq!(value["progress"]["percentage"], 50);
}

#[test]
fn test_edit_delete_tag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    fs::write(
        task_file(&base, "api"),
        "# api todos\n[ ] one\n[x] two\n[ ] three\n",
    )
    .unwrap();

    run_ok(&base, &["edit", "api", "2", "second"]);
    run_ok(&base, &["tag", "api", "1", "3", "--tags", "urgent, @home"]);
    run_ok(&base, &["delete", "api", "2"]);
    assert_eq!(
        fs::read_to_string(task_file(&base, "api")).unwrap(),
        "# api todos\n[ ] one @urgent @home\n[ ] three @urgent @home\n"
    );

    let out = run_ok(&base, &["tags", "api"]);
    assert_eq!(out, "@urgent\n@home\n");
}

#[test]
fn test_invalid_index_leaves_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    let before = "# api todos\n[ ] one\n";
    fs::write(task_file(&base, "api"), before).unwrap();

    let err = run_err(&base, &["done", "api", "1", "2"]);
    assert!(err.contains("no task #2"));
    let err = run_err(&base, &["delete", "api", "0"]);
    assert!(err.contains("no task #0"));
    assert_eq!(fs::read_to_string(task_file(&base, "api")).unwrap(), before);
}

#[test]
fn test_unknown_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    let err = run_err(&base, &["list", "mobile"]);
    assert!(err.contains("project not found: mobile"));
}

// ---------------------------------------------------------------------------
// Export and reports
// ---------------------------------------------------------------------------

#[test]
fn test_export_csv_with_delimiter() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    fs::write(task_file(&base, "api"), "[ ] buy milk\n[x] call mom @family\n").unwrap();

    run_ok(&base, &["export", "api", "csv", "md", "--delimiter", ";"]);
    let exports = base.join("TODOs/api/exports");
    assert_eq!(
        fs::read_to_string(exports.join("exported_tasks.csv")).unwrap(),
        "ID;Task;Tags;Status\n1;buy milk;;pending\n2;call mom @family;family;completed\n"
    );
    assert_eq!(
        fs::read_to_string(exports.join("exported_tasks.md")).unwrap(),
        "- [ ] buy milk\n- [x] call mom @family\n"
    );

    // The exports folder is never mistaken for the task file
    let out = run_ok(&base, &["list", "api"]);
    assert!(out.contains("2. [x] call mom @family"));
}

#[test]
fn test_export_unknown_format() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    let err = run_err(&base, &["export", "api", "pdf"]);
    assert!(err.contains("unknown export format"));
    assert!(!base.join("TODOs/api/exports").exists());
}

#[test]
fn test_report() {
    let tmp = tempfile::TempDir::new().unwrap();
    let base = create_workspace(tmp.path());
    fs::write(task_file(&base, "api"), "[ ] a\n[x] b\n[x] c\n[x] d\n").unwrap();

    let out = run_ok(&base, &["report", "--export", "csv,json,html"]);
    assert!(out.contains("api  [███████---] 75% (3/4)"));
    assert!(out.contains("web  [----------] 0% (0/0)"));

    let reports = base.join("reports");
    assert_eq!(
        fs::read_to_string(reports.join("reports.csv")).unwrap(),
        "ID,Project,Pending,Completed,Total,Percentage\n1,api,1,3,4,75\n2,web,0,0,0,0\n"
    );
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports.join("reports.json")).unwrap()).unwrap();
    assert!(json["generated_at"].is_string());
    assert!(reports.join("reports_table.html").is_file());
}
