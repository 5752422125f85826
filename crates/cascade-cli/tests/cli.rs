//! End-to-end runs of the `cascade` binary

use std::path::Path;
use std::process::{Command, Output};

const HEALTHY: &str = r#"
projects:
  - id: shared
    environments:
      dev:
        configs:
          - id: team
            kind: { type: classic-api, api: auto-tag }
            template: { name: "{{ .name }}" }
            parameters:
              name: { type: value, value: team }
  - id: app
    environments:
      dev:
        dependencies: [shared]
        configs:
          - id: overview
            kind: { type: document }
            template: { title: "{{ .title }}" }
            parameters:
              title: { type: value, value: Overview }
"#;

const CYCLIC: &str = r#"
projects:
  - id: p
    environments:
      dev:
        configs:
          - id: a
            kind: { type: segment }
            parameters:
              b: { type: reference, target: { type: segment, id: b }, property: id }
          - id: b
            kind: { type: segment }
            parameters:
              a: { type: reference, target: { type: segment, id: a }, property: id }
"#;

fn write_manifest(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("manifest.yaml");
    std::fs::write(&path, text).unwrap();
    path
}

fn cascade(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cascade"))
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("CASCADE_CONTINUE_ON_ERROR")
        .env_remove("CASCADE_SEQUENTIAL")
        .output()
        .unwrap()
}

#[test]
fn plan_prints_project_order() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), HEALTHY);

    let output = cascade(&["plan", manifest.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1. shared:auto-tag:team"));
    assert!(stdout.contains("2. app:document-dashboard:overview"));
}

#[test]
fn dry_run_succeeds_for_healthy_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), HEALTHY);

    let output = cascade(&["deploy", manifest.to_str().unwrap(), "--dry-run"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("environment dev: 2 deployed"));
}

#[test]
fn dry_run_exits_non_zero_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), CYCLIC);

    let output = cascade(&["deploy", manifest.to_str().unwrap(), "--dry-run"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("2 excluded, 1 errors"));
}

#[test]
fn deploy_without_dry_run_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), HEALTHY);

    let output = cascade(&["deploy", manifest.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--dry-run"));
}

#[test]
fn graph_writes_dot_files() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), HEALTHY);
    let out = dir.path().join("graphs");

    let output = cascade(&[
        "graph",
        manifest.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let dot = std::fs::read_to_string(out.join("dependency_graph_dev.dot")).unwrap();
    assert!(dot.contains("\"app:document-dashboard:overview\" -> \"shared:auto-tag:team\";"));
}
