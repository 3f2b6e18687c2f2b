use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn snippetscope(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("snippetscope").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_analyze_json_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("snippet.js"), "var x = 1;\n").unwrap();

    let output = snippetscope(&dir)
        .args(["analyze", "snippet.js", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["path"], "snippet.js");
    assert_eq!(value["detections"][0]["topicSlug"], "var-hoisting");
    assert_eq!(value["summary"]["total"], value["detections"].as_array().unwrap().len());
}

#[test]
fn test_analyze_directory_with_level() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("a.js"), "var a = 1;\n").unwrap();
    fs::write(src.join("b.tsx"), "const B = () => <div />;\n").unwrap();
    fs::write(src.join("README.md"), "not code").unwrap();

    let output = snippetscope(&dir)
        .args(["analyze", "src", "--format", "json", "--level", "beginner"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = value.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1]["tree"]["dialect"], "tsx");
    assert_eq!(reports[0]["learner"]["level"], "beginner");
}

#[test]
fn test_terminal_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("snippet.js"), "if (a == b) {}\n").unwrap();

    let output = snippetscope(&dir)
        .env("NO_COLOR", "1")
        .args(["analyze", "snippet.js"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("loose-equality"), "{}", stdout);
    assert!(stdout.contains("snippet.js"));
}

#[test]
fn test_missing_path_fails() {
    let dir = TempDir::new().unwrap();
    snippetscope(&dir)
        .args(["analyze", "nope.js"])
        .assert()
        .failure();
}

#[test]
fn test_explicit_config_is_used() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("snippet.js"), "var x = 1;\n").unwrap();
    fs::write(
        dir.path().join("custom.toml"),
        "[analysis]\ndisabled_detectors = [\"var-hoisting\"]\n",
    )
    .unwrap();

    let output = snippetscope(&dir)
        .args(["analyze", "snippet.js", "--format", "json", "--config", "custom.toml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let slugs: Vec<_> = value["detections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["topicSlug"].as_str().unwrap().to_string())
        .collect();
    assert!(!slugs.contains(&"var-hoisting".to_string()));
}
