//! End-to-end tests for the `tagforge` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONTAINER: &str = r#"{
    "exportFormatVersion": 2,
    "containerVersion": {
        "container": {"name": "Shop Web"},
        "tag": [
            {"tagId": "1", "name": "GA4 Config", "type": "gaawc",
             "parameter": [{"type": "template", "key": "measurementId", "value": "G-ABC123"}],
             "firingTriggerId": ["2147479553"]},
            {"tagId": "2", "name": "Orphan", "type": "img"}
        ]
    }
}"#;

fn tagforge() -> Command {
    let mut cmd = Command::cargo_bin("tagforge").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG").env_remove("TAGFORGE_CONFIG");
    cmd
}

fn write_container(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("container.json");
    fs::write(&path, CONTAINER).unwrap();
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_info() {
    let dir = TempDir::new().unwrap();
    let container = write_container(&dir);

    tagforge()
        .arg("info")
        .arg(&container)
        .assert()
        .success()
        .stdout(predicate::str::contains("Shop Web"))
        .stdout(predicate::str::contains("GA4 (1)"));
}

#[test]
fn test_analyze_json() {
    let dir = TempDir::new().unwrap();
    let container = write_container(&dir);

    let output = tagforge()
        .args(["analyze", "--json"])
        .arg(&container)
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(result["scores"]["overall"].is_u64());
    let rules: Vec<&str> = result["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["ruleId"].as_str())
        .collect();
    assert!(rules.contains(&"tag_without_trigger"));
}

#[test]
fn test_analyze_config_disables_rule() {
    let dir = TempDir::new().unwrap();
    let container = write_container(&dir);
    let config = dir.path().join("tagforge.toml");
    fs::write(&config, "[audit]\ndisabled_rules = [\"tag_without_trigger\"]\n").unwrap();

    tagforge()
        .arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg(&container)
        .assert()
        .success()
        .stdout(predicate::str::contains("tag_without_trigger").not());
}

#[test]
fn test_generate() {
    let dir = TempDir::new().unwrap();
    let container = write_container(&dir);
    let output = dir.path().join("server.json");

    tagforge()
        .arg("generate")
        .arg(&container)
        .arg("--output")
        .arg(&output)
        .args(["--transport-url", "https://sgtm.example.com"])
        .assert()
        .success();

    let server = read_json(&output);
    assert_eq!(server["exportFormatVersion"], 2);
    let tags = server["containerVersion"]["tag"].as_array().unwrap();
    assert!(tags.iter().any(|t| t["type"] == "sgtmgaaw"));
}

#[test]
fn test_patch_client() {
    let dir = TempDir::new().unwrap();
    let container = write_container(&dir);
    let output = dir.path().join("client.json");

    tagforge()
        .arg("patch-client")
        .arg(&container)
        .arg("-o")
        .arg(&output)
        .args(["--transport-url", "https://sgtm.example.com"])
        .assert()
        .success();

    let patched = read_json(&output);
    assert_eq!(
        patched["containerVersion"]["tag"][0]["parameter"][1]["key"],
        "transport_url"
    );
}

#[test]
fn test_missing_container_fails() {
    let dir = TempDir::new().unwrap();

    tagforge()
        .arg("info")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load container"));
}

#[test]
fn test_unknown_vendor_fails() {
    let dir = TempDir::new().unwrap();
    let container = write_container(&dir);

    tagforge()
        .arg("generate")
        .arg(&container)
        .args(["-o", "unused.json", "--vendor", "myspace"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown vendor"));
}
