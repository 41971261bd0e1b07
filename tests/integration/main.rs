//! Integration tests for Vulnscope
//!
//! These tests verify that the cache, the report service and the CLI work together correctly.

use std::num::NonZeroUsize;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use vulnscope_analysis::ReportService;
use vulnscope_analysis::providers::fixture::FixtureProvider;
use vulnscope_core::{Dependency, FileCache, ManualClock, NO_FINDINGS, Severity};

const FIXTURE: &str = r#"{
    "/repo/package.json": {
        "dependencies": [
            {
                "ref": "pkg:npm/minimist@1.2.6",
                "issues": [{ "id": "CVE-2021-44906", "severity": "CRITICAL", "cvssScore": 9.8 }],
                "recommendation": "pkg:npm/minimist@1.2.8"
            },
            { "issues": [{ "id": "CVE-0000-0000", "severity": "LOW" }] }
        ]
    },
    "/repo/pom.xml": null
}"#;

fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("reports.json");
    std::fs::write(&path, FIXTURE).unwrap();
    path
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new(env!("CARGO_BIN_EXE_vulnscope"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Per-file vulnerability analysis cache"));
}

/// Test that the CLI analyzes a manifest against recorded reports
#[test]
fn test_cli_analyze_with_fixture() {
    let dir = TempDir::new().unwrap();
    let fixture = write_fixture(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_vulnscope"))
        .args(["analyze", "--fixture"])
        .arg(&fixture)
        .args([
            "--package-manager",
            "npm",
            "--file",
            "/repo/package.json",
            "pkg:npm/minimist@1.2.5",
            "pkg:npm/left-pad@1.3.0",
        ])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["fetched"], true);
    assert_eq!(summary["dependencies"][0]["status"], "vulnerable");
    assert_eq!(summary["dependencies"][0]["severity"], "CRITICAL");
    assert_eq!(summary["dependencies"][1]["status"], "clean");
}

/// Test that invalid dependencies are rejected by the CLI
#[test]
fn test_cli_rejects_invalid_dependency() {
    let dir = TempDir::new().unwrap();
    let fixture = write_fixture(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_vulnscope"))
        .args(["analyze", "--fixture"])
        .arg(&fixture)
        .args(["-p", "npm", "-f", "/repo/package.json", "minimist"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
}

/// Test that the config command honours a config file
#[test]
fn test_cli_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("vulnscope.toml");
    std::fs::write(&config, "max_files = 7\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_vulnscope"))
        .arg("--config")
        .arg(&config)
        .arg("config")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("max_files = 7"));
    assert!(stdout.contains("report_ttl_secs = 60"));
}

/// Test the full fetch, read, expire and invalidate cycle against recorded reports
#[tokio::test]
async fn test_report_lifecycle() {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(FileCache::new(
        NonZeroUsize::new(100).unwrap(),
        Duration::from_secs(50 * 60),
        Duration::from_secs(60),
        clock.clone(),
    ));
    let provider = Arc::new(FixtureProvider::from_json_str(FIXTURE).unwrap());
    let service = ReportService::new(cache, provider);

    let minimist = Dependency::parse("pkg:npm/minimist@1.2.5").unwrap();
    let left_pad = Dependency::parse("pkg:npm/left-pad@1.3.0").unwrap();
    let deps = vec![minimist.clone(), left_pad.clone()];

    assert!(service.get_reports("/repo/package.json", &deps).is_empty());
    assert!(
        service
            .perform_analysis("npm", "package.json", "/repo/package.json", &deps)
            .await
    );

    let reports = service.get_reports("/repo/package.json", &deps);
    assert_eq!(reports[&minimist].highest_severity(), Some(Severity::Critical));
    assert_eq!(reports[&left_pad], NO_FINDINGS);

    // Manifests the provider has no report for stay uncached
    let junit = Dependency::parse("pkg:maven/junit/junit@4.13.2").unwrap();
    assert!(
        !service
            .perform_analysis("maven", "pom.xml", "/repo/pom.xml", &[junit.clone()])
            .await
    );
    assert!(service.get_reports("/repo/pom.xml", &[junit]).is_empty());

    clock.advance(Duration::from_secs(60));
    assert!(service.get_reports("/repo/package.json", &deps).is_empty());

    assert!(
        service
            .perform_analysis("npm", "package.json", "/repo/package.json", &deps)
            .await
    );
    service.delete_reports("/repo/package.json");
    assert!(service.get_reports("/repo/package.json", &deps).is_empty());
}
