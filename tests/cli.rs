//! CLI behavior tests: exit codes, output formats, init.
//!
//! Inputs only contain languages without an analyzer, so no external tool
//! is ever started.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

fn mixed_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/mixed")
}

/// Command running from an empty directory, so no config file is discovered.
fn lintreport_cmd(cwd: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lintreport"));
    cmd.current_dir(cwd.path());
    cmd
}

#[test]
fn no_args_returns_error_not_panic() {
    let temp = TempDir::new().unwrap();
    lintreport_cmd(&temp)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn init_writes_config_once() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("conf/lintreport.yaml");

    lintreport_cmd(&temp)
        .arg("init")
        .arg("--output")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    let content = fs::read_to_string(&target).unwrap();
    assert!(content.contains("tool_timeout_secs: 120"));

    lintreport_cmd(&temp)
        .arg("init")
        .arg("--output")
        .arg(&target)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file already exists"));

    lintreport_cmd(&temp)
        .arg("init")
        .arg("--output")
        .arg(&target)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn missing_path_exit_2() {
    let temp = TempDir::new().unwrap();
    lintreport_cmd(&temp)
        .arg("analyze")
        .arg("does-not-exist.zip")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error: input not found"));
}

#[test]
fn no_supported_files_exit_2() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("docs");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("README.md"), "# docs\n").unwrap();

    lintreport_cmd(&temp)
        .arg("analyze")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "No supported code files found in the upload.",
        ));
    assert!(!temp
        .path()
        .read_dir()
        .unwrap()
        .any(|e| e.unwrap().file_name().to_string_lossy().ends_with(".pdf")));
}

#[test]
fn invalid_format_exit_2() {
    let temp = TempDir::new().unwrap();
    lintreport_cmd(&temp)
        .arg("analyze")
        .arg(mixed_dir())
        .arg("--format")
        .arg("sarif")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid format"));
}

#[test]
fn json_output_valid() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("report.json");

    lintreport_cmd(&temp)
        .arg("analyze")
        .arg(mixed_dir())
        .arg("--format")
        .arg("json")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("report.json"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).expect("valid JSON");
    assert_eq!(json["title"], "mixed");
    assert_eq!(json["files_analyzed"], 2);
    assert_eq!(json["languages"][0]["language"], "Go");
    assert_eq!(json["languages"][1]["language"], "Ruby");
    assert_eq!(json["languages"][0]["overall"], 0.0);
}

#[test]
fn pdf_written_to_output_dir() {
    let temp = TempDir::new().unwrap();
    let out_dir = temp.path().join("reports");

    let assert = lintreport_cmd(&temp)
        .arg("analyze")
        .arg(mixed_dir())
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let path = PathBuf::from(stdout.trim());
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("code_quality_report_"), "{}", name);
    assert!(name.ends_with(".pdf"));
    assert!(path.starts_with(&out_dir));
    assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
}

#[test]
fn zip_upload_is_extracted() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("upload.zip");
    let mut writer = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
    writer
        .start_file("cmd/main.go", zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(b"package main\n").unwrap();
    writer.finish().unwrap();

    let out = temp.path().join("report.json");
    lintreport_cmd(&temp)
        .arg("analyze")
        .arg(&archive)
        .arg("--format")
        .arg("json")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["title"], "upload.zip");
    assert_eq!(json["languages"][0]["files"][0], "cmd/main.go");
}

#[test]
fn invalid_pr_url_exit_2() {
    let temp = TempDir::new().unwrap();
    lintreport_cmd(&temp)
        .arg("pr")
        .arg("https://example.com/not/a/pr")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid GitHub PR URL format"));
}
