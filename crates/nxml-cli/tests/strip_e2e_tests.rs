//! End-to-end tests for nxml strip command
//!
//! These tests validate the full strip workflow including:
//! - Publication, submission file and revision pruning
//! - Uploader and author group overrides
//! - Side-data accumulation across runs
//! - Instructions report generation
//! - Error handling and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const ISSUE: &str = include_str!("fixtures/issue.xml");
const SECOND_ISSUE: &str = include_str!("fixtures/second-issue.xml");

/// Command running inside `dir` with a clean environment
fn nxml(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nxml").unwrap();
    cmd.current_dir(dir)
        .env_remove("NXML_DATA_FILE")
        .env_remove("LOG_LEVEL")
        .env_remove("LOG_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_input(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Filtering Tests
// ============================================================================

#[test]
fn test_strip_removes_non_current_publication() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#))
        .stdout(predicate::str::contains(r#"<id type="internal" advice="ignore">1</id>"#))
        .stdout(predicate::str::contains(r#"<id type="internal" advice="ignore">2</id>"#).not())
        .stdout(predicate::str::contains("Rascunho").not());
}

#[test]
fn test_strip_prunes_files_and_revisions() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "out.xml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Stripped 1 article(s)"));

    let output = std::fs::read_to_string(dir.path().join("out.xml")).unwrap();
    // 21 is referenced by the galley, 23 depends on 21, 22 belonged to the draft
    assert!(output.contains(r#"id="21""#));
    assert!(output.contains(r#"id="23""#));
    assert!(!output.contains(r#"id="22""#));
    // only the revision named by file_id survives
    assert!(output.contains(r#"<file id="31""#));
    assert!(!output.contains(r#"<file id="30""#));
    // namespace declarations and schema locations are untouched
    assert!(output.contains(r#"xsi:schemaLocation="http://pkp.sfu.ca native.xsd""#));
}

#[test]
fn test_strip_overrides_uploader_and_author_group() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "-", "-u", "admin", "-a", "Autor"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"uploader="admin""#))
        .stdout(predicate::str::contains(r#"uploader="editor""#).not())
        .stdout(predicate::str::contains(r#"user_group_ref="Autor""#))
        .stdout(predicate::str::contains(r#"user_group_ref="Author""#).not());
}

#[test]
fn test_strip_accepts_long_option_names() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args([
            "strip",
            "--input",
            "issue.xml",
            "--output",
            "-",
            "--uploader",
            "admin",
            "--authorUserGroup",
            "Autor",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"user_group_ref="Autor""#));
}

#[test]
fn test_strip_reads_stdin() {
    let dir = TempDir::new().unwrap();

    nxml(dir.path())
        .args(["strip", "-i", "-", "-o", "-"])
        .write_stdin(ISSUE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Paper"))
        .stdout(predicate::str::contains("Rascunho").not());
}

#[test]
fn test_strip_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "once.xml"])
        .assert()
        .success();
    nxml(dir.path())
        .args(["strip", "-i", "once.xml", "-o", "twice.xml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Publications removed:      0"));

    let once = std::fs::read_to_string(dir.path().join("once.xml")).unwrap();
    let twice = std::fs::read_to_string(dir.path().join("twice.xml")).unwrap();
    assert_eq!(once, twice);
}

// ============================================================================
// Side-Data and Instructions Tests
// ============================================================================

#[test]
fn test_strip_without_instructions_writes_no_side_files() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "out.xml", "-j", "jpk"])
        .assert()
        .success();

    let mut files: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["issue.xml", "out.xml"]);
}

#[test]
fn test_strip_writes_instructions_and_side_data() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "out.xml", "-h", "notes.md", "-j", "jpk"])
        .assert()
        .success();

    let data = read_json(&dir.path().join("data.json"));
    assert_eq!(data["locales"], serde_json::json!(["en", "es"]));
    assert_eq!(data["genres"], serde_json::json!(["Article Text", "Image"]));

    let notes = std::fs::read_to_string(dir.path().join("notes.md")).unwrap();
    assert!(notes.contains("#1. Ensure the following locales are enabled in the journal:\nen, es\n"));
    assert!(notes.contains("SELECT 'Article Text' AS genre UNION ALL SELECT 'Image' AS genre"));
    assert!(notes.contains("INNER JOIN journals j ON j.path = 'jpk'"));
    assert!(notes.contains("#3. Import the stripped XMLs."));
}

#[test]
fn test_side_data_is_union_across_runs() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);
    write_input(dir.path(), "second-issue.xml", SECOND_ISSUE);

    for input in ["issue.xml", "second-issue.xml", "issue.xml"] {
        nxml(dir.path())
            .args(["strip", "-i", input, "-o", "-", "-h", "notes.md", "-j", "jpk"])
            .assert()
            .success();
    }

    let data = read_json(&dir.path().join("data.json"));
    assert_eq!(data["locales"], serde_json::json!(["en", "es", "fr_CA"]));
    assert_eq!(
        data["genres"],
        serde_json::json!(["Article Text", "Image", "Data Set"])
    );

    let notes = std::fs::read_to_string(dir.path().join("notes.md")).unwrap();
    assert!(notes.contains("en, es, fr_CA"));
}

#[test]
fn test_side_data_path_from_option_and_environment() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "-", "-h", "notes.md", "-j", "jpk"])
        .args(["--data", "custom.json"])
        .assert()
        .success();
    assert!(dir.path().join("custom.json").exists());

    nxml(dir.path())
        .env("NXML_DATA_FILE", "from-env.json")
        .args(["strip", "-i", "issue.xml", "-o", "-", "-h", "notes.md", "-j", "jpk"])
        .assert()
        .success();
    assert!(dir.path().join("from-env.json").exists());
    assert!(!dir.path().join("data.json").exists());
}

#[test]
fn test_malformed_side_data_starts_empty() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);
    write_input(dir.path(), "data.json", "{ not json");

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "-", "-h", "notes.md", "-j", "jpk"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring malformed side-data file"));

    let data = read_json(&dir.path().join("data.json"));
    assert_eq!(data["locales"], serde_json::json!(["en", "es"]));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_strip_requires_input_and_output() {
    let dir = TempDir::new().unwrap();

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--output"));

    nxml(dir.path())
        .args(["strip", "-o", "out.xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_instructions_require_journal() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", ISSUE);

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "-", "-h", "notes.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--journal"));
    assert!(!dir.path().join("notes.md").exists());
}

#[test]
fn test_help_is_long_only() {
    let dir = TempDir::new().unwrap();

    nxml(dir.path())
        .args(["strip", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--instructions"));
}

#[test]
fn test_missing_current_publication_fails() {
    let dir = TempDir::new().unwrap();
    write_input(
        dir.path(),
        "issue.xml",
        &ISSUE.replace(r#"current_publication_id="1""#, r#"current_publication_id="9""#),
    );

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "out.xml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Article 1 has no publication with ID '9'"));
    assert!(!dir.path().join("out.xml").exists());
}

#[test]
fn test_missing_file_revision_fails() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", &ISSUE.replace(r#"file_id="31""#, r#"file_id="39""#));

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "-"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'39'"));
}

#[test]
fn test_missing_input_file_fails() {
    let dir = TempDir::new().unwrap();

    nxml(dir.path())
        .args(["strip", "-i", "absent.xml", "-o", "-"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot read input 'absent.xml'"));
}

#[test]
fn test_malformed_xml_fails() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "issue.xml", "<articles><article>");

    nxml(dir.path())
        .args(["strip", "-i", "issue.xml", "-o", "-"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid Native XML"));
}
