//! End-to-end tests for nxml dois command
//!
//! These tests validate the DOI import workflow including:
//! - Statement generation and escaping
//! - Append mode across runs
//! - Skipped articles
//! - Error handling and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const ISSUE: &str = include_str!("fixtures/issue.xml");

fn nxml(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nxml").unwrap();
    cmd.current_dir(dir)
        .env_remove("LOG_LEVEL")
        .env_remove("LOG_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Export with one article per `(doi, titles)` pair
fn export(articles: &[(Option<&str>, &[&str])]) -> String {
    let articles: String = articles
        .iter()
        .enumerate()
        .map(|(i, (doi, titles))| {
            let doi = doi
                .map(|doi| format!(r#"<id type="doi">{}</id>"#, doi))
                .unwrap_or_default();
            let titles: String = titles
                .iter()
                .map(|title| format!(r#"<title locale="en">{}</title>"#, title))
                .collect();
            format!(
                r#"<article current_publication_id="{id}"><publication><id type="internal">{id}</id>{doi}{titles}</publication></article>"#,
                id = i + 1,
                doi = doi,
                titles = titles
            )
        })
        .collect();
    format!(r#"<articles xmlns="http://pkp.sfu.ca">{}</articles>"#, articles)
}

#[test]
fn test_dois_generates_statement() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("issue.xml"), ISSUE).unwrap();

    nxml(dir.path())
        .args(["dois", "-i", "issue.xml", "-o", "dois.sql"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Appended 1 statement(s)"));

    let sql = std::fs::read_to_string(dir.path().join("dois.sql")).unwrap();
    assert_eq!(
        sql,
        "INSERT INTO publication_settings (publication_id, setting_name, setting_value, locale)\n\
         SELECT (SELECT DISTINCT ps.publication_id FROM publication_settings ps WHERE ps.setting_name = 'title' \
         AND ps.setting_value IN ('Test Paper', 'Artículo de O\\'Brien')) AS publication_id, \
         'pub-id::doi' AS setting_name, '10.1234/abc' AS setting_value, '' AS locale;\n\n"
    );
}

#[test]
fn test_dois_escapes_quotes_and_backslashes() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("in.xml"),
        export(&[(Some(r"10.1/a\b"), &["O'Brien's Study"])]),
    )
    .unwrap();

    nxml(dir.path())
        .args(["dois", "-i", "in.xml", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"IN ('O\'Brien\'s Study')"))
        .stdout(predicate::str::contains(r"'10.1/a\\b' AS setting_value"));
}

#[test]
fn test_dois_appends_across_runs() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.xml"), export(&[(Some("10.1/a"), &["A"])])).unwrap();
    std::fs::write(dir.path().join("b.xml"), export(&[(Some("10.1/b"), &["B"])])).unwrap();

    for input in ["a.xml", "b.xml"] {
        nxml(dir.path())
            .args(["dois", "-i", input, "-o", "dois.sql"])
            .assert()
            .success();
    }

    let sql = std::fs::read_to_string(dir.path().join("dois.sql")).unwrap();
    let a = sql.find("'10.1/a'").unwrap();
    let b = sql.find("'10.1/b'").unwrap();
    assert!(a < b);
    assert_eq!(sql.matches("INSERT INTO").count(), 2);
}

#[test]
fn test_dois_skips_incomplete_articles() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("in.xml"),
        export(&[(Some("10.1/a"), &["A"]), (None, &["B"]), (Some("10.1/c"), &[])]),
    )
    .unwrap();

    nxml(dir.path())
        .args(["dois", "-i", "in.xml", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'10.1/a'"))
        .stdout(predicate::str::contains("'10.1/c'").not())
        .stderr(predicate::str::contains("Skipping article 2: it has no DOI"))
        .stderr(predicate::str::contains("Skipping article 3: it has no title"));
}

#[test]
fn test_dois_reads_stdin() {
    let dir = TempDir::new().unwrap();

    nxml(dir.path())
        .args(["dois", "-i", "-", "-o", "-"])
        .write_stdin(ISSUE)
        .assert()
        .success()
        .stdout(predicate::str::contains("'10.1234/abc' AS setting_value"));
}

#[test]
fn test_dois_requires_input_and_output() {
    let dir = TempDir::new().unwrap();

    nxml(dir.path())
        .args(["dois", "-i", "in.xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_no_subcommand_is_usage_error() {
    let dir = TempDir::new().unwrap();

    nxml(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("A subcommand is required"));
}

#[test]
fn test_dois_malformed_xml_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("in.xml"), "<articles>").unwrap();

    nxml(dir.path())
        .args(["dois", "-i", "in.xml", "-o", "dois.sql"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid Native XML"));
    assert!(!dir.path().join("dois.sql").exists());
}
