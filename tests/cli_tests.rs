//! CLI integration tests for sqlite2pg.
//!
//! These tests run the binary on small dumps and check the written script,
//! the summary report and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the sqlite2pg binary.
fn cmd() -> Command {
    Command::cargo_bin("sqlite2pg").unwrap()
}

const DUMP: &str = r#"PRAGMA foreign_keys=OFF;
BEGIN TRANSACTION;
CREATE TABLE IF NOT EXISTS "Order" (
    "id" TEXT NOT NULL PRIMARY KEY,
    "note" TEXT,
    "total" DECIMAL NOT NULL,
    "created_at" DATETIME NOT NULL,
    "is_paid" BOOLEAN NOT NULL DEFAULT false
);
INSERT INTO "Order" VALUES('o1','Bob''s, order',12.5,1696089600000,1);
INSERT INTO "Order" VALUES('o2',NULL,0,1696089600123,0);
COMMIT;
"#;

fn write_dump(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("dump.sql");
    fs::write(&path, body).unwrap();
    path
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_no_arguments_prints_help_and_fails() {
    cmd()
        .assert()
        .failure()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_help_lists_options() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--profile"))
        .stdout(predicate::str::contains("--summary-json"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlite2pg"));
}

// =============================================================================
// Conversion Tests
// =============================================================================

#[test]
fn test_converts_dump_to_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(&dir, DUMP);
    let output = dir.path().join("out.sql");

    cmd()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("SUMMARY"));

    let script = fs::read_to_string(&output).unwrap();
    assert!(script.starts_with("-- PostgreSQL 16 Database Dump"));
    assert!(script.contains("\"created_at\" TIMESTAMP WITH TIME ZONE NOT NULL"));
    assert!(script.contains(
        "INSERT INTO \"Order\" VALUES('o1', 'Bob''s, order', 12.5, '2023-09-30 16:00:00.000+00', true);"
    ));
    assert!(script.contains(
        "INSERT INTO \"Order\" VALUES('o2', NULL, 0, '2023-09-30 16:00:00.123+00', false);"
    ));
    assert!(!script.contains("PRAGMA"));
    assert!(script.trim_end().ends_with("COMMIT;"));
}

#[test]
fn test_writes_to_stdout_without_output_path() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(&dir, DUMP);

    cmd()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS \"Order\" ("))
        .stdout(predicate::str::contains("SET session_replication_role = DEFAULT;"));
}

#[test]
fn test_summary_json_report() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(&dir, DUMP);
    let output = dir.path().join("out.sql");
    let summary = dir.path().join("summary.json");

    cmd()
        .arg("--summary-json")
        .arg(&summary)
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(report["mode"], "schema");
    assert_eq!(report["summary"]["inserts_rewritten"], 2);
    assert_eq!(report["summary"]["timestamps_converted"], 2);
    assert_eq!(report["summary"]["booleans_converted"], 2);
    assert_eq!(report["summary"]["directives_dropped"], 2);
}

#[test]
fn test_heuristic_mode() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(&dir, DUMP);

    // Without the schema, `is_paid` does not match a boolean pattern and the
    // flags stay numeric.
    cmd()
        .args(["--mode", "heuristic"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "'2023-09-30 16:00:00.000+00', 1);",
        ));
}

#[test]
fn test_custom_profile() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(&dir, DUMP);
    let profile = dir.path().join("profile.json");
    fs::write(
        &profile,
        r#"{"type_map": {"TEXT": "TEXT", "DATETIME": "TIMESTAMPTZ"}, "indexes": ["CREATE INDEX idx_order_created ON \"Order\"(created_at);"]}"#,
    )
    .unwrap();

    cmd()
        .arg("--profile")
        .arg(&profile)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\" TEXT NOT NULL PRIMARY KEY"))
        .stdout(predicate::str::contains("\"created_at\" TIMESTAMPTZ NOT NULL"))
        .stdout(predicate::str::contains("CREATE INDEX idx_order_created"))
        .stdout(predicate::str::contains("idx_product_sku").not());
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg(dir.path().join("missing.sql"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.sql"));
}

#[test]
fn test_invalid_profile_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(&dir, DUMP);
    let profile = dir.path().join("bad.json");
    fs::write(&profile, "{ nope").unwrap();

    cmd()
        .arg("--profile")
        .arg(&profile)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid profile"));
}

#[test]
fn test_invalid_mode_rejected() {
    cmd()
        .args(["--mode", "guess", "in.sql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
