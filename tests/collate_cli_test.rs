//! Integration tests for the gleaner CLI
//!
//! These tests run the actual binary against locally built git fixtures to
//! verify:
//! - collate writes one dated artifact per distinct commit
//! - date range validation and the recoverable "no data" path
//! - origin identity validation and the local sentinel
//! - report generation and the reports listing
//!
//! Every fixture repository is driven through --repo-path, so no test needs
//! network access.

use chrono::{Local, NaiveDate, TimeZone};
use git2::{Repository, Signature, Time};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Get the path to the gleaner binary
fn binary_path() -> PathBuf {
    // When running `cargo test`, the binary is in target/debug/
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("target/debug/gleaner");

    // On Windows, add .exe
    #[cfg(windows)]
    {
        path.set_extension("exe");
    }

    path
}

/// Commit `content` at `relpath`, committed at noon local time on the date.
fn commit_file(repo: &Repository, relpath: &str, content: &[u8], y: i32, m: u32, d: u32) {
    let workdir = repo.workdir().expect("fixture repo has a workdir");
    let full = workdir.join(relpath);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dirs");
    }
    std::fs::write(&full, content).expect("write fixture file");

    let mut index = repo.index().expect("repo index");
    index
        .add_path(Path::new(relpath))
        .expect("stage fixture file");
    index.write().expect("flush index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");

    let noon = NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let seconds = Local
        .from_local_datetime(&noon)
        .single()
        .expect("unambiguous noon")
        .timestamp();
    let sig = Signature::new(
        "Fixture Author",
        "fixture@example.com",
        &Time::new(seconds, 0),
    )
    .expect("signature");

    let parent = repo
        .head()
        .ok()
        .map(|h| h.peel_to_commit().expect("head commit"));
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(
        Some("HEAD"),
        &sig,
        &sig,
        &format!("update {relpath}"),
        &tree,
        &parents,
    )
    .expect("commit fixture");
}

/// Repository with three versions of raw/foo/foo.json (2019-11-01, -05, -06)
/// plus an unrelated file committed later.
fn create_fixture_repo(origin_url: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let repo = Repository::init(dir.path()).expect("init fixture repo");
    if let Some(url) = origin_url {
        repo.remote("origin", url).expect("add origin remote");
    }

    commit_file(&repo, "raw/foo/foo.json", b"v1", 2019, 11, 1);
    commit_file(&repo, "raw/foo/foo.json", b"v2", 2019, 11, 5);
    commit_file(&repo, "raw/foo/foo.json", b"v3", 2019, 11, 6);
    commit_file(&repo, "other.txt", b"noise", 2019, 11, 10);

    dir
}

/// Run gleaner in `cwd` and return (stdout, stderr, exit_code)
fn run_gleaner(cwd: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(binary_path())
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to execute gleaner binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

// ============================================================================
// Test: Collate
// ============================================================================

#[test]
fn test_collate_writes_dated_artifacts() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--start",
            "20191104",
            "--end",
            "20191115",
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("3 snapshots written"), "stdout: {}", stdout);

    let read = |name: &str| std::fs::read_to_string(out_dir.path().join(name)).unwrap();
    assert_eq!(read("20191106_foo.json"), "v3");
    assert_eq!(read("20191105_foo.json"), "v2");
    assert_eq!(read("20191101_foo.json"), "v1");
}

#[test]
fn test_collate_honors_out_dir() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let cwd = tempfile::tempdir().expect("cwd");
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        cwd.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--end",
            "20191106",
            "--out-dir",
            out_dir.path().to_str().unwrap(),
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    // A single-day range sees only the version in effect that day.
    assert!(out_dir.path().join("20191106_foo.json").exists());
    assert!(!cwd.path().join("20191106_foo.json").exists());
}

#[test]
fn test_collate_overwrites_existing_artifacts() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");
    std::fs::write(out_dir.path().join("20191106_foo.json"), "stale").unwrap();

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--end",
            "20191106",
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    let content = std::fs::read_to_string(out_dir.path().join("20191106_foo.json")).unwrap();
    assert_eq!(content, "v3");
}

#[test]
fn test_collate_reports_no_data_for_unknown_file() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/ghost.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--start",
            "20191101",
            "--end",
            "20191115",
        ],
    );

    // Recoverable: a message, not a failure.
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(
        stderr.contains("raw/foo/ghost.json not found between 2019-11-01 and 2019-11-15"),
        "stderr: {}",
        stderr
    );
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

// ============================================================================
// Test: Date validation
// ============================================================================

#[test]
fn test_collate_rejects_future_start() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--start",
            "29991230",
        ],
    );

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("start date cannot be in the future"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_collate_rejects_reversed_range() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--start",
            "20191115",
            "--end",
            "20191101",
        ],
    );

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("start date cannot be after end date"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_collate_rejects_future_end() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--start",
            "20191101",
            "--end",
            "29991231",
        ],
    );

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("end date cannot be in the future"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_collate_rejects_malformed_date() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/foo/bar",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--start",
            "2019-11-01",
        ],
    );

    assert_ne!(exit_code, 0);
    assert!(stderr.contains("is not a YYYYMMDD date"), "stderr: {}", stderr);
}

// ============================================================================
// Test: Identity validation
// ============================================================================

#[test]
fn test_collate_detects_repository_mismatch() {
    // The working copy's origin says foo/bar but the caller asked for bar/foo.
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/bar/foo",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--end",
            "20191115",
        ],
    );

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("bar/foo repository mismatch"),
        "stderr: {}",
        stderr
    );
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_local_sentinel_requires_repo_path() {
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) =
        run_gleaner(out_dir.path(), &["collate", "local", "raw/foo/foo.json"]);

    assert_ne!(exit_code, 0);
    assert!(stderr.contains("requires --repo-path"), "stderr: {}", stderr);
}

#[test]
fn test_local_sentinel_skips_validation() {
    // No origin remote at all; the local sentinel must not care.
    let fixture = create_fixture_repo(None);
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "local",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--end",
            "20191115",
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(out_dir.path().join("20191106_foo.json").exists());
}

#[test]
fn test_no_validate_flag_disables_mismatch_check() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "collate",
            "https://github.com/bar/foo",
            "raw/foo/foo.json",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--end",
            "20191115",
            "--no-validate",
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(out_dir.path().join("20191106_foo.json").exists());
}

// ============================================================================
// Test: Reports
// ============================================================================

#[test]
fn test_reports_lists_registered_reports() {
    let dir = tempfile::tempdir().expect("cwd");

    let (stdout, stderr, exit_code) = run_gleaner(dir.path(), &["reports"]);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("history:"), "stdout: {}", stdout);
    assert!(stdout.contains("freshness:"), "stdout: {}", stdout);
    assert!(stdout.contains("inventory:"), "stdout: {}", stdout);
}

#[test]
fn test_reports_detail_shows_config_keys() {
    let dir = tempfile::tempdir().expect("cwd");

    let (stdout, stderr, exit_code) =
        run_gleaner(dir.path(), &["reports", "--detail", "history"]);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("history"), "stdout: {}", stdout);
    assert!(stdout.contains("filepath"), "stdout: {}", stdout);
}

#[test]
fn test_reports_detail_rejects_unknown_name() {
    let dir = tempfile::tempdir().expect("cwd");

    let (_stdout, stderr, exit_code) = run_gleaner(dir.path(), &["reports", "--detail", "nope"]);

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("'nope' is not a known report"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_report_history_writes_csv() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "report",
            "https://github.com/foo/bar",
            "history",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--config",
            r#"{"filepath":"raw/foo/foo.json","start":"20191104","end":"20191115"}"#,
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    let csv = std::fs::read_to_string(out_dir.path().join("history.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,commit,author,summary");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("2019-11-06,"));
    assert!(lines[3].starts_with("2019-11-01,"));
}

#[test]
fn test_report_history_no_data_is_recoverable() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "report",
            "https://github.com/foo/bar",
            "history",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--config",
            r#"{"filepath":"raw/foo/ghost.json","start":"20191101","end":"20191115"}"#,
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stderr.contains("not found between"), "stderr: {}", stderr);
    assert!(!out_dir.path().join("history.csv").exists());
}

#[test]
fn test_report_freshness_marks_missing_files_never() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "report",
            "https://github.com/foo/bar",
            "freshness",
            "--repo-path",
            fixture.path().to_str().unwrap(),
            "--config",
            r#"{"filepaths":["raw/foo/foo.json","ghost.txt"],"on":"20191110"}"#,
        ],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    let text = std::fs::read_to_string(out_dir.path().join("freshness.txt")).unwrap();
    assert!(text.contains("2019-11-06"), "report: {}", text);
    assert!(text.contains("4 days"), "report: {}", text);
    assert!(text.contains("never"), "report: {}", text);
}

#[test]
fn test_report_rejects_unknown_name() {
    let fixture = create_fixture_repo(Some("https://github.com/foo/bar.git"));
    let out_dir = tempfile::tempdir().expect("out dir");

    let (_stdout, stderr, exit_code) = run_gleaner(
        out_dir.path(),
        &[
            "report",
            "https://github.com/foo/bar",
            "nope",
            "--repo-path",
            fixture.path().to_str().unwrap(),
        ],
    );

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("'nope' is not a known report"),
        "stderr: {}",
        stderr
    );
}
