//! Runs the compiled binary against throwaway databases.

use std::{path::Path, process::Command};

use teambench::{state, team::count_teams};

fn teambench(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_teambench"));
    cmd.current_dir(dir).env_remove("DATABASE_URL");
    cmd
}

#[test]
fn prints_one_line_and_cleans_up_after_itself() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("team.db");

    let out = teambench(dir.path())
        .arg(&db)
        .args(["--migrate", "--records", "20", "--profile", "off"])
        .output()
        .unwrap();

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 1, "{stdout}");
    assert!(lines[0].starts_with("the result is: "), "{stdout}");

    let mut conn = state::open(db.to_str().unwrap()).unwrap();
    assert_eq!(count_teams(&mut conn).unwrap(), 0);
}

#[test]
fn json_report_has_every_step() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("team.db");

    let out = teambench(dir.path())
        .arg(&db)
        .args(["--migrate", "-n", "5", "--profile", "off", "--json"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["iterations"], 5);
    assert_eq!(report["anomalies"], 0);
    assert_eq!(report["steps"].as_array().unwrap().len(), 6);
    assert_eq!(report["steps"][0][0], "create");
}

#[test]
fn heap_profile_is_written_on_exit() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("team.db");

    let out = teambench(dir.path())
        .arg(&db)
        .args(["--migrate", "-n", "3"])
        .output()
        .unwrap();

    assert!(out.status.success());
    assert!(dir.path().join("dhat-heap.json").exists());
}

#[test]
fn store_error_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("empty.db");

    // no --migrate, so the first insert hits a missing table
    let out = teambench(dir.path())
        .arg(&db)
        .args(["-n", "10", "--profile", "off"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("iteration 0: create failed"), "{stderr}");
}

#[test]
fn heap_profile_is_flushed_when_the_run_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("empty.db");

    // no --migrate and the default mem profile
    let out = teambench(dir.path())
        .arg(&db)
        .args(["-n", "3"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(dir.path().join("dhat-heap.json").exists());
}
