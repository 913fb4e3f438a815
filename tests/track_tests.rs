use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;


/// Stored instants are whole seconds and interval starts are unique, so
/// two starts inside the same second would collide. Let the clock tick
/// between back-to-back track commands.
fn next_second() {
    thread::sleep(Duration::from_millis(1100));
}

/// Point HOME at a fresh directory with an rc file naming the test db.
fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let config_dir = temp_dir.path().join(".ttrack");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n", db_path.display()),
    )
    .unwrap();

    std::env::set_var("HOME", temp_dir.path().to_str().unwrap());
    (temp_dir, guard)
}

fn ttrack() -> Command {
    Command::cargo_bin("ttrack").unwrap()
}

#[test]
fn test_track_starts_tracking() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack().args(["add", "writing"]).assert().success();

    ttrack()
        .args(["track", "writing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'writing' tracking started"));
}

#[test]
fn test_track_matches_name_case_insensitively() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack().args(["add", "Writing"]).assert().success();

    // The message carries the registered spelling
    ttrack()
        .args(["track", "wRiTiNg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'Writing' tracking started"));
}

#[test]
fn test_track_switch_ends_previous() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack().args(["add", "alpha"]).assert().success();
    ttrack().args(["add", "beta"]).assert().success();

    ttrack().args(["track", "alpha"]).assert().success();
    next_second();

    ttrack()
        .args(["track", "beta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'alpha' tracking ended"))
        .stdout(predicate::str::contains("'beta' tracking started"));

    // Only beta is active afterwards
    ttrack()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("beta (tracking since"))
        .stdout(predicate::str::contains("alpha (tracking since").not());
}

#[test]
fn test_track_same_task_again() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack().args(["add", "writing"]).assert().success();
    ttrack().args(["track", "writing"]).assert().success();
    next_second();

    // Restarting the same task closes its previous interval first
    ttrack()
        .args(["track", "writing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'writing' tracking ended"))
        .stdout(predicate::str::contains("'writing' tracking started"));
}

#[test]
fn test_track_unknown_task() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack()
        .args(["track", "ghost"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("task 'ghost' not found"));
}

#[test]
fn test_end_flag_stops_tracking() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack().args(["add", "writing"]).assert().success();
    ttrack().args(["track", "writing"]).assert().success();

    ttrack()
        .arg("-e")
        .assert()
        .success()
        .stdout(predicate::str::contains("'writing' tracking ended"));

    ttrack()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("tracking since").not());
}

#[test]
fn test_end_flag_with_nothing_active() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack()
        .arg("-e")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No active tasks found to end tracking on",
        ));

    // Running it again changes nothing
    ttrack()
        .arg("-e")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No active tasks found to end tracking on",
        ));
}

#[test]
fn test_end_flag_runs_before_command() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack().args(["add", "writing"]).assert().success();
    ttrack().args(["track", "writing"]).assert().success();

    ttrack()
        .args(["-e", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'writing' tracking ended"))
        .stdout(predicate::str::contains("Active Task:"))
        .stdout(predicate::str::contains("tracking since").not());
}

#[test]
fn test_list_shows_active_tracking() {
    let (_temp_dir, _guard) = setup_test_env();

    ttrack().args(["add", "writing"]).assert().success();
    ttrack().args(["track", "writing"]).assert().success();

    ttrack()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("writing (tracking since"));
}
