//! End-to-end tests for the dashboard shell.
//!
//! Each test launches the `hd` binary against a temporary data
//! directory, feeds it commands on stdin, and checks the JSON files it
//! leaves behind.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::process::{Command, Stdio};

use chrono::{Datelike, Local};
use tempfile::TempDir;

fn hd_binary() -> String {
    env!("CARGO_BIN_EXE_hd").to_string()
}

/// Runs the binary with the given stdin script and returns its stdout.
fn run_session(temp: &TempDir, script: &str) -> String {
    let mut child = Command::new(hd_binary())
        .env("HD_DATA_DIR", temp.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to launch hd");
    child
        .stdin
        .as_mut()
        .expect("stdin is piped")
        .write_all(script.as_bytes())
        .expect("failed to write script");
    let output = child.wait_with_output().expect("hd did not exit");
    assert!(output.status.success(), "hd exited with an error");
    String::from_utf8(output.stdout).expect("stdout is UTF-8")
}

fn month_file(temp: &TempDir) -> BTreeMap<String, String> {
    let today = Local::now().date_naive();
    let path = temp
        .path()
        .join(format!("{}-{}.json", today.year(), today.month()));
    let raw = std::fs::read_to_string(path).expect("month file exists");
    serde_json::from_str(&raw).expect("month file is a flat JSON object")
}

#[test]
fn startup_writes_default_settings() {
    let temp = TempDir::new().unwrap();
    run_session(&temp, "q\n");

    let raw = std::fs::read_to_string(temp.path().join("settings.json")).unwrap();
    assert_eq!(raw, r#"{"max_hours_per_day":8,"weekend_days":[5,6]}"#);
}

#[test]
fn editing_a_cell_normalizes_and_persists() {
    let temp = TempDir::new().unwrap();
    let stdout = run_session(&temp, "e 5 45m\nq\n");

    let today = Local::now().date_naive();
    let day5 = today.with_day(5).unwrap().format("%d/%m/%Y").to_string();
    let data = month_file(&temp);
    assert_eq!(data[&day5], "00:45:00");
    assert!(stdout.contains("00:45:00"));
    assert!(stdout.contains("000:45:00"), "total row should include the edit");
}

#[test]
fn reset_clears_previously_saved_rows() {
    let temp = TempDir::new().unwrap();
    run_session(&temp, "e 3 2h\ne 4 1h\ns 3\nr\nq\n");

    let today = Local::now().date_naive();
    let data = month_file(&temp);
    let day3 = today.with_day(3).unwrap().format("%d/%m/%Y").to_string();
    let day4 = today.with_day(4).unwrap().format("%d/%m/%Y").to_string();
    assert_eq!(data[&day3], "00:00:00");
    assert_eq!(data[&day4], "01:00:00");
}

#[test]
fn running_stopwatch_lands_in_todays_cell() {
    let temp = TempDir::new().unwrap();
    let mut child = Command::new(hd_binary())
        .env("HD_DATA_DIR", temp.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(b"t\n").unwrap();
        stdin.flush().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1500));
        stdin.write_all(b"q\n").unwrap();
    }
    assert!(child.wait().unwrap().success());

    let today = Local::now().date_naive().format("%d/%m/%Y").to_string();
    let data = month_file(&temp);
    assert_ne!(data[&today], "00:00:00", "at least one tick should have landed");
}

#[test]
fn saved_settings_survive_into_the_next_session() {
    let temp = TempDir::new().unwrap();
    run_session(&temp, "set 6 0 6\nq\n");
    let raw = std::fs::read_to_string(temp.path().join("settings.json")).unwrap();
    assert_eq!(raw, r#"{"max_hours_per_day":6,"weekend_days":[0,6]}"#);

    // The next session reads them back instead of the defaults.
    let stdout = run_session(&temp, "q\n");
    assert!(!stdout.is_empty());
    let raw = std::fs::read_to_string(temp.path().join("settings.json")).unwrap();
    assert_eq!(raw, r#"{"max_hours_per_day":6,"weekend_days":[0,6]}"#);
}
