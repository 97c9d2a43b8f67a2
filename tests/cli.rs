use assert_cmd::prelude::*;
use std::{fs, process::Command};
use tempfile::TempDir;

fn monthcal(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("monthcal").unwrap();
    cmd.env("RUST_LOG", "error").args([
        "--config",
        dir.path().join("config.json").to_str().unwrap(),
        "--data-dir",
        dir.path().join("data").to_str().unwrap(),
        "--export-dir",
        dir.path().join("exports").to_str().unwrap(),
    ]);
    cmd
}

fn add(dir: &TempDir, date: &str, name: &str, start: &str, end: &str) -> std::process::Output {
    monthcal(dir)
        .args([
            "add", date, "--name", name, "--start", start, "--end", end, "--type", "work",
        ])
        .output()
        .unwrap()
}

fn created_id(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Event created with ID: "))
        .expect("no event id in output")
        .trim()
        .to_string()
}

#[test]
fn add_then_list_day_as_json() {
    let dir = TempDir::new().unwrap();

    let output = add(&dir, "2024-02-14", "Dinner", "19:00", "21:00");
    assert!(output.status.success());
    let id = created_id(&output);

    let output = monthcal(&dir)
        .args(["day", "2024-02-14", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["id"], id.as_str());
    assert_eq!(events[0]["name"], "Dinner");
    assert_eq!(events[0]["startTime"], "19:00");
    assert_eq!(events[0]["type"], "work");

    assert!(dir.path().join("data/events.json").exists());
}

#[test]
fn add_rejects_inverted_times() {
    let dir = TempDir::new().unwrap();

    let output = add(&dir, "2024-02-14", "Dinner", "10:00", "09:00");
    assert!(!output.status.success());
    assert!(!dir.path().join("data/events.json").exists());
}

#[test]
fn add_rejects_duplicate_on_same_day() {
    let dir = TempDir::new().unwrap();

    assert!(add(&dir, "2024-02-14", "Dinner", "19:00", "21:00").status.success());
    assert!(!add(&dir, "2024-02-14", " dinner ", "22:00", "23:00").status.success());
    assert!(add(&dir, "2024-02-15", "Dinner", "19:00", "21:00").status.success());
}

#[test]
fn edit_and_delete_by_id() {
    let dir = TempDir::new().unwrap();
    let id = created_id(&add(&dir, "2024-03-01", "Review", "09:00", "10:00"));

    monthcal(&dir)
        .args(["edit", &id, "--name", "Quarterly review", "--end", "11:00"])
        .assert()
        .success();

    let output = monthcal(&dir)
        .args(["day", "2024-03-01", "--json"])
        .output()
        .unwrap();
    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(events[0]["name"], "Quarterly review");
    assert_eq!(events[0]["endTime"], "11:00");

    monthcal(&dir)
        .args(["delete", &id, "--force"])
        .assert()
        .success();

    let output = monthcal(&dir)
        .args(["day", "2024-03-01", "--json"])
        .output()
        .unwrap();
    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(events.as_array().unwrap().is_empty());

    monthcal(&dir)
        .args(["delete", &id, "--force"])
        .assert()
        .failure();
}

#[test]
fn export_writes_month_file() {
    let dir = TempDir::new().unwrap();
    add(&dir, "2024-02-10", "In February", "09:00", "10:00");
    add(&dir, "2024-03-10", "In March", "09:00", "10:00");

    monthcal(&dir)
        .args(["export", "--month", "2024-02"])
        .assert()
        .success();

    let path = dir.path().join("exports/events_2024-2.json");
    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    let exported = exported.as_array().unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0]["name"], "In February");
}

#[test]
fn show_prints_month_grid() {
    let dir = TempDir::new().unwrap();
    add(&dir, "2024-02-14", "Dinner", "19:00", "21:00");

    let output = monthcal(&dir)
        .args(["show", "--month", "2024-02"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("February 2024"));
    assert!(stdout.contains("14 (1)"));
    assert!(stdout.contains("29"));
}

#[test]
fn legacy_records_can_be_deleted_by_listed_id() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(
        dir.path().join("data/events.json"),
        r#"[{"name":"Old","startTime":"09:00","endTime":"10:00","description":"","day":"5 March 2024","type":"work"}]"#,
    )
    .unwrap();

    let output = monthcal(&dir)
        .args(["day", "2024-03-05", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = events[0]["id"].as_str().unwrap().to_string();

    monthcal(&dir)
        .args(["delete", &id, "--force"])
        .assert()
        .success();

    let stored = fs::read_to_string(dir.path().join("data/events.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert!(stored.as_array().unwrap().is_empty());
}
