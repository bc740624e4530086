use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("dayplan-{nanos}-{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// 2025-03-10 is a Monday.
fn write_schedule(dir: &Path) {
    let schedule = serde_json::json!({
        "schedule": {
            "Monday": [
                { "id": "t1", "startTime": "09:00", "endTime": "09:30", "description": "Standup", "category": "Work" },
                { "id": "t2", "startTime": "10:00", "endTime": "11:00", "description": "Review", "category": "Work" }
            ],
            "Tuesday": [
                { "id": "tu1", "startTime": "08:00", "endTime": "08:30", "description": "Gym", "category": "Health" }
            ]
        }
    });
    std::fs::write(
        dir.join("schedule.json"),
        serde_json::to_string_pretty(&schedule).unwrap(),
    )
    .unwrap();
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dayplan"))
        .args(args)
        .env("DAYPLAN_STORE_DIR", dir)
        .env("DAYPLAN_DISABLE_NOTIFICATIONS", "1")
        .env_remove("DAYPLAN_CONFIG_PATH")
        .output()
        .expect("failed to run dayplan")
}

fn read_data(dir: &Path, file_name: &str) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join(file_name)).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(stored["schema_version"], 1);
    stored["data"].clone()
}

#[test]
fn rollover_archives_yesterday_once() {
    let dir = temp_dir("rollover");
    write_schedule(&dir);

    run(&dir, &["--at", "2025-03-10 09:15", "done", "t1"]);
    let rolled = run(&dir, &["--at", "2025-03-11 00:00:20", "--json", "rollover"]);
    let completions = read_data(&dir, "completed_tasks.json");
    let archive = read_data(&dir, "archived_tasks.json");
    let again = run(&dir, &["--at", "2025-03-11 00:00:50", "--json", "rollover"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(rolled.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&rolled.stdout).unwrap();
    assert_eq!(payload["rolled_over"], true);
    assert_eq!(payload["archived_date"], "2025-03-10");
    assert_eq!(payload["archived"], true);
    assert_eq!(payload["snapshot"], serde_json::json!({ "t1": true }));

    assert_eq!(completions, serde_json::json!({}));
    assert_eq!(archive["2025-03-10"], serde_json::json!({ "t1": true }));

    let again: serde_json::Value = serde_json::from_slice(&again.stdout).unwrap();
    assert_eq!(again["rolled_over"], false);
}

#[test]
fn rollover_outside_window_does_nothing() {
    let dir = temp_dir("rollover-late");
    write_schedule(&dir);

    run(&dir, &["--at", "2025-03-10 09:15", "done", "t1"]);
    let output = run(&dir, &["--at", "2025-03-11 00:05", "rollover"]);
    let completions = read_data(&dir, "completed_tasks.json");
    std::fs::remove_dir_all(&dir).ok();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No rollover due."));
    assert_eq!(completions["t1"], true);
}

#[test]
fn wider_window_via_config_override() {
    let dir = temp_dir("rollover-override");
    write_schedule(&dir);

    let output = run(
        &dir,
        &[
            "--at",
            "2025-03-11 00:05",
            "--config-override",
            "rollover-window-minutes=10",
            "rollover",
        ],
    );
    std::fs::remove_dir_all(&dir).ok();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Archived 2025-03-10 (0 completed)."));
    assert!(stdout.contains("[New Day Started]"));
}

#[test]
fn empty_days_can_be_skipped_via_config_file() {
    let dir = temp_dir("rollover-config");
    write_schedule(&dir);
    std::fs::write(dir.join("config.json"), r#"{ "archive_empty_days": false }"#).unwrap();

    let output = run(&dir, &["--at", "2025-03-11 00:00", "--json", "rollover"]);
    let archived = dir.join("archived_tasks.json").exists();
    std::fs::remove_dir_all(&dir).ok();

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["rolled_over"], true);
    assert_eq!(payload["archived"], false);
    assert!(!archived);
}

#[test]
fn tick_runs_the_rollover_check() {
    let dir = temp_dir("rollover-tick");
    write_schedule(&dir);

    run(&dir, &["notifications", "on"]);
    let output = run(&dir, &["--at", "2025-03-11 00:00:10", "--json", "tick"]);
    std::fs::remove_dir_all(&dir).ok();

    let alerts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(alerts[0]["kind"]["type"], "new_day");
    assert_eq!(alerts[0]["title"], "New Day Started");
}

#[test]
fn archive_lookup_by_date() {
    let dir = temp_dir("archive-lookup");
    write_schedule(&dir);

    run(&dir, &["--at", "2025-03-10 09:15", "done", "t2"]);
    run(&dir, &["--at", "2025-03-11 00:00", "rollover"]);
    let found = run(&dir, &["--json", "archive", "--date", "2025-03-10"]);
    let missing = run(&dir, &["archive", "--date", "2025-03-09"]);
    let listing = run(&dir, &["archive"]);
    let invalid = run(&dir, &["archive", "--date", "10/03/2025"]);
    std::fs::remove_dir_all(&dir).ok();

    let entry: serde_json::Value = serde_json::from_slice(&found.stdout).unwrap();
    assert_eq!(entry, serde_json::json!({ "t2": true }));

    let stdout = String::from_utf8_lossy(&missing.stdout);
    assert!(stdout.contains("No archive entry for 2025-03-09."));

    let stdout = String::from_utf8_lossy(&listing.stdout);
    assert!(stdout.contains("2025-03-10: t2 (1 completed)"));

    assert!(!invalid.status.success());
    let stderr = String::from_utf8_lossy(&invalid.stderr);
    assert!(stderr.contains("ERROR: invalid_input - date must be YYYY-MM-DD"));
}

#[test]
fn invalid_config_override_is_rejected() {
    let dir = temp_dir("override-invalid");
    write_schedule(&dir);

    let output = run(&dir, &["--config-override", "rollover_window_minutes=0", "today"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data"));
}
