//! CLI integration tests for task management.

use std::process::{Command, Output};

fn pomo(home: &std::path::Path, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_pomo");
    Command::new(bin)
        .arg("--home")
        .arg(home)
        .args(args)
        .env_remove("POMO_DEBUG")
        .output()
        .expect("failed to run pomo binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn create_list_history_delete() {
    let home = tempfile::tempdir().unwrap();

    let created = pomo(
        home.path(),
        &["create", "--label", "write essay", "-n", "3", "-d", "25m", "--tag", "uni"],
    );
    assert!(created.status.success(), "create failed: {:?}", created);
    assert!(stdout(&created).contains("created task 1"));

    let listed = pomo(home.path(), &["list"]);
    assert!(listed.status.success());
    let out = stdout(&listed);
    assert!(out.lines().any(|line| line == "count=1"), "missing count in {out}");
    let row = out
        .lines()
        .find(|line| line.contains("write essay"))
        .expect("task row missing");
    assert!(row.contains("0/3"));
    assert!(row.contains("00:25:00"));
    assert!(row.contains("[uni]"));

    let history = pomo(home.path(), &["history", "1"]);
    assert!(history.status.success());

    let deleted = pomo(home.path(), &["delete", "1"]);
    assert!(deleted.status.success());

    let listed = pomo(home.path(), &["list"]);
    assert!(stdout(&listed).lines().any(|line| line == "count=0"));
}

#[test]
fn invalid_task_is_rejected() {
    let home = tempfile::tempdir().unwrap();

    let output = pomo(home.path(), &["create", "--label", "nothing", "-n", "0"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least one interval"));
}

#[test]
fn running_unknown_task_fails() {
    let home = tempfile::tempdir().unwrap();

    let output = pomo(home.path(), &["run", "99"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("task 99 not found"));
}

#[test]
fn config_updates_defaults_for_new_tasks() {
    let home = tempfile::tempdir().unwrap();

    let config = pomo(home.path(), &["config", "--interval", "90s", "--intervals", "2"]);
    assert!(config.status.success());
    assert!(stdout(&config).contains("\"defaultIntervalMs\": 90000"));
    assert!(home.path().join("settings.json").exists());

    pomo(home.path(), &["create", "--label", "short"]);
    let listed = stdout(&pomo(home.path(), &["list"]));
    let row = listed
        .lines()
        .find(|line| line.contains("short"))
        .expect("task row missing");
    assert!(row.contains("0/2"));
    assert!(row.contains("00:01:30"));
}

#[test]
fn list_as_json_newest_first_with_limit() {
    let home = tempfile::tempdir().unwrap();
    for label in ["first", "second", "third"] {
        let created = pomo(home.path(), &["create", "--label", label, "-n", "2", "-d", "10m"]);
        assert!(created.status.success(), "create failed: {:?}", created);
    }

    let listed = pomo(home.path(), &["list", "--json", "--sort", "--limit", "2"]);
    assert!(listed.status.success());
    let list: serde_json::Value = serde_json::from_str(&stdout(&listed)).unwrap();

    assert_eq!(list["count"], 2);
    let labels: Vec<&str> = list["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["third", "second"]);
    assert_eq!(list["results"][0]["targetIntervals"], 2);
    assert_eq!(list["results"][0]["intervalMs"], 600_000);
}

#[test]
fn list_duration_window_keeps_fresh_tasks() {
    let home = tempfile::tempdir().unwrap();
    pomo(home.path(), &["create", "--label", "fresh"]);

    let listed = stdout(&pomo(home.path(), &["list", "--duration", "1h"]));

    assert!(listed.lines().any(|line| line == "count=1"), "unexpected list {listed}");
    assert!(listed.contains("fresh"));
}
