//! End-to-end tests driving the `showings` binary against a temp database.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn showings_binary() -> String {
    env!("CARGO_BIN_EXE_showings").to_string()
}

/// Writes a config for `alice` (maple-12, oak-3) and `bob` (birch-7).
fn write_config(temp: &Path) -> PathBuf {
    let db_path = temp.join("data").join("showings.db");
    let config_path = temp.join("showings.toml");
    let config = format!(
        r#"database_path = "{}"
owner = "alice"

[properties]
alice = ["maple-12", "oak-3"]
bob = ["birch-7"]
"#,
        db_path.display()
    );
    std::fs::write(&config_path, config).unwrap();
    config_path
}

fn showings(temp: &Path, args: &[&str]) -> Output {
    let config = temp.join("showings.toml");
    Command::new(showings_binary())
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env("XDG_DATA_HOME", temp.join(".local/share"))
        .env_remove("SHOWINGS_OWNER")
        .env_remove("SHOWINGS_DATABASE_PATH")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("failed to run showings")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "showings should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn list_json(temp: &Path) -> Vec<Value> {
    let stdout = stdout_of(&showings(temp, &["list", "--json"]));
    serde_json::from_str(&stdout).unwrap()
}

fn create(temp: &Path, property: &str, start: &str, end: &str) -> Output {
    showings(
        temp,
        &[
            "create",
            "--property",
            property,
            "--date",
            "2025-03-02",
            "--start",
            start,
            "--end",
            end,
        ],
    )
}

#[test]
fn test_adjacent_creates_are_merged() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    stdout_of(&create(temp.path(), "maple-12", "10:00", "11:00"));
    let stdout = stdout_of(&create(temp.path(), "maple-12", "11:00", "11:30"));
    assert!(stdout.contains("10:00-11:30"), "got: {stdout}");

    let showings = list_json(temp.path());
    assert_eq!(showings.len(), 1);
    assert_eq!(showings[0]["property_id"], "maple-12");
    assert_eq!(showings[0]["start_time"], "2025-03-02T10:00:00Z");
    assert_eq!(showings[0]["end_time"], "2025-03-02T11:30:00Z");
}

#[test]
fn test_overlap_is_rejected_and_store_unchanged() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    stdout_of(&create(temp.path(), "maple-12", "10:00", "11:00"));
    let before = list_json(temp.path());

    let output = create(temp.path(), "maple-12", "10:30", "11:30");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("overlaps"), "got: {stderr}");

    assert_eq!(list_json(temp.path()), before);
}

#[test]
fn test_other_properties_do_not_conflict() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    stdout_of(&create(temp.path(), "maple-12", "10:00", "11:00"));
    stdout_of(&create(temp.path(), "oak-3", "10:00", "11:00"));

    assert_eq!(list_json(temp.path()).len(), 2);
}

#[test]
fn test_select_then_week_view() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let stdout = stdout_of(&showings(
        temp.path(),
        &[
            "select",
            "--property",
            "oak-3",
            "--date",
            "2025-03-04",
            "--events",
            "down 10:00, enter 09:00, up",
        ],
    ));
    assert!(stdout.contains("Selected 09:00-10:15 on 2025-03-04"));

    let stdout = stdout_of(&showings(temp.path(), &["week", "2025-03-06", "--json"]));
    let week: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(week["week_start"], "2025-03-02");
    let tuesday = &week["days"][2];
    assert_eq!(tuesday["date"], "2025-03-04");
    assert_eq!(tuesday["showings"][0]["start_time"], "2025-03-04T09:00:00Z");
    assert_eq!(tuesday["showings"][0]["end_time"], "2025-03-04T10:15:00Z");
}

#[test]
fn test_delete_twice_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    stdout_of(&create(temp.path(), "maple-12", "10:00", "11:00"));
    let id = list_json(temp.path())[0]["id"].as_str().unwrap().to_string();

    let stdout = stdout_of(&showings(temp.path(), &["delete", &id]));
    assert!(stdout.starts_with("Deleted maple-12"));

    let stdout = stdout_of(&showings(temp.path(), &["delete", &id]));
    assert_eq!(stdout, format!("Showing {id} already removed.\n"));
    assert!(list_json(temp.path()).is_empty());
}

#[test]
fn test_owner_flag_and_env_select_owner() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let stdout = stdout_of(&showings(temp.path(), &["properties"]));
    assert_eq!(stdout, "maple-12\noak-3\n");

    let stdout = stdout_of(&showings(temp.path(), &["--owner", "bob", "properties"]));
    assert_eq!(stdout, "birch-7\n");

    let config = temp.path().join("showings.toml");
    let output = Command::new(showings_binary())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env("SHOWINGS_OWNER", "bob")
        .arg("--config")
        .arg(&config)
        .arg("properties")
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "birch-7\n");
}

#[test]
fn test_owner_cannot_touch_foreign_property() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let output = create(temp.path(), "birch-7", "10:00", "11:00");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not own property birch-7"), "got: {stderr}");
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());

    let stdout = stdout_of(&showings(temp.path(), &[]));
    assert!(stdout.contains("Usage"));
}
