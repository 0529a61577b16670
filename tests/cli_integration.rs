use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// The binary, pointed at `home` for both data and the working directory.
fn backoffice(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("backoffice").unwrap();
    cmd.current_dir(home)
        .env("BACKOFFICE_HOME", home)
        .env_remove("BACKOFFICE_LOG")
        .env_remove("BACKOFFICE_PAGE_SIZE")
        .env_remove("BACKOFFICE_DATE_FORMAT")
        .env_remove("BACKOFFICE_CURRENCY_SYMBOL")
        .arg("--no-color");
    cmd
}

fn seeded(resource: &str) -> TempDir {
    let home = tempfile::tempdir().unwrap();
    backoffice(home.path())
        .args(["seed", resource])
        .assert()
        .success();
    home
}

#[test]
fn seed_then_list_first_page() {
    let home = tempfile::tempdir().unwrap();
    backoffice(home.path())
        .args(["seed", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 12 users"));

    backoffice(home.path())
        .args(["list", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("Showing 1–10 of 12"))
        .stdout(predicate::str::contains("Page [1] 2"))
        .stdout(predicate::str::contains("John Backus").not());
}

#[test]
fn list_second_page() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["ls", "users", "--page", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("John Backus"))
        .stdout(predicate::str::contains("Radia Perlman"))
        .stdout(predicate::str::contains("Showing 11–12 of 12"));
}

#[test]
fn page_past_the_end_is_clamped() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["list", "users", "--page", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 11–12 of 12"));
}

#[test]
fn search_narrows_the_list() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["list", "users", "--search", "GRACE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Search: GRACE"))
        .stdout(predicate::str::contains("Grace Hopper"))
        .stdout(predicate::str::contains("Ada Lovelace").not())
        .stdout(predicate::str::contains("Showing 1–1 of 1"));
}

#[test]
fn filter_by_enum_value() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["list", "users", "-f", "role=admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("Margaret Hamilton"))
        .stdout(predicate::str::contains("Alan Turing").not())
        .stdout(predicate::str::contains("Showing 1–3 of 3"));
}

#[test]
fn filter_on_unknown_field_is_rejected() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["list", "users", "-f", "email=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a filterable field"));
}

#[test]
fn sort_descending() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["list", "users", "--sort", "name:desc", "--page-size", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Radia Perlman"))
        .stdout(predicate::str::contains("Name ▼"))
        .stdout(predicate::str::contains("Showing 1–1 of 12"));
}

#[test]
fn json_output_is_the_table_view() {
    let home = seeded("products");
    let output = backoffice(home.path())
        .args(["list", "products", "--json", "--page-size", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["resource"], "products");
    assert_eq!(view["total_count"], 11);
    assert_eq!(view["rows"].as_array().unwrap().len(), 3);
}

#[test]
fn create_then_find_it() {
    let home = seeded("users");
    backoffice(home.path())
        .args([
            "create",
            "users",
            "--set",
            "name=Hedy Lamarr",
            "--set",
            "email=hedy@example.com",
            "--set",
            "role=viewer",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created user"));

    backoffice(home.path())
        .args(["list", "users", "-s", "hedy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hedy Lamarr"));
}

#[test]
fn create_reports_every_invalid_field() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["create", "users", "--set", "name=Nobody", "--set", "email=nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("email: must be an email address"))
        .stderr(predicate::str::contains("role: is required"));

    backoffice(home.path())
        .args(["list", "users", "-s", "Nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users match"));
}

#[test]
fn update_then_view() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["update", "users", "1", "--set", "role=viewer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated user 1"));

    backoffice(home.path())
        .args(["view", "users", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user 1"))
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("Viewer"));
}

#[test]
fn view_missing_record_fails() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["view", "users", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn delete_with_yes_skips_the_prompt() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["delete", "users", "1", "2", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 users"));

    backoffice(home.path())
        .args(["list", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace").not())
        .stdout(predicate::str::contains("Showing 1–10 of 10"));
}

#[test]
fn declined_delete_keeps_the_record() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["rm", "users", "1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete user 1? [y/N]"))
        .stdout(predicate::str::contains("Nothing deleted."));

    backoffice(home.path())
        .args(["view", "users", "1"])
        .assert()
        .success();
}

#[test]
fn confirmed_delete_removes_the_record() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["delete", "users", "3"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted user 3"));

    backoffice(home.path())
        .args(["view", "users", "3"])
        .assert()
        .failure();
}

#[test]
fn delete_unknown_id_fails_without_deleting() {
    let home = seeded("users");
    backoffice(home.path())
        .args(["delete", "users", "1", "404", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    backoffice(home.path())
        .args(["view", "users", "1"])
        .assert()
        .success();
}

#[test]
fn export_prints_selected_records() {
    let home = seeded("orders");
    let output = backoffice(home.path())
        .args(["export", "orders", "1001", "1003"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["customer"], "Ada Lovelace");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Exported 2 orders"));
}

#[test]
fn seed_refuses_to_overwrite_without_force() {
    let home = seeded("products");
    backoffice(home.path())
        .args(["seed", "products"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has 11 records"));

    backoffice(home.path())
        .args(["seed", "products", "--force"])
        .assert()
        .success();
}

#[test]
fn resources_show_fields_and_counts() {
    let home = seeded("orders");
    backoffice(home.path())
        .arg("resources")
        .assert()
        .success()
        .stdout(predicate::str::contains("orders (13 records)"))
        .stdout(predicate::str::contains("users (not seeded)"))
        .stdout(predicate::str::contains("required, search, sort"));
}

#[test]
fn unknown_resource_is_an_error() {
    let home = tempfile::tempdir().unwrap();
    backoffice(home.path())
        .args(["list", "widgets"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("widgets"));
}

#[test]
fn config_shows_effective_settings() {
    let home = tempfile::tempdir().unwrap();
    backoffice(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("page_size"))
        .stdout(predicate::str::contains("= 10"));

    backoffice(home.path())
        .args(["config", "--sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("date_format"));
}

#[test]
fn project_settings_change_the_page_size() {
    let home = seeded("users");
    let project = home.path().join(".backoffice");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join("backoffice.toml"), "page_size = 5\n").unwrap();

    backoffice(home.path())
        .args(["list", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1–5 of 12"));
}

#[test]
fn resource_page_size_beats_the_setting() {
    let home = seeded("orders");
    let project = home.path().join(".backoffice");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join("backoffice.toml"), "page_size = 20\n").unwrap();

    backoffice(home.path())
        .args(["list", "orders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1–5 of 13"));

    backoffice(home.path())
        .args(["list", "orders", "--page-size", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1–13 of 13"));
}

#[test]
fn export_reaches_records_beyond_the_first_page() {
    let home = seeded("orders");
    let output = backoffice(home.path())
        .args(["export", "orders", "1013", "1002"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1002", "1013"]);
}
