use crate::cli::commands::data::*;
use crate::cli::error::CliError;
use crate::db::Repository;
use crate::db::fixtures::sample_repositories;
use crate::sync::TransferManager;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::TempDir;

fn saved_manager(temp_dir: &TempDir) -> TransferManager {
    let manager = TransferManager::with_data_dir(temp_dir.path().to_path_buf());
    manager.save(&mut sample_repositories()).unwrap();
    manager
}

fn add_ghost_student(temp_dir: &TempDir) {
    let mut file = OpenOptions::new()
        .append(true)
        .open(temp_dir.path().join("student.csv"))
        .unwrap();
    writeln!(file, "Ghost,GHOST@e.ntu.edu.sg,SCSE,password,CAMP99,#NULL!").unwrap();
}

#[test]
fn test_init_reports_created_files() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().join("data"));

    let output = init(&manager).unwrap();
    assert!(output.contains("Created: staff.csv"));

    let again = init(&manager).unwrap();
    assert!(again.contains("All data files already present."));
}

#[test]
fn test_check_clean_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let output = check(&manager, "table").unwrap();

    assert!(output.contains("Committee members"));
    assert!(output.contains("No problems found"));
}

#[test]
fn test_check_lists_violations_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);
    add_ghost_student(&temp_dir);

    let output = check(&manager, "json").unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["clean"], false);
    let violations = json["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].as_str().unwrap().contains("CAMP99"));
}

#[test]
fn test_check_rejects_unknown_format() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    assert!(matches!(
        check(&manager, "yaml"),
        Err(CliError::InvalidFormat { .. })
    ));
}

#[test]
fn test_check_missing_directory_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().join("nope"));

    assert!(matches!(check(&manager, "table"), Err(CliError::Transfer(_))));
}

#[test]
fn test_status_table_and_uninitialized() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let output = status(&manager, "table").unwrap();
    assert!(output.contains("camp.csv"));
    assert!(output.contains("Total records: 7"));

    let missing = TransferManager::with_data_dir(temp_dir.path().join("nope"));
    let output = status(&missing, "table").unwrap();
    assert!(output.contains("not initialized"));
}

#[test]
fn test_rewrite_refuses_violations_without_acknowledge() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);
    add_ghost_student(&temp_dir);
    let before = fs::read_to_string(temp_dir.path().join("student.csv")).unwrap();

    let result = rewrite(&manager, false);

    assert!(matches!(result, Err(CliError::IntegrityUnresolved { count: 1 })));
    let after = fs::read_to_string(temp_dir.path().join("student.csv")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_rewrite_with_acknowledge_prunes() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);
    add_ghost_student(&temp_dir);

    let output = rewrite(&manager, true).unwrap();
    assert!(output.contains("Acknowledged 1 violation(s)"));

    let report = manager.load().unwrap();
    assert!(report.is_clean());
    let ghost = report.repositories.users.get("GHOST").unwrap();
    assert!(ghost.student().unwrap().registered_camps.is_empty());
}

#[test]
fn test_rewrite_drops_malformed_rows() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);
    let mut file = OpenOptions::new()
        .append(true)
        .open(temp_dir.path().join("enquiry.csv"))
        .unwrap();
    writeln!(file, "not-a-number,Orientation").unwrap();

    let output = rewrite(&manager, false).unwrap();

    assert!(output.contains("Dropped 1 malformed row(s)"));
    assert!(manager.load().unwrap().is_clean());
}

#[test]
fn test_rewrite_refuses_unreadable_file() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);
    let path = temp_dir.path().join("student.csv");
    let mut students = fs::read(&path).unwrap();
    students.extend_from_slice(b"Zed\xff,ZED@e.ntu.edu.sg,SCSE,password,#NULL!,#NULL!\n");
    fs::write(&path, &students).unwrap();

    let result = rewrite(&manager, true);

    assert!(matches!(
        result,
        Err(CliError::UnsafeSave { unreadable: 1, malformed: 0 })
    ));
    assert_eq!(fs::read(&path).unwrap(), students);
}
