use crate::cli::commands::camp::*;
use crate::cli::error::CliError;
use crate::db::fixtures::sample_repositories;
use crate::db::{DbError, Repository, RoleKind};
use crate::service::RosterFilter;
use crate::sync::TransferManager;
use std::fs;
use tempfile::TempDir;

fn saved_manager(temp_dir: &TempDir) -> TransferManager {
    let manager = TransferManager::with_data_dir(temp_dir.path().to_path_buf());
    manager.save(&mut sample_repositories()).unwrap();
    manager
}

#[test]
fn test_list_camps_table() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let output = list_camps(&manager, "table").unwrap();

    assert!(output.contains("Orientation"));
    assert!(output.contains("2024-08-01 to 2024-08-03"));
    assert!(output.contains("1/2"));
    assert!(output.contains("LEE"));
}

#[test]
fn test_list_camps_json() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let output = list_camps(&manager, "json").unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json[0]["name"], "Orientation");
    assert_eq!(json[0]["staff_in_charge"], "HUKUMAR");
    assert_eq!(json[0]["attendees"], 1);
    assert_eq!(json[0]["committee_members"], 1);
}

#[test]
fn test_list_camps_empty() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().to_path_buf());
    manager.init().unwrap();

    assert_eq!(list_camps(&manager, "table").unwrap(), "No camps found.");
}

#[test]
fn test_parse_filter() {
    assert_eq!(parse_filter("committee").unwrap(), RosterFilter::Committee);
    assert!(matches!(
        parse_filter("staff"),
        Err(CliError::InvalidFilter { .. })
    ));
}

#[test]
fn test_camp_roster_json() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let output = camp_roster(&manager, "Orientation", "all", "json").unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json[0]["user_id"], "S1");
    assert_eq!(json[0]["role"], "attendee");
    assert_eq!(json[1]["user_id"], "LEE");
    assert_eq!(json[1]["role"], "committee_member");
    assert_eq!(json[1]["points"], 1);
}

#[test]
fn test_camp_roster_table() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let output = camp_roster(&manager, "Orientation", "committee", "table").unwrap();

    assert!(output.contains("committee member"));
    assert!(!output.contains("S1"));
}

#[test]
fn test_camp_roster_unknown_camp() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    assert!(matches!(
        camp_roster(&manager, "Nope", "all", "table"),
        Err(CliError::Database(DbError::NotFound { .. }))
    ));
}

#[test]
fn test_delete_camp_saves_cascade() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let output = delete_camp(&manager, "HUKUMAR", "Orientation").unwrap();
    assert!(output.contains("Deleted camp 'Orientation'"));

    let report = manager.load().unwrap();
    assert!(report.is_clean());
    assert!(report.repositories.camps.is_empty());
    assert!(report.repositories.enquiries.is_empty());
    let lee = report.repositories.users.get("LEE").unwrap();
    assert_eq!(lee.role_kind(), RoleKind::Student);
}

#[test]
fn test_delete_camp_by_other_user_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);

    let result = delete_camp(&manager, "LEE", "Orientation");

    assert!(matches!(
        result,
        Err(CliError::Database(DbError::Validation { .. }))
    ));
    assert_eq!(manager.load().unwrap().repositories.camps.len(), 1);
}

fn append_students(temp_dir: &TempDir, rows: &[u8]) -> Vec<u8> {
    let path = temp_dir.path().join("student.csv");
    let mut students = fs::read(&path).unwrap();
    students.extend_from_slice(rows);
    fs::write(&path, &students).unwrap();
    students
}

#[test]
fn test_delete_camp_refuses_when_a_file_is_unreadable() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);
    let students = append_students(
        &temp_dir,
        b"Zed\xff,ZED@e.ntu.edu.sg,SCSE,password,#NULL!,#NULL!\n",
    );

    let result = delete_camp(&manager, "HUKUMAR", "Orientation");

    assert!(matches!(
        result,
        Err(CliError::UnsafeSave { unreadable: 1, .. })
    ));
    assert_eq!(fs::read(temp_dir.path().join("student.csv")).unwrap(), students);
    assert_eq!(manager.load().unwrap().repositories.camps.len(), 1);
}

#[test]
fn test_delete_camp_refuses_when_rows_are_malformed() {
    let temp_dir = TempDir::new().unwrap();
    let manager = saved_manager(&temp_dir);
    let students = append_students(&temp_dir, b"Zed,ZED@e.ntu.edu.sg,#NULL!\n");

    let result = delete_camp(&manager, "HUKUMAR", "Orientation");

    assert!(matches!(
        result,
        Err(CliError::UnsafeSave { unreadable: 0, malformed: 1 })
    ));
    assert_eq!(fs::read(temp_dir.path().join("student.csv")).unwrap(), students);
    assert!(manager.load().unwrap().repositories.camps.contains("Orientation"));
}
