use crate::db::fixtures::sample_repositories;
use crate::db::Repository;
use crate::sync::manager::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_is_initialized_false() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().join("data"));

    assert!(!manager.is_initialized());
}

#[test]
fn test_status_not_initialized() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().join("data"));

    let status = manager.status().unwrap();

    assert!(!status.initialized);
    assert!(status.files.is_empty());
}

#[test]
fn test_load_not_initialized_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().join("data"));

    let result = manager.load();

    assert!(matches!(result, Err(TransferError::Import(_))));
}

#[test]
fn test_init_creates_header_only_files() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let manager = TransferManager::with_data_dir(data_dir.clone());

    let created = manager.init().unwrap();

    assert_eq!(created.len(), 6);
    assert!(manager.is_initialized());
    let staff = fs::read_to_string(data_dir.join("staff.csv")).unwrap();
    assert_eq!(staff, "Name,Email,Faculty,Password,CreatedCamps\n");

    let report = manager.load().unwrap();
    assert!(report.is_clean());
    assert!(report.missing_files.is_empty());
}

#[test]
fn test_init_keeps_existing_files() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().to_path_buf());
    let mut repos = sample_repositories();
    manager.save(&mut repos).unwrap();

    let created = manager.init().unwrap();

    assert!(created.is_empty());
    assert_eq!(manager.load().unwrap().repositories.users.len(), 4);
}

#[test]
fn test_save_then_load_roundtrips() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().to_path_buf());
    let mut repos = sample_repositories();
    repos.delete_suggestion(1).unwrap();

    let summary = manager.save(&mut repos).unwrap();
    let report = manager.load().unwrap();

    assert_eq!(summary.suggestions, 0);
    assert_eq!(report.summary.suggestions, 0);
    assert_eq!(report.repositories.users.list(), repos.users.list());
}

#[test]
fn test_status_counts_records_and_missing_files() {
    let temp_dir = TempDir::new().unwrap();
    let manager = TransferManager::with_data_dir(temp_dir.path().to_path_buf());
    let mut repos = sample_repositories();
    manager.save(&mut repos).unwrap();
    fs::remove_file(temp_dir.path().join("enquiry.csv")).unwrap();
    fs::write(
        temp_dir.path().join("suggestion.csv"),
        "ID,Camp,Author,Suggestion,Status\n1,Orientation,LEE,Idea,maybe\n",
    )
    .unwrap();

    let status = manager.status().unwrap();

    assert!(status.initialized);
    assert_eq!(status.missing_files(), vec!["enquiry.csv"]);
    let students = status.files.iter().find(|f| f.file == "student.csv").unwrap();
    assert_eq!(students.records, 2);
    let suggestions = status.files.iter().find(|f| f.file == "suggestion.csv").unwrap();
    assert_eq!(suggestions.records, 0);
    assert_eq!(suggestions.format_errors, 1);
    assert_eq!(status.total_records(), 5);
}
