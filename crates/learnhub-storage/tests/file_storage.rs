//! Integration tests for the on-disk session record.

use learnhub_storage::{FileStorage, PersistedSession, SessionStorage, StorageError};

fn storage() -> (tempfile::TempDir, FileStorage) {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = FileStorage::new(dir.path()).expect("storage");
    (dir, storage)
}

#[test]
fn test_load_before_any_save_returns_none() {
    let (_dir, storage) = storage();

    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn test_save_then_load_round_trips_token() {
    let (_dir, storage) = storage();

    storage.save(&PersistedSession::with_token("abc.def.ghi")).unwrap();

    let loaded = storage.load().unwrap().expect("record should exist");
    assert_eq!(loaded.token.as_deref(), Some("abc.def.ghi"));
}

#[test]
fn test_record_survives_new_storage_instance() {
    // Simulates a process restart: a second FileStorage over the same dir.
    let (dir, storage) = storage();
    storage.save(&PersistedSession::with_token("persisted")).unwrap();
    drop(storage);

    let reopened = FileStorage::new(dir.path()).unwrap();

    assert_eq!(
        reopened.load().unwrap().and_then(|s| s.token).as_deref(),
        Some("persisted")
    );
}

#[test]
fn test_record_file_is_named_after_record() {
    let (dir, storage) = storage();
    storage.save(&PersistedSession::default()).unwrap();

    assert_eq!(storage.path(), dir.path().join("auth-storage.json"));
    assert!(storage.path().exists());
    assert!(!dir.path().join("auth-storage.json.tmp").exists());
}

#[test]
fn test_clear_removes_record() {
    let (_dir, storage) = storage();
    storage.save(&PersistedSession::with_token("t")).unwrap();

    storage.clear().unwrap();

    assert!(!storage.path().exists());
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn test_clear_without_record_is_ok() {
    let (_dir, storage) = storage();

    storage.clear().expect("clearing nothing should succeed");
}

#[test]
fn test_load_corrupt_file_returns_corrupt() {
    let (_dir, storage) = storage();
    std::fs::write(storage.path(), b"not json at all").unwrap();

    assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));
}

#[test]
fn test_new_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let storage = FileStorage::new(&nested).unwrap();
    storage.save(&PersistedSession::with_token("t")).unwrap();

    assert!(nested.join("auth-storage.json").exists());
}
