//! Integration tests for file-backed storage.
//!
//! Each test works in its own temporary directory and reopens the stores to
//! check what survives between runs.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use la_matriu::{
    Clock, Dataset, FileStore, KvStore, MockClock, Storage, StorageError, build_intervals,
    storage::keys,
};
use tempfile::TempDir;

struct TestStorage {
    dir: TempDir,
    clock: MockClock,
}

impl TestStorage {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            clock: MockClock::new(Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap()),
        }
    }

    fn open(&self) -> Storage {
        let clock: Arc<dyn Clock> = Arc::new(self.clock.clone());
        Storage::new(
            Box::new(FileStore::new(self.dir.path().join("local.json"))),
            Box::new(FileStore::new(self.dir.path().join("session.json"))),
            clock,
            Duration::hours(1),
        )
    }
}

#[test]
fn test_dataset_survives_reopen_within_window() {
    let env = TestStorage::new();
    let dataset = Dataset::new(vec![12.0, 45.0, 30.0, 68.0]);
    env.open().save_dataset(&dataset).unwrap();

    env.clock.advance(Duration::minutes(45));

    assert_eq!(env.open().load_recent_dataset().unwrap(), Some(dataset));
}

#[test]
fn test_dataset_expires_after_window() {
    let env = TestStorage::new();
    env.open()
        .save_dataset(&Dataset::new(vec![12.0, 45.0]))
        .unwrap();

    env.clock.advance(Duration::hours(2));

    let storage = env.open();
    assert!(!storage.has_recent_data().unwrap());
    assert_eq!(storage.load_recent_dataset().unwrap(), None);
}

#[test]
fn test_session_file_uses_known_keys() {
    let env = TestStorage::new();
    env.open()
        .save_dataset(&Dataset::new(vec![10.0, 20.5]))
        .unwrap();

    let raw = FileStore::new(env.dir.path().join("session.json"));
    assert_eq!(
        raw.get(keys::EXERCISE_DATA).unwrap().as_deref(),
        Some("[10.0,20.5]")
    );
    assert_eq!(
        raw.get(keys::DATA_TIMESTAMP).unwrap(),
        Some(env.clock.now_millis().to_string())
    );
}

#[test]
fn test_results_survive_reopen() {
    let env = TestStorage::new();
    let result = la_matriu::ExerciseResult {
        completed: true,
        dataset: Dataset::new(vec![10.0, 70.0]),
        intervals: build_intervals(10.0, 15.0, 5),
        user_marks: la_matriu::UserMarks::new(),
        timestamp: 0,
    };
    env.open().save_results("intervals", result).unwrap();

    let loaded = env.open().load_results("intervals").unwrap().unwrap();
    assert!(loaded.completed);
    assert_eq!(loaded.intervals.len(), 5);
    assert_eq!(loaded.timestamp, env.clock.now_millis());
}

#[test]
fn test_corrupt_session_file_is_reported() {
    let env = TestStorage::new();
    std::fs::write(env.dir.path().join("session.json"), "{ not json").unwrap();

    let result = env.open().load_recent_dataset();
    assert!(matches!(result, Err(StorageError::Corrupt { .. })));
}
