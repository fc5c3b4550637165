use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{KvStore, MemoryStore, StorageError};
use crate::{
    dataset::Dataset,
    i18n::Language,
    intervals::Interval,
    traits::Clock,
    tutor::{ApiKey, Credential},
    validation::UserMarks,
};

/// Storage keys.
pub mod keys {
    pub const API_KEY: &str = "la_matriu_key";
    pub const LANGUAGE: &str = "matriu_language";
    pub const EXERCISE_DATA: &str = "matriu_exercise_data";
    pub const DATA_TIMESTAMP: &str = "matriu_data_timestamp";
    pub const EXERCISE_RESULTS: &str = "matriu_exercise_results";
}

/// Snapshot saved once every mark in an exercise is correct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResult {
    pub completed: bool,
    pub dataset: Dataset,
    pub intervals: Vec<Interval>,
    pub user_marks: UserMarks,
    /// Epoch milliseconds, set when saved.
    pub timestamp: i64,
}

/// Exercise persistence over a durable `local` store and a `session` store.
pub struct Storage {
    local: Box<dyn KvStore>,
    session: Box<dyn KvStore>,
    clock: Arc<dyn Clock>,
    recency_window: Duration,
}

impl Storage {
    pub fn new(
        local: Box<dyn KvStore>,
        session: Box<dyn KvStore>,
        clock: Arc<dyn Clock>,
        recency_window: Duration,
    ) -> Self {
        Self {
            local,
            session,
            clock,
            recency_window,
        }
    }

    /// Both scopes in memory, one-hour window.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            clock,
            Duration::hours(1),
        )
    }

    // ==================== Dataset ====================

    pub fn save_dataset(&mut self, dataset: &Dataset) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(dataset).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.session.set(keys::EXERCISE_DATA, &json)?;
        self.session
            .set(keys::DATA_TIMESTAMP, &self.clock.now_millis().to_string())
    }

    /// Whether a dataset timestamp exists and is younger than the window.
    pub fn has_recent_data(&self) -> Result<bool, StorageError> {
        let Some(raw) = self.session.get(keys::DATA_TIMESTAMP)? else {
            return Ok(false);
        };
        let Ok(saved_at) = raw.trim().parse::<i64>() else {
            tracing::debug!("Ignoring unparsable dataset timestamp {:?}", raw);
            return Ok(false);
        };

        // A timestamp in the future or too far out to subtract is not recent
        match self.clock.now_millis().checked_sub(saved_at) {
            Some(age_ms) if age_ms >= 0 => Ok(age_ms < self.recency_window.num_milliseconds()),
            _ => {
                tracing::debug!("Ignoring out-of-range dataset timestamp {}", saved_at);
                Ok(false)
            }
        }
    }

    /// The stored dataset, or `None` when it is missing or stale.
    pub fn load_recent_dataset(&self) -> Result<Option<Dataset>, StorageError> {
        if !self.has_recent_data()? {
            return Ok(None);
        }
        let Some(json) = self.session.get(keys::EXERCISE_DATA)? else {
            return Ok(None);
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: keys::EXERCISE_DATA.to_string(),
                reason: e.to_string(),
            })
    }

    /// Drop the dataset, its timestamp and all results.
    pub fn clear_exercise_data(&mut self) -> Result<(), StorageError> {
        self.session.remove(keys::EXERCISE_DATA)?;
        self.session.remove(keys::DATA_TIMESTAMP)?;
        self.session.remove(keys::EXERCISE_RESULTS)
    }

    // ==================== Results ====================

    fn read_results(&self) -> Result<BTreeMap<String, ExerciseResult>, StorageError> {
        match self.session.get(keys::EXERCISE_RESULTS)? {
            None => Ok(BTreeMap::new()),
            Some(json) => serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
                key: keys::EXERCISE_RESULTS.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Store `result` under `exercise_id`, stamping the current time.
    pub fn save_results(
        &mut self,
        exercise_id: &str,
        mut result: ExerciseResult,
    ) -> Result<(), StorageError> {
        let mut all = self.read_results()?;
        result.timestamp = self.clock.now_millis();
        all.insert(exercise_id.to_string(), result);

        let json =
            serde_json::to_string(&all).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.session.set(keys::EXERCISE_RESULTS, &json)
    }

    pub fn load_results(&self, exercise_id: &str) -> Result<Option<ExerciseResult>, StorageError> {
        Ok(self.read_results()?.remove(exercise_id))
    }

    // ==================== Credential ====================

    pub fn save_credential(&mut self, key: &ApiKey) -> Result<(), StorageError> {
        self.local.set(keys::API_KEY, key.expose())
    }

    pub fn load_credential(&self) -> Result<Credential, StorageError> {
        Ok(Credential::from_stored(
            self.local.get(keys::API_KEY)?.as_deref(),
        ))
    }

    pub fn clear_credential(&mut self) -> Result<(), StorageError> {
        self.local.remove(keys::API_KEY)
    }

    // ==================== Language ====================

    pub fn save_language(&mut self, language: Language) -> Result<(), StorageError> {
        self.local.set(keys::LANGUAGE, language.code())
    }

    /// Stored language, `None` if unset or unrecognised.
    pub fn load_language(&self) -> Result<Option<Language>, StorageError> {
        Ok(self
            .local
            .get(keys::LANGUAGE)?
            .and_then(|code| code.parse().ok()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{intervals::build_intervals, traits::MockClock, validation::MarkOutcome};

    fn setup() -> (Storage, MockClock) {
        let clock = MockClock::new(Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap());
        (Storage::in_memory(Arc::new(clock.clone())), clock)
    }

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![10.0, 15.0, 22.0, 70.0])
    }

    // ==================== Recency Tests ====================

    #[test]
    fn test_fresh_dataset_is_recent() {
        let (mut storage, clock) = setup();
        storage.save_dataset(&sample_dataset()).unwrap();

        clock.advance(Duration::minutes(59));

        assert!(storage.has_recent_data().unwrap());
        assert_eq!(storage.load_recent_dataset().unwrap(), Some(sample_dataset()));
    }

    #[test]
    fn test_dataset_exactly_one_hour_old_is_stale() {
        let (mut storage, clock) = setup();
        storage.save_dataset(&sample_dataset()).unwrap();

        clock.advance(Duration::hours(1));

        assert!(!storage.has_recent_data().unwrap());
        assert_eq!(storage.load_recent_dataset().unwrap(), None);
    }

    #[test]
    fn test_two_hour_old_dataset_is_absent() {
        let (mut storage, clock) = setup();
        storage.save_dataset(&sample_dataset()).unwrap();

        clock.advance(Duration::hours(2));

        assert_eq!(storage.load_recent_dataset().unwrap(), None);
    }

    #[test]
    fn test_nothing_saved_is_absent() {
        let (storage, _) = setup();
        assert!(!storage.has_recent_data().unwrap());
        assert_eq!(storage.load_recent_dataset().unwrap(), None);
    }

    #[test]
    fn test_garbage_timestamp_is_absent() {
        let (mut storage, _) = setup();
        storage.save_dataset(&sample_dataset()).unwrap();
        storage.session.set(keys::DATA_TIMESTAMP, "yesterday").unwrap();

        assert_eq!(storage.load_recent_dataset().unwrap(), None);
    }

    #[test]
    fn test_extreme_timestamps_are_absent() {
        let (mut storage, clock) = setup();
        storage.save_dataset(&sample_dataset()).unwrap();

        for raw in [i64::MIN.to_string(), i64::MAX.to_string()] {
            storage.session.set(keys::DATA_TIMESTAMP, &raw).unwrap();
            assert!(!storage.has_recent_data().unwrap(), "{} counted as recent", raw);
            assert_eq!(storage.load_recent_dataset().unwrap(), None);
        }

        let future = clock.now_millis() + 60_000;
        storage
            .session
            .set(keys::DATA_TIMESTAMP, &future.to_string())
            .unwrap();
        assert!(!storage.has_recent_data().unwrap());
    }

    #[test]
    fn test_corrupt_dataset_is_an_error() {
        let (mut storage, _) = setup();
        storage.save_dataset(&sample_dataset()).unwrap();
        storage.session.set(keys::EXERCISE_DATA, "[1, 2,").unwrap();

        assert!(matches!(
            storage.load_recent_dataset(),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_clear_exercise_data() {
        let (mut storage, _) = setup();
        storage.save_dataset(&sample_dataset()).unwrap();
        storage.clear_exercise_data().unwrap();
        assert!(!storage.has_recent_data().unwrap());
    }

    // ==================== Results Tests ====================

    #[test]
    fn test_results_are_keyed_and_timestamped() {
        let (mut storage, clock) = setup();
        let intervals = build_intervals(10.0, 15.0, 4);
        let mut marks = UserMarks::new();
        marks.record(0, MarkOutcome::Correct(17.5));

        let result = ExerciseResult {
            completed: true,
            dataset: sample_dataset(),
            intervals: intervals.clone(),
            user_marks: marks.clone(),
            timestamp: 0,
        };
        storage.save_results("intervals", result).unwrap();

        let loaded = storage.load_results("intervals").unwrap().unwrap();
        assert!(loaded.completed);
        assert_eq!(loaded.intervals, intervals);
        assert_eq!(loaded.user_marks, marks);
        assert_eq!(loaded.timestamp, clock.now_millis());
        assert!(storage.load_results("frequencies").unwrap().is_none());
    }

    #[test]
    fn test_saving_one_result_keeps_others() {
        let (mut storage, _) = setup();
        let result = ExerciseResult {
            completed: true,
            dataset: sample_dataset(),
            intervals: Vec::new(),
            user_marks: UserMarks::new(),
            timestamp: 0,
        };
        storage.save_results("a", result.clone()).unwrap();
        storage.save_results("b", result).unwrap();

        assert!(storage.load_results("a").unwrap().is_some());
        assert!(storage.load_results("b").unwrap().is_some());
    }

    // ==================== Credential & Language Tests ====================

    #[test]
    fn test_credential_round_trip() {
        let (mut storage, _) = setup();
        assert_eq!(storage.load_credential().unwrap(), Credential::Unconfigured);

        let key = ApiKey::parse("AIzaSyExampleKey123").unwrap();
        storage.save_credential(&key).unwrap();
        assert_eq!(
            storage.load_credential().unwrap(),
            Credential::Configured(key)
        );

        storage.clear_credential().unwrap();
        assert_eq!(storage.load_credential().unwrap(), Credential::Unconfigured);
    }

    #[test]
    fn test_language_round_trip() {
        let (mut storage, _) = setup();
        assert_eq!(storage.load_language().unwrap(), None);

        storage.save_language(Language::Spanish).unwrap();
        assert_eq!(storage.load_language().unwrap(), Some(Language::Spanish));
    }

    #[test]
    fn test_unknown_language_code_is_ignored() {
        let (mut storage, _) = setup();
        storage.local.set(keys::LANGUAGE, "klingon").unwrap();
        assert_eq!(storage.load_language().unwrap(), None);
    }
}
