//! Class mark validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::intervals::{Interval, parse_number};

pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// A recorded mark for one interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserMark {
    pub value: f64,
    pub correct: bool,
}

/// Result of checking one typed mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkOutcome {
    /// Empty or non-numeric input. Not the same as a wrong answer.
    Unset,
    Correct(f64),
    Incorrect(f64),
}

impl MarkOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, MarkOutcome::Correct(_))
    }

    fn as_mark(&self) -> Option<UserMark> {
        match *self {
            MarkOutcome::Unset => None,
            MarkOutcome::Correct(value) => Some(UserMark {
                value,
                correct: true,
            }),
            MarkOutcome::Incorrect(value) => Some(UserMark {
                value,
                correct: false,
            }),
        }
    }
}

/// `|a - b| < tolerance`. Equality at the tolerance counts as different.
pub fn numbers_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Check a typed value against the interval's class mark.
pub fn validate_mark(raw: &str, interval: &Interval, tolerance: f64) -> MarkOutcome {
    match parse_number(raw) {
        None => MarkOutcome::Unset,
        Some(value) if numbers_equal(value, interval.correct_mark, tolerance) => {
            MarkOutcome::Correct(value)
        }
        Some(value) => MarkOutcome::Incorrect(value),
    }
}

/// Marks entered so far, keyed by interval index.
///
/// An index maps to `None` once the student has touched the field and left
/// it empty or invalid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserMarks {
    marks: BTreeMap<usize, Option<UserMark>>,
}

impl UserMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, index: usize, outcome: MarkOutcome) {
        self.marks.insert(index, outcome.as_mark());
    }

    pub fn get(&self, index: usize) -> Option<&UserMark> {
        self.marks.get(&index).and_then(Option::as_ref)
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// True iff every interval has a correct mark. Never true for an empty
    /// interval sequence.
    pub fn all_correct(&self, intervals: &[Interval]) -> bool {
        !intervals.is_empty()
            && intervals
                .iter()
                .all(|interval| self.get(interval.index).is_some_and(|m| m.correct))
    }

    pub fn correct_count(&self) -> usize {
        self.marks.values().flatten().filter(|m| m.correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::build_intervals;

    fn reference_intervals() -> Vec<Interval> {
        build_intervals(10.0, 12.0, 5)
    }

    // ==================== validate_mark Tests ====================

    #[test]
    fn test_exact_mark_is_correct() {
        let intervals = reference_intervals();
        assert_eq!(
            validate_mark("16", &intervals[0], DEFAULT_TOLERANCE),
            MarkOutcome::Correct(16.0)
        );
    }

    #[test]
    fn test_mark_within_tolerance_is_correct() {
        let intervals = reference_intervals();
        assert!(validate_mark("28.005", &intervals[1], DEFAULT_TOLERANCE).is_correct());
        assert!(validate_mark("27.995", &intervals[1], DEFAULT_TOLERANCE).is_correct());
    }

    #[test]
    fn test_mark_at_tolerance_is_incorrect() {
        let intervals = build_intervals(0.0, 1.0, 1);
        // |0.51 - 0.5| is not strictly below 0.01 in floating point
        assert_eq!(
            validate_mark("0.51", &intervals[0], DEFAULT_TOLERANCE),
            MarkOutcome::Incorrect(0.51)
        );
        assert!(!numbers_equal(1.0, 1.01, 0.01));
        assert!(!numbers_equal(16.01, 16.0, 0.01));
    }

    #[test]
    fn test_wrong_mark_is_incorrect() {
        let intervals = reference_intervals();
        assert_eq!(
            validate_mark("22", &intervals[0], DEFAULT_TOLERANCE),
            MarkOutcome::Incorrect(22.0)
        );
    }

    #[test]
    fn test_non_numeric_is_unset() {
        let intervals = reference_intervals();
        assert_eq!(
            validate_mark("", &intervals[0], DEFAULT_TOLERANCE),
            MarkOutcome::Unset
        );
        assert_eq!(
            validate_mark("sixteen", &intervals[0], DEFAULT_TOLERANCE),
            MarkOutcome::Unset
        );
    }

    // ==================== UserMarks Tests ====================

    #[test]
    fn test_all_correct_on_empty_intervals_is_false() {
        let marks = UserMarks::new();
        assert!(!marks.all_correct(&[]));
    }

    #[test]
    fn test_all_correct_requires_every_interval() {
        let intervals = reference_intervals();
        let mut marks = UserMarks::new();

        for interval in &intervals[..4] {
            marks.record(interval.index, MarkOutcome::Correct(interval.correct_mark));
        }
        assert!(!marks.all_correct(&intervals));

        marks.record(4, MarkOutcome::Correct(64.0));
        assert!(marks.all_correct(&intervals));
        assert_eq!(marks.correct_count(), 5);
    }

    #[test]
    fn test_all_correct_drops_when_a_mark_turns_wrong() {
        let intervals = reference_intervals();
        let mut marks = UserMarks::new();
        for interval in &intervals {
            marks.record(interval.index, MarkOutcome::Correct(interval.correct_mark));
        }
        assert!(marks.all_correct(&intervals));

        marks.record(2, MarkOutcome::Incorrect(41.0));
        assert!(!marks.all_correct(&intervals));

        marks.record(2, MarkOutcome::Unset);
        assert!(!marks.all_correct(&intervals));
        assert!(marks.get(2).is_none());
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut marks = UserMarks::new();
        marks.record(0, MarkOutcome::Correct(16.0));
        marks.record(1, MarkOutcome::Unset);
        marks.clear();
        assert!(marks.is_empty());
    }

    #[test]
    fn test_marks_serialize_with_nulls() {
        let mut marks = UserMarks::new();
        marks.record(0, MarkOutcome::Correct(16.0));
        marks.record(1, MarkOutcome::Unset);

        let json = serde_json::to_value(&marks).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"0": {"value": 16.0, "correct": true}, "1": null})
        );
    }

    // ==================== Property-Based Tests ====================

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn correctness_is_strict_distance_check(
                value in -1_000.0f64..1_000.0,
                target in -1_000.0f64..1_000.0
            ) {
                prop_assert_eq!(numbers_equal(value, target, DEFAULT_TOLERANCE), (value - target).abs() < 0.01);
            }

            #[test]
            fn small_offsets_are_accepted(
                start in 0.0f64..100.0,
                amplitude in 1.0f64..20.0,
                offset in -0.009f64..0.009
            ) {
                let interval = build_intervals(start, amplitude, 1).remove(0);
                let typed = (interval.correct_mark + offset).to_string();
                prop_assert!(validate_mark(&typed, &interval, DEFAULT_TOLERANCE).is_correct());
            }

            #[test]
            fn large_offsets_are_rejected(
                start in 0.0f64..100.0,
                amplitude in 1.0f64..20.0,
                offset in 0.02f64..50.0
            ) {
                let interval = build_intervals(start, amplitude, 1).remove(0);
                let typed = (interval.correct_mark + offset).to_string();
                prop_assert!(!validate_mark(&typed, &interval, DEFAULT_TOLERANCE).is_correct());
            }
        }
    }
}
