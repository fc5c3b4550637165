//! Class interval construction and data coverage.

use serde::{Deserialize, Serialize};

use crate::dataset::Stats;

/// Half-open class interval `[lower, upper)` with its expected class mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    pub correct_mark: f64,
    pub notation: String,
}

impl Interval {
    fn new(index: usize, lower: f64, upper: f64) -> Self {
        Self {
            index,
            lower,
            upper,
            correct_mark: (lower + upper) / 2.0,
            notation: format!("[{}, {})", lower, upper),
        }
    }
}

/// Build `count` intervals of width `amplitude` starting at `start`.
///
/// Interval `i` starts at `start + i·amplitude` and ends at its lower bound
/// plus `amplitude`. A non-positive or non-finite amplitude, or a non-finite
/// start, means the form is not filled in yet and produces no intervals.
pub fn build_intervals(start: f64, amplitude: f64, count: usize) -> Vec<Interval> {
    if !start.is_finite() || !amplitude.is_finite() || amplitude <= 0.0 {
        return Vec::new();
    }

    (0..count)
        .map(|i| {
            let lower = start + i as f64 * amplitude;
            Interval::new(i, lower, lower + amplitude)
        })
        .collect()
}

/// Parse a user-typed number.
///
/// Accepts surrounding whitespace and a comma as decimal separator. Returns
/// `None` for empty, malformed, infinite or NaN input.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Whether the intervals reach the largest observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coverage {
    Covered,
    NotCovered { last_upper: f64, max: f64 },
    NoIntervals,
}

impl Coverage {
    pub fn is_covered(&self) -> bool {
        matches!(self, Coverage::Covered)
    }
}

/// The intervals cover the data iff the last upper bound is `>= stats.max`.
pub fn check_coverage(intervals: &[Interval], stats: &Stats) -> Coverage {
    match intervals.last() {
        None => Coverage::NoIntervals,
        Some(last) if last.upper >= stats.max => Coverage::Covered,
        Some(last) => Coverage::NotCovered {
            last_upper: last.upper,
            max: stats.max,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::calculate_basic_stats;

    const REFERENCE: [f64; 12] = [
        10.0, 15.0, 22.0, 30.0, 45.0, 50.0, 55.0, 60.0, 65.0, 68.0, 70.0, 12.0,
    ];

    // ==================== Builder Tests ====================

    #[test]
    fn test_reference_amplitude_twelve() {
        let intervals = build_intervals(10.0, 12.0, 5);

        let notations: Vec<&str> = intervals.iter().map(|i| i.notation.as_str()).collect();
        assert_eq!(
            notations,
            vec!["[10, 22)", "[22, 34)", "[34, 46)", "[46, 58)", "[58, 70)"]
        );
        let marks: Vec<f64> = intervals.iter().map(|i| i.correct_mark).collect();
        assert_eq!(marks, vec![16.0, 28.0, 40.0, 52.0, 64.0]);
        let indices: Vec<usize> = intervals.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_decimal_bounds_in_notation() {
        let intervals = build_intervals(9.5, 2.5, 2);
        assert_eq!(intervals[0].notation, "[9.5, 12)");
        assert_eq!(intervals[1].notation, "[12, 14.5)");
        assert_eq!(intervals[1].correct_mark, 13.25);
    }

    #[test]
    fn test_upper_is_lower_plus_amplitude() {
        let intervals = build_intervals(0.1, 0.2, 5);

        for interval in &intervals {
            assert_eq!(interval.upper, interval.lower + 0.2);
        }
        assert_eq!(intervals[2].lower, 0.1 + 2.0 * 0.2);
        assert_eq!(intervals[2].upper, intervals[2].lower + 0.2);
    }

    #[test]
    fn test_zero_amplitude_yields_nothing() {
        assert!(build_intervals(10.0, 0.0, 5).is_empty());
    }

    #[test]
    fn test_negative_amplitude_yields_nothing() {
        assert!(build_intervals(10.0, -2.0, 5).is_empty());
    }

    #[test]
    fn test_nan_start_yields_nothing() {
        assert!(build_intervals(f64::NAN, 2.0, 5).is_empty());
        assert!(build_intervals(0.0, f64::INFINITY, 5).is_empty());
    }

    #[test]
    fn test_zero_count_yields_nothing() {
        assert!(build_intervals(0.0, 1.0, 0).is_empty());
    }

    // ==================== Parsing Tests ====================

    #[test]
    fn test_parse_number_accepts_plain_and_comma_decimals() {
        assert_eq!(parse_number("16"), Some(16.0));
        assert_eq!(parse_number("  16.5 "), Some(16.5));
        assert_eq!(parse_number("16,5"), Some(16.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    // ==================== Coverage Tests ====================

    #[test]
    fn test_reference_amplitude_twelve_is_covered() {
        let stats = calculate_basic_stats(&REFERENCE);
        let intervals = build_intervals(10.0, 12.0, 5);
        assert_eq!(check_coverage(&intervals, &stats), Coverage::Covered);
    }

    #[test]
    fn test_reference_amplitude_ten_is_not_covered() {
        let stats = calculate_basic_stats(&REFERENCE);
        let intervals = build_intervals(10.0, 10.0, 5);

        assert_eq!(intervals.last().unwrap().notation, "[50, 60)");
        assert_eq!(
            check_coverage(&intervals, &stats),
            Coverage::NotCovered {
                last_upper: 60.0,
                max: 70.0
            }
        );
    }

    #[test]
    fn test_coverage_without_intervals() {
        let stats = calculate_basic_stats(&REFERENCE);
        let coverage = check_coverage(&[], &stats);
        assert_eq!(coverage, Coverage::NoIntervals);
        assert!(!coverage.is_covered());
    }

    #[test]
    fn test_coverage_exactly_at_max() {
        let stats = calculate_basic_stats(&[1.0, 20.0]);
        let intervals = build_intervals(0.0, 4.0, 5);
        assert!(check_coverage(&intervals, &stats).is_covered());
    }

    // ==================== Property-Based Tests ====================

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn intervals_are_contiguous_and_increasing(
                start in -1_000.0f64..1_000.0,
                amplitude in 0.001f64..500.0,
                count in 1usize..20
            ) {
                let intervals = build_intervals(start, amplitude, count);
                prop_assert_eq!(intervals.len(), count);

                for (i, interval) in intervals.iter().enumerate() {
                    prop_assert_eq!(interval.index, i);
                    prop_assert_eq!(interval.lower, start + i as f64 * amplitude);
                    prop_assert!(interval.upper > interval.lower);
                    prop_assert_eq!(interval.upper, interval.lower + amplitude);
                    prop_assert_eq!(interval.correct_mark, (interval.lower + interval.upper) / 2.0);
                }
                let tolerance = 1e-9 * (1.0 + start.abs() + amplitude * count as f64);
                for pair in intervals.windows(2) {
                    prop_assert!((pair[0].upper - pair[1].lower).abs() <= tolerance);
                }
            }

            #[test]
            fn coverage_matches_last_upper(
                start in 0.0f64..100.0,
                amplitude in 0.5f64..30.0,
                max in 0.0f64..300.0
            ) {
                let intervals = build_intervals(start, amplitude, 5);
                let stats = Stats { min: 0.0, max, count: 1 };
                let last_upper = intervals.last().unwrap().upper;
                prop_assert_eq!(check_coverage(&intervals, &stats).is_covered(), last_upper >= max);
            }
        }
    }
}
