//! Random dataset generation and basic statistics.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::DatasetConfig;

/// Ordered list of observations for one exercise instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    values: Vec<f64>,
}

impl Dataset {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn stats(&self) -> Stats {
        calculate_basic_stats(&self.values)
    }

    /// Values joined the way the exercise displays them: `12 , 45 , 30`.
    pub fn display(&self) -> String {
        if self.values.is_empty() {
            return "--".to_string();
        }
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" , ")
    }
}

impl From<Vec<f64>> for Dataset {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Minimum, maximum and size of a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Draw `config.count` values uniformly from `[config.min, config.max)`.
///
/// Values are floored to integers unless `allow_decimals` is set, in which
/// case they are rounded to `decimals` places. An unusable configuration
/// (non-positive count, `max <= min`, non-finite bounds or a span too wide
/// to represent) yields an empty dataset.
pub fn generate_random_data<R: Rng + ?Sized>(config: &DatasetConfig, rng: &mut R) -> Dataset {
    if config.count <= 0 {
        tracing::warn!("Dataset count {} is not positive, generating nothing", config.count);
        return Dataset::default();
    }
    if !config.min.is_finite()
        || !config.max.is_finite()
        || !(config.max - config.min).is_finite()
        || config.max <= config.min
    {
        tracing::warn!(
            "Dataset range [{}, {}) is empty or invalid, generating nothing",
            config.min,
            config.max
        );
        return Dataset::default();
    }

    let factor = if config.allow_decimals {
        10f64.powi(config.decimals.min(15) as i32)
    } else {
        1.0
    };

    let values = (0..config.count)
        .map(|_| {
            let raw = rng.gen_range(config.min..config.max);
            snap(raw, factor, config.allow_decimals, config.min, config.max)
        })
        .collect();

    Dataset::new(values)
}

/// Snap `raw` onto the `1 / factor` grid while keeping it inside `[min, max)`.
fn snap(raw: f64, factor: f64, prefer_round: bool, min: f64, max: f64) -> f64 {
    let scaled = raw * factor;
    let floored = scaled.floor() / factor;
    let rounded = scaled.round() / factor;
    let ceiled = scaled.ceil() / factor;

    let candidates = if prefer_round {
        [rounded, floored, ceiled]
    } else {
        [floored, ceiled, rounded]
    };

    candidates
        .into_iter()
        .find(|v| (min..max).contains(v))
        .unwrap_or(raw)
}

/// Reduce a dataset to `{min, max, count}`.
///
/// An empty dataset reports `{0, 0, 0}`.
pub fn calculate_basic_stats(data: &[f64]) -> Stats {
    if data.is_empty() {
        return Stats::default();
    }

    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Stats {
        min,
        max,
        count: data.len(),
    }
}

/// Format a number with a fixed number of decimals, `--` when not finite.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "--".to_string();
    }
    format!("{:.*}", decimals, value)
}
