use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_BATCH_SIZE: usize = 40;
pub const DEFAULT_BATCH_SIZE: usize = 80;
pub const DEFAULT_BATCH_DELAY_MS: f64 = 16.0;
pub const DEFAULT_BATCH_BUDGET_MS: f64 = 6.0;
pub const DEFAULT_IDLE_TIMEOUT_MS: f64 = 120.0;

/// Batch tuning as written by a caller or a config file.
///
/// Every field is optional and unchecked; [`BatchConfig::from`] replaces
/// missing or out-of-range values with defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Nodes revealed by the first, synchronous batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_batch_size: Option<i64>,
    /// Steady-state and maximum batch size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<i64>,
    /// Pause between batches when pacing by frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_delay_ms: Option<f64>,
    /// Target cost of one batch, drives batch size adaptation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_budget_ms: Option<f64>,
    /// Longest wait before an idle-time batch is forced to run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_ms: Option<f64>,
}

/// Normalized batch tuning. Always valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    pub enabled: bool,
    pub initial_batch_size: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub batch_budget: Duration,
    pub idle_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig::from(&BatchOptions::default())
    }
}

fn size_or_default(value: Option<i64>, default: usize) -> usize {
    match value {
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(default),
        _ => default,
    }
}

fn millis_or_default(value: Option<f64>, floor: f64, default: f64) -> Duration {
    let fallback = Duration::from_secs_f64(default / 1000.0);
    match value {
        Some(ms) if ms.is_finite() && ms >= floor => {
            Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(fallback)
        }
        _ => fallback,
    }
}

impl From<&BatchOptions> for BatchConfig {
    fn from(options: &BatchOptions) -> Self {
        Self {
            enabled: options.enabled.unwrap_or(true),
            initial_batch_size: size_or_default(
                options.initial_batch_size,
                DEFAULT_INITIAL_BATCH_SIZE,
            ),
            batch_size: size_or_default(options.batch_size, DEFAULT_BATCH_SIZE),
            batch_delay: millis_or_default(options.batch_delay_ms, 0.0, DEFAULT_BATCH_DELAY_MS),
            batch_budget: millis_or_default(options.batch_budget_ms, 1.0, DEFAULT_BATCH_BUDGET_MS),
            idle_timeout: millis_or_default(options.idle_timeout_ms, 1.0, DEFAULT_IDLE_TIMEOUT_MS),
        }
    }
}

impl From<BatchOptions> for BatchConfig {
    fn from(options: BatchOptions) -> Self {
        BatchConfig::from(&options)
    }
}

impl BatchConfig {
    /// Smallest size adaptation may shrink a batch to.
    pub fn min_batch_size(&self) -> usize {
        (self.batch_size / 4).max(1)
    }
}
