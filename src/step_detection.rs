//! Step detection from raw 3-axis acceleration.
//!
//! Per sample:
//! 1. Low-pass each axis into a running gravity estimate.
//! 2. Subtract gravity to get linear (motion-only) acceleration.
//! 3. Take its Euclidean norm.
//! 4. Exponentially smooth the norm.
//! 5. Fire a step when the smoothed magnitude rises above the step threshold
//!    while armed and outside the refractory period.
//!
//! The detector arms when the smoothed magnitude drops below the reset
//! threshold and disarms when a step fires. Together with the minimum step
//! interval this rejects the oscillation that follows a single heel strike.
//! The detector starts disarmed, so the transient while the gravity estimate
//! converges never counts as a step.
//!
//! The default constants were tuned empirically against real walking traces
//! and should be kept as they are.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::signal::{magnitude, ExponentialSmoother, GravityFilter};
use crate::types::{MotionSample, StepEvent};

/// Configuration for step detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepFilterConfig {
    /// Weight the gravity estimate keeps per sample. Range: [0.0, 1.0].
    pub gravity_retention: f32,
    /// Weight the smoothed magnitude keeps per sample. Range: [0.0, 1.0).
    pub smoothing_retention: f64,
    /// Smoothed linear magnitude (m/s²) that fires a step when armed.
    pub step_threshold: f64,
    /// Smoothed linear magnitude (m/s²) below which the detector re-arms.
    pub reset_threshold: f64,
    /// Minimum time between counted steps in milliseconds.
    pub min_step_interval_ms: i64,
    /// Number of recent step intervals averaged for cadence.
    pub cadence_window: usize,
}

impl Default for StepFilterConfig {
    fn default() -> Self {
        Self {
            gravity_retention: 0.92,
            smoothing_retention: 0.7,
            step_threshold: 2.4,
            reset_threshold: 1.2,
            min_step_interval_ms: 420, // ~2.4 steps/sec ceiling
            cadence_window: 10,
        }
    }
}

impl StepFilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.gravity_retention) {
            return Err(ConfigError::invalid_value(
                "gravity_retention",
                format!("{} is outside [0, 1]", self.gravity_retention),
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing_retention) {
            return Err(ConfigError::invalid_value(
                "smoothing_retention",
                format!("{} is outside [0, 1)", self.smoothing_retention),
            ));
        }
        if !(self.reset_threshold >= 0.0 && self.reset_threshold < self.step_threshold) {
            return Err(ConfigError::invalid_value(
                "reset_threshold",
                format!(
                    "must be non-negative and below step_threshold ({} vs {})",
                    self.reset_threshold, self.step_threshold
                ),
            ));
        }
        if self.min_step_interval_ms < 0 {
            return Err(ConfigError::invalid_value("min_step_interval_ms", "must be >= 0"));
        }
        if self.cadence_window == 0 {
            return Err(ConfigError::invalid_value("cadence_window", "must be > 0"));
        }
        Ok(())
    }
}

/// Streaming step detector. One instance per tracking session.
#[derive(Debug, Clone)]
pub struct StepFilter {
    config: StepFilterConfig,

    // Filtering state
    gravity: GravityFilter,
    smoothed: ExponentialSmoother,

    // Peak detector state
    armed: bool,
    last_step_ms: Option<i64>,

    // Cadence estimation
    step_intervals: VecDeque<i64>,
    cadence_hz: f32,

    step_count: u32,
}

impl StepFilter {
    /// Create a step filter; rejects an invalid configuration.
    pub fn new(config: StepFilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Step filter with the tuned default constants.
    pub fn with_defaults() -> Self {
        Self::from_validated(StepFilterConfig::default())
    }

    /// Process one accelerometer sample. Returns the step it fired, if any.
    ///
    /// A sample with a non-finite axis is dropped before it reaches the
    /// filters, so one bad reading cannot poison the running estimates.
    pub fn process_sample(&mut self, sample: &MotionSample) -> Option<StepEvent> {
        if !sample.axes().iter().all(|v| v.is_finite()) {
            trace!(timestamp_ms = sample.timestamp_ms, "dropping non-finite sample");
            return None;
        }

        let linear = self.gravity.update(sample.axes());
        let smoothed = self.smoothed.update(magnitude(linear) as f64);

        if smoothed < self.config.reset_threshold {
            self.armed = true;
            return None;
        }

        if !self.armed || smoothed <= self.config.step_threshold {
            return None;
        }

        if let Some(last) = self.last_step_ms {
            // Non-positive elapsed time (clock went backwards) counts as zero.
            let elapsed = sample.timestamp_ms.saturating_sub(last).max(0);
            if elapsed < self.config.min_step_interval_ms {
                trace!(elapsed, "step suppressed by refractory period");
                return None;
            }
        }

        Some(self.record_step(sample.timestamp_ms, smoothed))
    }

    /// Process a batch of samples and return every step fired.
    pub fn process_batch(&mut self, samples: &[MotionSample]) -> Vec<StepEvent> {
        samples
            .iter()
            .filter_map(|sample| self.process_sample(sample))
            .collect()
    }

    /// Total steps counted.
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Current smoothed linear-acceleration magnitude (m/s²).
    pub fn current_magnitude(&self) -> f64 {
        self.smoothed.value()
    }

    /// Steps per second over the recent interval window; 0 before the second step.
    pub fn cadence_hz(&self) -> f32 {
        self.cadence_hz
    }

    pub fn last_step_ms(&self) -> Option<i64> {
        self.last_step_ms
    }

    /// True when a rising crossing would fire (subject to the refractory period).
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn config(&self) -> &StepFilterConfig {
        &self.config
    }

    /// Reset all filter state and the step count.
    pub fn reset(&mut self) {
        self.gravity.reset();
        self.smoothed.reset();
        self.armed = false;
        self.last_step_ms = None;
        self.step_intervals.clear();
        self.cadence_hz = 0.0;
        self.step_count = 0;
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn from_validated(config: StepFilterConfig) -> Self {
        Self {
            gravity: GravityFilter::new(config.gravity_retention),
            smoothed: ExponentialSmoother::new(config.smoothing_retention),
            armed: false,
            last_step_ms: None,
            step_intervals: VecDeque::with_capacity(config.cadence_window),
            cadence_hz: 0.0,
            step_count: 0,
            config,
        }
    }

    fn record_step(&mut self, timestamp_ms: i64, smoothed: f64) -> StepEvent {
        if let Some(last) = self.last_step_ms {
            if self.step_intervals.len() == self.config.cadence_window {
                self.step_intervals.pop_front();
            }
            self.step_intervals.push_back(timestamp_ms.saturating_sub(last).max(0));
            self.update_cadence();
        }

        self.armed = false;
        self.last_step_ms = Some(timestamp_ms);
        self.step_count += 1;

        debug!(
            step_count = self.step_count,
            timestamp_ms,
            magnitude = smoothed,
            "step detected"
        );

        StepEvent {
            timestamp_ms,
            step_count: self.step_count,
            magnitude: smoothed,
            cadence_hz: self.cadence_hz,
        }
    }

    fn update_cadence(&mut self) {
        if self.step_intervals.is_empty() {
            self.cadence_hz = 0.0;
            return;
        }
        let sum: f64 = self.step_intervals.iter().map(|&ms| ms as f64).sum();
        let avg_interval_ms = sum / self.step_intervals.len() as f64;
        if avg_interval_ms > 0.0 {
            self.cadence_hz = (1000.0 / avg_interval_ms) as f32;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
