//! Hold-time tracking for isometric exercises (plank and friends).
//!
//! The tracker is driven by one angle per frame. While the angle stays inside
//! the valid band the hold accumulates wall time between frames; the first
//! out-of-band or undefined sample ends the hold and commits it to the best
//! time.

use tracing::debug;

use crate::error::ConfigError;
use crate::types::{is_valid_angle, HoldStatus};

/// Maximum form score.
pub const MAX_FORM_SCORE: f32 = 10.0;

/// Inclusive angle band that counts as correct form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTrackerConfig {
    min_valid_angle: f32,
    max_valid_angle: f32,
}

impl HoldTrackerConfig {
    /// Rejects empty, inverted or non-finite bands.
    pub fn new(min_valid_angle: f32, max_valid_angle: f32) -> Result<Self, ConfigError> {
        if !min_valid_angle.is_finite()
            || !max_valid_angle.is_finite()
            || min_valid_angle >= max_valid_angle
        {
            return Err(ConfigError::EmptyHoldBand {
                min: min_valid_angle,
                max: max_valid_angle,
            });
        }
        Ok(Self {
            min_valid_angle,
            max_valid_angle,
        })
    }

    pub fn min_valid_angle(&self) -> f32 {
        self.min_valid_angle
    }

    pub fn max_valid_angle(&self) -> f32 {
        self.max_valid_angle
    }

    fn contains(&self, angle: f32) -> bool {
        is_valid_angle(angle) && angle >= self.min_valid_angle && angle <= self.max_valid_angle
    }

    /// Linear position of `angle` in the band, scaled to [0, 10].
    fn score(&self, angle: f32) -> f32 {
        let span = self.max_valid_angle - self.min_valid_angle;
        (MAX_FORM_SCORE * (angle - self.min_valid_angle) / span).clamp(0.0, MAX_FORM_SCORE)
    }
}

/// Accumulates hold time and scores form for one hold exercise.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    config: HoldTrackerConfig,
    current_hold_ms: i64,
    best_hold_ms: i64,
    is_holding: bool,
    last_timestamp_ms: Option<i64>,
    form_score: f32,
}

impl HoldTracker {
    pub fn new(config: HoldTrackerConfig) -> Self {
        Self {
            config,
            current_hold_ms: 0,
            best_hold_ms: 0,
            is_holding: false,
            last_timestamp_ms: None,
            form_score: 0.0,
        }
    }

    /// Feed one angle sample taken at `timestamp_ms`.
    ///
    /// A non-positive delta between frames (clock adjustment, duplicate
    /// frame) adds no time.
    pub fn update(&mut self, angle: f32, timestamp_ms: i64) {
        if !self.config.contains(angle) {
            if self.is_holding {
                self.best_hold_ms = self.best_hold_ms.max(self.current_hold_ms);
                debug!(
                    held_ms = self.current_hold_ms,
                    best_ms = self.best_hold_ms,
                    "hold broken"
                );
            }
            self.is_holding = false;
            self.current_hold_ms = 0;
            self.last_timestamp_ms = None;
            self.form_score = 0.0;
            return;
        }

        if self.is_holding {
            if let Some(last) = self.last_timestamp_ms {
                self.current_hold_ms = self
                    .current_hold_ms
                    .saturating_add(timestamp_ms.saturating_sub(last).max(0));
            }
        } else {
            self.is_holding = true;
            self.current_hold_ms = 0;
            debug!(angle, timestamp_ms, "hold started");
        }
        self.last_timestamp_ms = Some(timestamp_ms);
        self.form_score = self.config.score(angle);
    }

    /// Clears hold time, best time and score.
    pub fn reset(&mut self) {
        self.current_hold_ms = 0;
        self.best_hold_ms = 0;
        self.is_holding = false;
        self.last_timestamp_ms = None;
        self.form_score = 0.0;
    }

    pub fn is_holding(&self) -> bool {
        self.is_holding
    }

    pub fn current_hold_ms(&self) -> i64 {
        self.current_hold_ms
    }

    /// Best committed hold. A hold still in progress is committed when it breaks.
    pub fn best_hold_ms(&self) -> i64 {
        self.best_hold_ms
    }

    /// Best hold including the one in progress.
    pub fn longest_hold_ms(&self) -> i64 {
        self.best_hold_ms.max(self.current_hold_ms)
    }

    pub fn form_score(&self) -> f32 {
        self.form_score
    }

    pub fn config(&self) -> &HoldTrackerConfig {
        &self.config
    }

    /// Current hold as zero-padded `MM:SS`.
    pub fn current_time_formatted(&self) -> String {
        format_mm_ss(self.current_hold_ms)
    }

    /// Banded cue for the current score.
    pub fn form_feedback(&self) -> &'static str {
        if !self.is_holding {
            "Get in position"
        } else if self.form_score >= MAX_FORM_SCORE {
            "Perfect! 🔥"
        } else if self.form_score >= 7.5 {
            "Great form! 👍"
        } else if self.form_score >= 5.0 {
            "Good! Keep straight"
        } else {
            "Adjust form"
        }
    }

    pub fn status(&self) -> HoldStatus {
        HoldStatus {
            is_holding: self.is_holding,
            current_hold_ms: self.current_hold_ms,
            best_hold_ms: self.best_hold_ms,
            form_score: self.form_score,
            formatted: self.current_time_formatted(),
        }
    }
}

/// Milliseconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_mm_ss(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ANGLE_UNDEFINED;
    use approx::assert_abs_diff_eq;

    fn plank() -> HoldTracker {
        HoldTracker::new(HoldTrackerConfig::new(160.0, 180.0).unwrap())
    }

    #[test]
    fn test_accumulates_between_valid_frames() {
        let mut tracker = plank();
        tracker.update(170.0, 10_000);
        assert!(tracker.is_holding());
        assert_eq!(tracker.current_hold_ms(), 0);

        tracker.update(172.0, 11_000);
        tracker.update(175.0, 12_000);
        assert_eq!(tracker.current_hold_ms(), 2000);
    }

    #[test]
    fn test_break_commits_best_and_clears_current() {
        let mut tracker = plank();
        tracker.update(170.0, 0);
        tracker.update(172.0, 1000);
        tracker.update(175.0, 2000);
        tracker.update(150.0, 3000);

        assert!(!tracker.is_holding());
        assert_eq!(tracker.current_hold_ms(), 0);
        assert_eq!(tracker.best_hold_ms(), 2000);
    }

    #[test]
    fn test_best_hold_is_monotonic() {
        let mut tracker = plank();
        tracker.update(170.0, 0);
        tracker.update(170.0, 3000);
        tracker.update(100.0, 3500);
        tracker.update(170.0, 4000);
        tracker.update(170.0, 5000);
        tracker.update(100.0, 5500);

        assert_eq!(tracker.best_hold_ms(), 3000);
    }

    #[test]
    fn test_undefined_angle_breaks_hold() {
        let mut tracker = plank();
        tracker.update(170.0, 0);
        tracker.update(170.0, 1000);
        tracker.update(ANGLE_UNDEFINED, 2000);
        assert!(!tracker.is_holding());
        assert_eq!(tracker.current_hold_ms(), 0);
        assert_eq!(tracker.best_hold_ms(), 1000);
    }

    #[test]
    fn test_first_frame_after_break_adds_no_time() {
        let mut tracker = plank();
        tracker.update(170.0, 0);
        tracker.update(120.0, 500);
        tracker.update(170.0, 5000);
        assert_eq!(tracker.current_hold_ms(), 0);
        tracker.update(170.0, 5400);
        assert_eq!(tracker.current_hold_ms(), 400);
    }

    #[test]
    fn test_backwards_clock_adds_nothing() {
        let mut tracker = plank();
        tracker.update(170.0, 5000);
        tracker.update(170.0, 4000);
        assert_eq!(tracker.current_hold_ms(), 0);
        tracker.update(170.0, 4500);
        assert_eq!(tracker.current_hold_ms(), 500);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let mut tracker = plank();
        tracker.update(170.0, i64::MIN);
        tracker.update(170.0, i64::MAX);
        assert_eq!(tracker.current_hold_ms(), i64::MAX);
        tracker.update(170.0, 0);
        assert_eq!(tracker.current_hold_ms(), i64::MAX);
        tracker.update(170.0, i64::MAX);
        assert_eq!(tracker.current_hold_ms(), i64::MAX);
        tracker.update(120.0, i64::MAX);
        assert_eq!(tracker.best_hold_ms(), i64::MAX);
    }

    #[test]
    fn test_form_score_is_linear_in_band() {
        let mut tracker = plank();
        let expected = [(160.0, 0.0), (165.0, 2.5), (170.0, 5.0), (175.0, 7.5), (180.0, 10.0)];
        for (i, (angle, score)) in expected.iter().enumerate() {
            tracker.update(*angle, i as i64 * 100);
            assert_abs_diff_eq!(tracker.form_score(), *score, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let mut tracker = plank();
        tracker.update(160.0, 0);
        assert!(tracker.is_holding());
        tracker.update(180.0, 100);
        assert!(tracker.is_holding());
        tracker.update(180.5, 200);
        assert!(!tracker.is_holding());
    }

    #[test]
    fn test_form_feedback_bands() {
        let mut tracker = plank();
        assert_eq!(tracker.form_feedback(), "Get in position");

        tracker.update(180.0, 0);
        assert_eq!(tracker.form_feedback(), "Perfect! 🔥");
        tracker.update(175.0, 100);
        assert_eq!(tracker.form_feedback(), "Great form! 👍");
        tracker.update(170.0, 200);
        assert_eq!(tracker.form_feedback(), "Good! Keep straight");
        tracker.update(165.0, 300);
        assert_eq!(tracker.form_feedback(), "Adjust form");

        tracker.update(90.0, 400);
        assert_eq!(tracker.form_feedback(), "Get in position");
        assert_eq!(tracker.form_score(), 0.0);
    }

    #[test]
    fn test_formatted_time() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(59_999), "00:59");
        assert_eq!(format_mm_ss(61_000), "01:01");
        assert_eq!(format_mm_ss(3_600_000), "60:00");

        let mut tracker = plank();
        tracker.update(170.0, 0);
        tracker.update(170.0, 75_500);
        assert_eq!(tracker.current_time_formatted(), "01:15");
    }

    #[test]
    fn test_reset() {
        let mut tracker = plank();
        tracker.update(170.0, 0);
        tracker.update(170.0, 1000);
        tracker.update(10.0, 2000);
        tracker.update(170.0, 3000);
        tracker.reset();

        assert!(!tracker.is_holding());
        assert_eq!(tracker.current_hold_ms(), 0);
        assert_eq!(tracker.best_hold_ms(), 0);
        assert_eq!(tracker.form_score(), 0.0);
    }

    #[test]
    fn test_longest_hold_includes_in_progress() {
        let mut tracker = plank();
        tracker.update(170.0, 0);
        tracker.update(170.0, 4000);
        assert_eq!(tracker.best_hold_ms(), 0);
        assert_eq!(tracker.longest_hold_ms(), 4000);
    }

    #[test]
    fn test_rejects_empty_band() {
        assert!(HoldTrackerConfig::new(170.0, 170.0).is_err());
        assert!(HoldTrackerConfig::new(180.0, 160.0).is_err());
        assert_eq!(
            HoldTrackerConfig::new(170.0, 170.0).unwrap_err(),
            ConfigError::EmptyHoldBand { min: 170.0, max: 170.0 }
        );
    }
}
