//! Repetition counting from a single joint angle.
//!
//! A two-threshold state machine with a hysteresis band. Angles between the
//! thresholds never change state, which keeps noise near a boundary from
//! toggling the phase. A repetition is counted only when the state moves from
//! `Down` to `Up`, i.e. on completion of a full cycle.
//!
//! Two policies, fixed at construction:
//! - flexion (push-up, squat): `Down` is the small angle, `Up` the large one.
//! - extension / inverted (curl, sit-up): `Down` is the large angle (limb
//!   extended, at rest), `Up` the small one (contracted).

use tracing::debug;

use crate::error::ConfigError;
use crate::types::{is_valid_angle, ExerciseState, ExerciseType};

/// Immutable thresholds and policy for one exercise's counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepCounterConfig {
    down_threshold: f32,
    up_threshold: f32,
    exercise: ExerciseType,
    inverted: bool,
}

impl RepCounterConfig {
    /// Validate and build a config.
    ///
    /// Flexion counters need `down < up`; inverted counters need `up < down`.
    /// Both thresholds must lie in [0, 180].
    pub fn new(
        exercise: ExerciseType,
        down_threshold: f32,
        up_threshold: f32,
        inverted: bool,
    ) -> Result<Self, ConfigError> {
        let in_range = |t: f32| t.is_finite() && (0.0..=180.0).contains(&t);
        let ordered = if inverted {
            up_threshold < down_threshold
        } else {
            down_threshold < up_threshold
        };

        if !in_range(down_threshold) || !in_range(up_threshold) || !ordered {
            return Err(ConfigError::InvalidThresholds {
                exercise,
                down: down_threshold,
                up: up_threshold,
                inverted,
            });
        }

        Ok(Self {
            down_threshold,
            up_threshold,
            exercise,
            inverted,
        })
    }

    /// Flexion policy: down is the smaller angle.
    pub fn flexion(exercise: ExerciseType, down_threshold: f32, up_threshold: f32) -> Result<Self, ConfigError> {
        Self::new(exercise, down_threshold, up_threshold, false)
    }

    /// Extension policy: down is the larger angle.
    pub fn extension(exercise: ExerciseType, down_threshold: f32, up_threshold: f32) -> Result<Self, ConfigError> {
        Self::new(exercise, down_threshold, up_threshold, true)
    }

    pub fn down_threshold(&self) -> f32 {
        self.down_threshold
    }

    pub fn up_threshold(&self) -> f32 {
        self.up_threshold
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// State implied by `angle`, or `None` inside the hysteresis band.
    fn classify(&self, angle: f32) -> Option<ExerciseState> {
        if self.inverted {
            if angle >= self.down_threshold {
                Some(ExerciseState::Down)
            } else if angle <= self.up_threshold {
                Some(ExerciseState::Up)
            } else {
                None
            }
        } else if angle >= self.up_threshold {
            Some(ExerciseState::Up)
        } else if angle <= self.down_threshold {
            Some(ExerciseState::Down)
        } else {
            None
        }
    }
}

/// Cyclic Up/Down counter for one exercise instance.
#[derive(Debug, Clone)]
pub struct RepCounter {
    config: RepCounterConfig,
    state: ExerciseState,
    count: u32,
}

impl RepCounter {
    pub fn new(config: RepCounterConfig) -> Self {
        Self {
            config,
            state: ExerciseState::Unknown,
            count: 0,
        }
    }

    /// Feed one angle sample. Returns true iff this sample completed a repetition.
    ///
    /// Negative (undefined) and non-finite angles are ignored.
    pub fn update(&mut self, angle: f32) -> bool {
        if !is_valid_angle(angle) {
            return false;
        }

        let Some(next) = self.config.classify(angle) else {
            return false;
        };
        if next == self.state {
            return false;
        }

        let completed = self.state == ExerciseState::Down && next == ExerciseState::Up;
        self.state = next;
        if completed {
            self.count += 1;
            debug!(
                exercise = %self.config.exercise,
                count = self.count,
                angle,
                "repetition completed"
            );
        }
        completed
    }

    /// Back to `Unknown` with a zero count. Any in-progress cycle is discarded.
    pub fn reset(&mut self) {
        self.state = ExerciseState::Unknown;
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state(&self) -> ExerciseState {
        self.state
    }

    /// "Ready", "Up" or "Down".
    pub fn state_display(&self) -> &'static str {
        self.state.display_name()
    }

    pub fn config(&self) -> &RepCounterConfig {
        &self.config
    }
}
