//! Per-frame exercise analysis.
//!
//! The analyzer turns one detected pose into one [`ExerciseResult`]:
//!
//! 1. **Extract** the landmark chains the active exercise needs, per side.
//!    A side is usable only if every landmark in its chain meets the
//!    confidence floor; with no usable side the frame is skipped without
//!    touching any state.
//! 2. **Measure** the driving joint angle per side and average the usable
//!    sides.
//! 3. **Check form** with the pure rules in [`crate::form_rules`].
//! 4. **Count** by feeding the angle to the exercise's [`RepCounter`], or to
//!    the [`HoldTracker`] for hold exercises.
//!
//! Form and counting are independent: bad form is reported but never blocks
//! a repetition.
//!
//! Each rep exercise owns its own counter. Switching away from an exercise
//! resets that exercise's counter, discarding any half-finished cycle; the
//! other counters are untouched.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::angles::average_bilateral;
use crate::config::AnalyzerConfig;
use crate::error::ConfigError;
use crate::form_rules::{
    curl_issues, merge_issues, plank_issues, push_up_issues, sit_up_issues, squat_issues, ArmChain,
    BodyLine, LegChain, GOOD_FORM,
};
use crate::hold_tracker::HoldTracker;
use crate::rep_counter::RepCounter;
use crate::types::{
    ExerciseResult, ExerciseState, ExerciseType, FormFeedback, FormIssue, Pose, Side,
    ANGLE_UNDEFINED,
};

/// Angle and form issues measured from one frame.
#[derive(Debug, Clone, PartialEq)]
struct Measurement {
    angle: f32,
    issues: Vec<FormIssue>,
}

/// Orchestrates counting and form feedback for the active exercise.
#[derive(Debug, Clone)]
pub struct FormAnalyzer {
    min_confidence: f32,
    active: ExerciseType,
    counters: HashMap<ExerciseType, RepCounter>,
    hold: HoldTracker,
}

impl FormAnalyzer {
    /// Build an analyzer with one counter per rep exercise.
    pub fn new(config: &AnalyzerConfig, exercise: ExerciseType) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut counters = HashMap::new();
        for candidate in ExerciseType::ALL {
            if candidate.is_hold() {
                continue;
            }
            counters.insert(candidate, RepCounter::new(config.counter_config(candidate)?));
        }

        Ok(Self {
            min_confidence: config.min_confidence,
            active: exercise,
            counters,
            hold: HoldTracker::new(config.hold_config()?),
        })
    }

    /// Analyzer with the default tuning.
    pub fn with_defaults(exercise: ExerciseType) -> Result<Self, ConfigError> {
        Self::new(&AnalyzerConfig::default(), exercise)
    }

    /// Analyze one frame. Returns `None` when the frame was skipped.
    pub fn analyze(&mut self, pose: &Pose, timestamp_ms: i64) -> Option<ExerciseResult> {
        let Some(measurement) = self.measure(pose) else {
            trace!(
                exercise = %self.active,
                timestamp_ms,
                detected = pose.detected_count(),
                "frame skipped: landmarks missing or low confidence"
            );
            return None;
        };

        let result = if self.active.is_hold() {
            self.apply_hold(measurement, timestamp_ms)
        } else {
            self.apply_reps(measurement)
        };
        Some(result)
    }

    /// Make `exercise` active. Leaving an exercise resets its counter.
    pub fn set_exercise(&mut self, exercise: ExerciseType) {
        if exercise == self.active {
            return;
        }
        debug!(from = %self.active, to = %exercise, "switching exercise");
        self.reset();
        self.active = exercise;
    }

    /// Reset the active exercise's counter or hold tracker.
    pub fn reset(&mut self) {
        if self.active.is_hold() {
            self.hold.reset();
        } else if let Some(counter) = self.counters.get_mut(&self.active) {
            counter.reset();
        }
    }

    pub fn active_exercise(&self) -> ExerciseType {
        self.active
    }

    /// Repetitions of the active exercise; whole held seconds for hold exercises.
    pub fn rep_count(&self) -> u32 {
        if self.active.is_hold() {
            hold_seconds(&self.hold)
        } else {
            self.counter(self.active).map_or(0, RepCounter::count)
        }
    }

    /// State of the active exercise's counter (`Unknown` for hold exercises).
    pub fn state(&self) -> ExerciseState {
        self.counter(self.active)
            .map_or(ExerciseState::Unknown, RepCounter::state)
    }

    pub fn counter(&self, exercise: ExerciseType) -> Option<&RepCounter> {
        self.counters.get(&exercise)
    }

    pub fn hold_tracker(&self) -> &HoldTracker {
        &self.hold
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn measure(&self, pose: &Pose) -> Option<Measurement> {
        let c = self.min_confidence;
        match self.active {
            ExerciseType::Squat => measure_sides(|side| {
                LegChain::extract(pose, side, c).map(|leg| (leg.knee_angle(), squat_issues(&leg)))
            }),
            ExerciseType::PushUp => measure_sides(|side| {
                let arm = ArmChain::extract(pose, side, c)?;
                let body = BodyLine::extract(pose, side, c)?;
                Some((arm.elbow_angle(), push_up_issues(&arm, &body)))
            }),
            ExerciseType::SitUp => measure_sides(|side| {
                LegChain::extract(pose, side, c).map(|leg| (leg.hip_angle(), sit_up_issues(&leg)))
            }),
            ExerciseType::BicepCurl => measure_sides(|side| {
                ArmChain::extract(pose, side, c).map(|arm| (arm.elbow_angle(), curl_issues(&arm)))
            }),
            ExerciseType::Plank => {
                let min_angle = self.hold.config().min_valid_angle();
                measure_sides(|side| {
                    BodyLine::extract(pose, side, c)
                        .map(|body| (body.angle(), plank_issues(&body, min_angle)))
                })
            }
        }
    }

    fn apply_reps(&mut self, measurement: Measurement) -> ExerciseResult {
        let exercise = self.active;
        let (rep_completed, rep_count, state) = match self.counters.get_mut(&exercise) {
            Some(counter) => {
                let completed = counter.update(measurement.angle);
                (completed, counter.count(), counter.state())
            }
            None => (false, 0, ExerciseState::Unknown),
        };

        ExerciseResult {
            exercise,
            exercise_name: exercise.display_name().to_string(),
            rep_count,
            rep_completed,
            state,
            angle: measurement.angle,
            form_feedback: FormFeedback::from_issues(&measurement.issues, GOOD_FORM),
            hold: None,
        }
    }

    fn apply_hold(&mut self, measurement: Measurement, timestamp_ms: i64) -> ExerciseResult {
        self.hold.update(measurement.angle, timestamp_ms);

        let form_feedback = if measurement.issues.is_empty() {
            FormFeedback {
                is_correct: self.hold.is_holding(),
                message: self.hold.form_feedback().to_string(),
                flagged_joints: Vec::new(),
            }
        } else {
            FormFeedback::from_issues(&measurement.issues, GOOD_FORM)
        };

        ExerciseResult {
            exercise: self.active,
            exercise_name: self.active.display_name().to_string(),
            rep_count: hold_seconds(&self.hold),
            rep_completed: false,
            state: ExerciseState::Unknown,
            angle: measurement.angle,
            form_feedback,
            hold: Some(self.hold.status()),
        }
    }
}

/// Run a per-side measurement on both sides and combine what is usable.
fn measure_sides<F>(measure: F) -> Option<Measurement>
where
    F: Fn(Side) -> Option<(f32, Vec<FormIssue>)>,
{
    let [left, right] = Side::BOTH.map(measure);
    if left.is_none() && right.is_none() {
        return None;
    }

    let angle_of = |m: &Option<(f32, Vec<FormIssue>)>| m.as_ref().map_or(ANGLE_UNDEFINED, |(a, _)| *a);
    let angle = average_bilateral(angle_of(&left), angle_of(&right));
    let issues = merge_issues([left, right].into_iter().flatten().map(|(_, issues)| issues));

    Some(Measurement { angle, issues })
}

fn hold_seconds(hold: &HoldTracker) -> u32 {
    u32::try_from(hold.current_hold_ms() / 1000).unwrap_or(u32::MAX)
}
