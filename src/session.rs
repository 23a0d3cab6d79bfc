//! Owned tracking sessions.
//!
//! A session scopes all mutable tracking state to one activity: the host
//! creates it when tracking starts, feeds it samples or frames, polls it for
//! live values and drops it (or calls `finish`) when tracking ends. There is
//! no process-wide state; two sessions never share anything.
//!
//! - [`StepSession`] wraps a [`StepFilter`] and exposes a pollable
//!   [`StepSnapshot`] for UI and widget display.
//! - [`WorkoutSession`] wraps a [`FormAnalyzer`] for one exercise and produces
//!   a [`WorkoutSummary`] for persistence when the workout ends.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::error::ConfigError;
use crate::form_analyzer::FormAnalyzer;
use crate::step_detection::{StepFilter, StepFilterConfig};
use crate::types::{ExerciseResult, ExerciseType, MotionSample, Pose, StepEvent, WorkoutSummary};

/// Energy per repetition in kcal.
pub const SQUAT_KCAL_PER_REP: f64 = 0.32;
pub const PUSH_UP_KCAL_PER_REP: f64 = 0.36;
pub const SIT_UP_KCAL_PER_REP: f64 = 0.25;
pub const BICEP_CURL_KCAL_PER_REP: f64 = 0.20;
/// Energy per minute of plank hold in kcal.
pub const PLANK_KCAL_PER_MINUTE: f64 = 4.0;

/// Rough energy estimate for a workout.
pub fn estimate_calories(exercise: ExerciseType, reps: u32, hold_ms: i64) -> f64 {
    let per_rep = match exercise {
        ExerciseType::Squat => SQUAT_KCAL_PER_REP,
        ExerciseType::PushUp => PUSH_UP_KCAL_PER_REP,
        ExerciseType::SitUp => SIT_UP_KCAL_PER_REP,
        ExerciseType::BicepCurl => BICEP_CURL_KCAL_PER_REP,
        ExerciseType::Plank => return hold_ms.max(0) as f64 / 60_000.0 * PLANK_KCAL_PER_MINUTE,
    };
    f64::from(reps) * per_rep
}

// ============================================================================
// STEP SESSION
// ============================================================================

/// Live step-tracking values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub step_count: u32,
    /// Smoothed linear-acceleration magnitude (m/s²).
    pub magnitude: f64,
    pub cadence_hz: f32,
    pub last_step_ms: Option<i64>,
    pub samples_processed: u64,
}

/// Step tracking for one session.
#[derive(Debug, Clone)]
pub struct StepSession {
    filter: StepFilter,
    samples_processed: u64,
}

impl StepSession {
    pub fn new(config: StepFilterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: StepFilter::new(config)?,
            samples_processed: 0,
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            filter: StepFilter::with_defaults(),
            samples_processed: 0,
        }
    }

    /// Feed one accelerometer sample.
    pub fn push_sample(&mut self, sample: &MotionSample) -> Option<StepEvent> {
        self.samples_processed += 1;
        self.filter.process_sample(sample)
    }

    /// Feed a batch of samples and return the steps they fired.
    pub fn push_batch(&mut self, samples: &[MotionSample]) -> Vec<StepEvent> {
        samples
            .iter()
            .filter_map(|sample| self.push_sample(sample))
            .collect()
    }

    pub fn snapshot(&self) -> StepSnapshot {
        StepSnapshot {
            step_count: self.filter.step_count(),
            magnitude: self.filter.current_magnitude(),
            cadence_hz: self.filter.cadence_hz(),
            last_step_ms: self.filter.last_step_ms(),
            samples_processed: self.samples_processed,
        }
    }

    pub fn step_count(&self) -> u32 {
        self.filter.step_count()
    }

    pub fn filter(&self) -> &StepFilter {
        &self.filter
    }

    /// Start over with a zero count.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.samples_processed = 0;
    }

    /// End the session and return its final values.
    pub fn finish(self) -> StepSnapshot {
        let snapshot = self.snapshot();
        info!(
            steps = snapshot.step_count,
            samples = snapshot.samples_processed,
            cadence_hz = snapshot.cadence_hz,
            "step session finished"
        );
        snapshot
    }
}

// ============================================================================
// WORKOUT SESSION
// ============================================================================

/// One workout of a single exercise.
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    analyzer: FormAnalyzer,
    first_frame_ms: Option<i64>,
    last_frame_ms: Option<i64>,
    total_hold_ms: i64,
    last_hold_ms: i64,
    frames_analyzed: u64,
    frames_skipped: u64,
}

impl WorkoutSession {
    pub fn new(config: &AnalyzerConfig, exercise: ExerciseType) -> Result<Self, ConfigError> {
        Ok(Self {
            analyzer: FormAnalyzer::new(config, exercise)?,
            first_frame_ms: None,
            last_frame_ms: None,
            total_hold_ms: 0,
            last_hold_ms: 0,
            frames_analyzed: 0,
            frames_skipped: 0,
        })
    }

    /// Analyze one frame. Skipped frames still extend the workout duration.
    pub fn process_frame(&mut self, pose: &Pose, timestamp_ms: i64) -> Option<ExerciseResult> {
        self.first_frame_ms.get_or_insert(timestamp_ms);
        self.last_frame_ms = Some(self.last_frame_ms.map_or(timestamp_ms, |t| t.max(timestamp_ms)));

        let result = self.analyzer.analyze(pose, timestamp_ms);
        match &result {
            Some(_) => self.frames_analyzed += 1,
            None => self.frames_skipped += 1,
        }

        // The current hold only grows while holding and drops to zero on a break.
        let current = self.analyzer.hold_tracker().current_hold_ms();
        if current >= self.last_hold_ms {
            self.total_hold_ms = self.total_hold_ms.saturating_add(current - self.last_hold_ms);
        }
        self.last_hold_ms = current;

        result
    }

    pub fn exercise(&self) -> ExerciseType {
        self.analyzer.active_exercise()
    }

    pub fn analyzer(&self) -> &FormAnalyzer {
        &self.analyzer
    }

    pub fn frames_analyzed(&self) -> u64 {
        self.frames_analyzed
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    /// Totals so far.
    pub fn summary(&self) -> WorkoutSummary {
        let exercise = self.exercise();
        let total_reps = if exercise.is_hold() {
            0
        } else {
            self.analyzer.rep_count()
        };
        let duration_ms = match (self.first_frame_ms, self.last_frame_ms) {
            (Some(first), Some(last)) => last.saturating_sub(first).max(0),
            _ => 0,
        };

        WorkoutSummary {
            exercise,
            total_reps,
            duration_ms,
            total_hold_ms: self.total_hold_ms,
            best_hold_ms: self.analyzer.hold_tracker().longest_hold_ms(),
            estimated_calories: estimate_calories(exercise, total_reps, self.total_hold_ms),
        }
    }

    /// End the workout and return its summary.
    pub fn finish(self) -> WorkoutSummary {
        let summary = self.summary();
        info!(
            exercise = %summary.exercise,
            reps = summary.total_reps,
            duration_ms = summary.duration_ms,
            best_hold_ms = summary.best_hold_ms,
            kcal = summary.estimated_calories,
            skipped_frames = self.frames_skipped,
            "workout finished"
        );
        summary
    }
}
