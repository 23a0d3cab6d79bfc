//! Motion Engine Library
//!
//! Real-time motion analysis for fitness tracking. The engine turns two raw
//! streams into live, user-facing values:
//!
//! - **Accelerometer samples** become counted steps, a motion magnitude and
//!   a cadence estimate ([`StepFilter`], wrapped per session by [`StepSession`]).
//! - **Pose landmarks** from an external pose estimator become joint angles,
//!   repetition counts, hold times and form feedback ([`FormAnalyzer`]).
//!
//! Persisted daily step totals feed a separate batch calculation of goal
//! streaks ([`StreakEngine`]).
//!
//! # Design Philosophy
//!
//! - **Drop, don't fail**: a missing landmark or a clock going backwards skips
//!   the current sample. Only construction with a bad configuration errors.
//! - **Feedback is not a gate**: bad form is reported but never blocks a rep.
//! - **Owned state**: every counter, tracker and filter lives in a value the
//!   caller owns. No globals, no background tasks, no locks.
//!
//! # Example
//!
//! ```
//! use motion_engine::{FormAnalyzer, ExerciseType, Pose};
//!
//! let mut analyzer = FormAnalyzer::with_defaults(ExerciseType::Squat).unwrap();
//! // An empty frame has no confident landmarks and is skipped.
//! assert!(analyzer.analyze(&Pose::new(), 0).is_none());
//! assert_eq!(analyzer.rep_count(), 0);
//! ```

pub mod angles;
pub mod config;
pub mod error;
pub mod ffi;
pub mod form_analyzer;
pub mod form_rules;
pub mod hold_tracker;
pub mod rep_counter;
pub mod session;
pub mod signal;
pub mod step_detection;
pub mod streak;
pub mod types;

#[cfg(test)]
mod stress_tests;
#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use angles::calculate_angle;
pub use config::{AnalyzerConfig, EngineConfig};
pub use error::{ConfigError, MotionError, MotionResult};
pub use form_analyzer::FormAnalyzer;
pub use hold_tracker::{HoldTracker, HoldTrackerConfig};
pub use rep_counter::{RepCounter, RepCounterConfig};
pub use session::{StepSession, StepSnapshot, WorkoutSession};
pub use step_detection::{StepFilter, StepFilterConfig};
pub use streak::{DailyStepRecord, StreakConfig, StreakEngine, StreakResult};
pub use types::{
    ExerciseResult, ExerciseState, ExerciseType, FormFeedback, HoldStatus, Landmark,
    LandmarkPoint, MotionSample, Point2, Pose, StepEvent, WorkoutSummary, ANGLE_UNDEFINED,
};
