//! Engine configuration.
//!
//! [`EngineConfig`] bundles the tunables of every stage. Defaults are the
//! constants the engine was tuned with; a host can override any subset from
//! JSON (missing fields fall back to their defaults) without a rebuild.
//!
//! ```rust
//! use motion_engine::config::EngineConfig;
//!
//! let cfg = EngineConfig::from_json_str(r#"{ "analyzer": { "min_confidence": 0.6 } }"#).unwrap();
//! assert_eq!(cfg.analyzer.min_confidence, 0.6);
//! assert_eq!(cfg.step_filter.min_step_interval_ms, 420);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MotionResult};
use crate::hold_tracker::HoldTrackerConfig;
use crate::rep_counter::RepCounterConfig;
use crate::step_detection::StepFilterConfig;
use crate::streak::StreakConfig;
use crate::types::ExerciseType;

/// Thresholds for one rep-counted exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepThresholds {
    pub down_threshold: f32,
    pub up_threshold: f32,
    /// Extension exercise: down is the larger angle.
    #[serde(default)]
    pub inverted: bool,
}

impl RepThresholds {
    pub fn flexion(down_threshold: f32, up_threshold: f32) -> Self {
        Self {
            down_threshold,
            up_threshold,
            inverted: false,
        }
    }

    pub fn extension(down_threshold: f32, up_threshold: f32) -> Self {
        Self {
            down_threshold,
            up_threshold,
            inverted: true,
        }
    }
}

/// Inclusive valid-angle band for a hold exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldBand {
    pub min_valid_angle: f32,
    pub max_valid_angle: f32,
}

/// Form analyzer tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Landmarks below this confidence are treated as not detected.
    pub min_confidence: f32,
    /// Knee angle (hip-knee-ankle).
    pub squat: RepThresholds,
    /// Elbow angle (shoulder-elbow-wrist).
    pub push_up: RepThresholds,
    /// Hip angle (shoulder-hip-knee).
    pub sit_up: RepThresholds,
    /// Elbow angle (shoulder-elbow-wrist).
    pub bicep_curl: RepThresholds,
    /// Body line angle (shoulder-hip-ankle).
    pub plank: HoldBand,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
            squat: RepThresholds::flexion(100.0, 160.0),
            push_up: RepThresholds::flexion(90.0, 160.0),
            sit_up: RepThresholds::extension(125.0, 75.0),
            bicep_curl: RepThresholds::extension(150.0, 50.0),
            plank: HoldBand {
                min_valid_angle: 160.0,
                max_valid_angle: 180.0,
            },
        }
    }
}

impl AnalyzerConfig {
    /// Thresholds for a rep exercise; `None` for hold exercises.
    pub fn rep_thresholds(&self, exercise: ExerciseType) -> Option<RepThresholds> {
        match exercise {
            ExerciseType::Squat => Some(self.squat),
            ExerciseType::PushUp => Some(self.push_up),
            ExerciseType::SitUp => Some(self.sit_up),
            ExerciseType::BicepCurl => Some(self.bicep_curl),
            ExerciseType::Plank => None,
        }
    }

    /// Validated counter config for a rep exercise.
    pub fn counter_config(&self, exercise: ExerciseType) -> Result<RepCounterConfig, ConfigError> {
        let thresholds = self.rep_thresholds(exercise).ok_or_else(|| {
            ConfigError::invalid_value("exercise", format!("{} is not rep-counted", exercise))
        })?;
        RepCounterConfig::new(
            exercise,
            thresholds.down_threshold,
            thresholds.up_threshold,
            thresholds.inverted,
        )
    }

    /// Validated hold tracker config for the plank band.
    pub fn hold_config(&self) -> Result<HoldTrackerConfig, ConfigError> {
        HoldTrackerConfig::new(self.plank.min_valid_angle, self.plank.max_valid_angle)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::invalid_value(
                "min_confidence",
                format!("{} is outside [0, 1]", self.min_confidence),
            ));
        }
        for exercise in ExerciseType::ALL {
            if self.rep_thresholds(exercise).is_some() {
                self.counter_config(exercise)?;
            }
        }
        self.hold_config()?;
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub step_filter: StepFilterConfig,
    pub analyzer: AnalyzerConfig,
    pub streak: StreakConfig,
}

impl EngineConfig {
    /// Check every section; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.step_filter.validate()?;
        self.analyzer.validate()?;
        self.streak.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> MotionResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> MotionResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> MotionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
