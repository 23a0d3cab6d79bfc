//! Core data types for the motion analysis engine.
//!
//! This module defines the values that flow through the engine: pose
//! landmarks coming in from an external pose estimator, raw accelerometer
//! samples coming in from the platform sensor stack, and the per-frame
//! results handed back to the UI layer.
//!
//! Design principle: if a concept exists, it gets a type. Landmarks are named
//! by an enum rather than a bare index, exercise kinds are an enum rather than
//! a string, and the only untyped escape hatch is [`ANGLE_UNDEFINED`], kept as
//! an explicit sentinel because hosts already speak it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, MotionResult};

/// Sentinel angle meaning "could not be computed" (missing or low-confidence
/// landmarks). Every consumer treats any negative angle as this sentinel.
pub const ANGLE_UNDEFINED: f32 = -1.0;

/// Number of landmarks in a full-body pose (MediaPipe Pose topology).
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Values per landmark in a flat pose buffer: `[x, y, confidence]`.
pub const VALUES_PER_LANDMARK: usize = 3;

/// Returns true if `angle` is a real angle rather than the undefined sentinel.
#[inline]
pub fn is_valid_angle(angle: f32) -> bool {
    angle.is_finite() && angle >= 0.0
}

// ============================================================================
// GEOMETRY AND LANDMARK TYPES
// ============================================================================

/// A point in normalized 2D image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A single detected landmark: 2D position plus detection confidence.
///
/// Produced once per video frame by the external pose estimator. Absence of
/// a landmark is modelled as `Option::None` at the [`Pose`] level, never as a
/// zero-confidence point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Horizontal position, normalized to [0, 1] (left to right).
    pub x: f32,
    /// Vertical position, normalized to [0, 1] (top to bottom).
    pub y: f32,
    /// Detection confidence [0.0, 1.0].
    pub confidence: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Position without the confidence.
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// True when the detection meets `min_confidence` (inclusive).
    pub fn is_confident(&self, min_confidence: f32) -> bool {
        self.confidence >= min_confidence
    }
}

impl From<LandmarkPoint> for Point2 {
    fn from(point: LandmarkPoint) -> Self {
        point.position()
    }
}

/// Body side, used to pair left/right landmarks for bilateral averaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn shoulder(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftShoulder,
            Side::Right => Landmark::RightShoulder,
        }
    }

    pub fn elbow(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftElbow,
            Side::Right => Landmark::RightElbow,
        }
    }

    pub fn wrist(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftWrist,
            Side::Right => Landmark::RightWrist,
        }
    }

    pub fn hip(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftHip,
            Side::Right => Landmark::RightHip,
        }
    }

    pub fn knee(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftKnee,
            Side::Right => Landmark::RightKnee,
        }
    }

    pub fn ankle(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftAnkle,
            Side::Right => Landmark::RightAnkle,
        }
    }
}

/// Named anatomical landmark, indexed like the MediaPipe Pose model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Landmark {
    /// All landmarks in index order.
    pub const ALL: [Landmark; POSE_LANDMARK_COUNT] = [
        Landmark::Nose,
        Landmark::LeftEyeInner,
        Landmark::LeftEye,
        Landmark::LeftEyeOuter,
        Landmark::RightEyeInner,
        Landmark::RightEye,
        Landmark::RightEyeOuter,
        Landmark::LeftEar,
        Landmark::RightEar,
        Landmark::MouthLeft,
        Landmark::MouthRight,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftPinky,
        Landmark::RightPinky,
        Landmark::LeftIndex,
        Landmark::RightIndex,
        Landmark::LeftThumb,
        Landmark::RightThumb,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
        Landmark::LeftHeel,
        Landmark::RightHeel,
        Landmark::LeftFootIndex,
        Landmark::RightFootIndex,
    ];

    /// Position of this landmark in a pose buffer.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a landmark by its pose-buffer index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A full-body pose for one video frame.
///
/// Undetected landmarks are `None`. The pose is a plain value: the analyzer
/// never keeps a reference to it past a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    landmarks: [Option<LandmarkPoint>; POSE_LANDMARK_COUNT],
}

impl Default for Pose {
    fn default() -> Self {
        Self::new()
    }
}

impl Pose {
    /// Create a pose with no detected landmarks.
    pub fn new() -> Self {
        Self {
            landmarks: [None; POSE_LANDMARK_COUNT],
        }
    }

    /// Build a pose from a flat `[x, y, confidence]` buffer of 33 landmarks.
    ///
    /// A confidence of zero or less (or a non-finite value anywhere in the
    /// triple) marks the landmark as not detected.
    pub fn from_flat(data: &[f32]) -> MotionResult<Self> {
        let expected = POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK;
        if data.len() != expected {
            return Err(MotionError::InvalidPose {
                expected,
                actual: data.len(),
            });
        }

        let mut pose = Self::new();
        for (slot, chunk) in pose
            .landmarks
            .iter_mut()
            .zip(data.chunks_exact(VALUES_PER_LANDMARK))
        {
            let (x, y, confidence) = (chunk[0], chunk[1], chunk[2]);
            let finite = x.is_finite() && y.is_finite() && confidence.is_finite();
            if finite && confidence > 0.0 {
                *slot = Some(LandmarkPoint::new(x, y, confidence));
            }
        }
        Ok(pose)
    }

    /// Builder-style setter.
    pub fn with(mut self, landmark: Landmark, point: LandmarkPoint) -> Self {
        self.set(landmark, point);
        self
    }

    pub fn set(&mut self, landmark: Landmark, point: LandmarkPoint) {
        self.landmarks[landmark.index()] = Some(point);
    }

    pub fn clear(&mut self, landmark: Landmark) {
        self.landmarks[landmark.index()] = None;
    }

    pub fn get(&self, landmark: Landmark) -> Option<&LandmarkPoint> {
        self.landmarks[landmark.index()].as_ref()
    }

    /// The landmark's position, only if detected with at least `min_confidence`.
    pub fn confident_position(&self, landmark: Landmark, min_confidence: f32) -> Option<Point2> {
        self.get(landmark)
            .filter(|p| p.is_confident(min_confidence))
            .map(LandmarkPoint::position)
    }

    /// Number of detected landmarks.
    pub fn detected_count(&self) -> usize {
        self.landmarks.iter().filter(|l| l.is_some()).count()
    }
}

// ============================================================================
// ACCELEROMETER TYPES
// ============================================================================

/// A single raw accelerometer reading.
///
/// Arrives at sensor rate (tens of Hz). Gravity is still included; the step
/// filter separates it out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Acceleration along x in m/s².
    pub x: f32,
    /// Acceleration along y in m/s².
    pub y: f32,
    /// Acceleration along z in m/s².
    pub z: f32,
    /// Sensor timestamp in milliseconds. Expected to be monotonic but not trusted to be.
    pub timestamp_ms: i64,
}

impl MotionSample {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ms: i64) -> Self {
        Self { x, y, z, timestamp_ms }
    }

    pub fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// A counted step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Timestamp of the sample that fired the step.
    pub timestamp_ms: i64,
    /// Total steps counted by the filter, including this one.
    pub step_count: u32,
    /// Smoothed linear-acceleration magnitude at the crossing (m/s²).
    pub magnitude: f64,
    /// Current cadence estimate in steps per second (0 until two steps are seen).
    pub cadence_hz: f32,
}

// ============================================================================
// EXERCISE TYPES
// ============================================================================

/// Supported exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Squat,
    PushUp,
    SitUp,
    BicepCurl,
    /// Isometric hold; tracked by time rather than repetitions.
    Plank,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 5] = [
        ExerciseType::Squat,
        ExerciseType::PushUp,
        ExerciseType::SitUp,
        ExerciseType::BicepCurl,
        ExerciseType::Plank,
    ];

    /// Human-readable name shown in the UI.
    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseType::Squat => "Squat",
            ExerciseType::PushUp => "Push-up",
            ExerciseType::SitUp => "Sit-up",
            ExerciseType::BicepCurl => "Bicep Curl",
            ExerciseType::Plank => "Plank",
        }
    }

    /// True for exercises scored by hold time instead of repetitions.
    pub fn is_hold(self) -> bool {
        matches!(self, ExerciseType::Plank)
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Phase of a repetition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseState {
    /// No threshold crossed yet since construction or reset.
    #[default]
    Unknown,
    Up,
    Down,
}

impl ExerciseState {
    /// Label shown to the user.
    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseState::Unknown => "Ready",
            ExerciseState::Up => "Up",
            ExerciseState::Down => "Down",
        }
    }
}

impl fmt::Display for ExerciseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// FEEDBACK AND RESULT TYPES
// ============================================================================

/// A single form problem found by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormIssue {
    /// Corrective cue for the user.
    pub message: String,
    /// Landmarks the UI should highlight.
    pub joints: Vec<Landmark>,
}

impl FormIssue {
    pub fn new(message: impl Into<String>, joints: Vec<Landmark>) -> Self {
        Self {
            message: message.into(),
            joints,
        }
    }
}

/// Qualitative form feedback for one analyzed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFeedback {
    pub is_correct: bool,
    pub message: String,
    /// Union of all joints flagged by any rule, in index order.
    pub flagged_joints: Vec<Landmark>,
}

impl FormFeedback {
    /// Feedback with nothing to correct.
    pub fn correct(message: impl Into<String>) -> Self {
        Self {
            is_correct: true,
            message: message.into(),
            flagged_joints: Vec::new(),
        }
    }

    /// Fold rule output into one feedback value.
    ///
    /// Issues are expected in rule-priority order: the first issue supplies
    /// the message, every issue contributes its joints.
    pub fn from_issues(issues: &[FormIssue], correct_message: &str) -> Self {
        let Some(first) = issues.first() else {
            return Self::correct(correct_message);
        };

        let mut flagged_joints: Vec<Landmark> = issues
            .iter()
            .flat_map(|issue| issue.joints.iter().copied())
            .collect();
        flagged_joints.sort();
        flagged_joints.dedup();

        Self {
            is_correct: false,
            message: first.message.clone(),
            flagged_joints,
        }
    }
}

/// Live state of a hold exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldStatus {
    pub is_holding: bool,
    pub current_hold_ms: i64,
    pub best_hold_ms: i64,
    /// 0 to 10; 0 while not holding.
    pub form_score: f32,
    /// Current hold as `MM:SS`.
    pub formatted: String,
}

/// Per-frame analysis output handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResult {
    pub exercise: ExerciseType,
    pub exercise_name: String,
    /// Completed repetitions; whole seconds of the current hold for hold exercises.
    pub rep_count: u32,
    /// True only on the frame that completed a repetition (haptics edge).
    pub rep_completed: bool,
    pub state: ExerciseState,
    /// The (bilaterally averaged) driving angle in degrees.
    pub angle: f32,
    pub form_feedback: FormFeedback,
    /// Present for hold exercises only.
    pub hold: Option<HoldStatus>,
}

/// Totals for one finished workout, ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub exercise: ExerciseType,
    /// Completed repetitions (0 for hold exercises).
    pub total_reps: u32,
    /// First to last analyzed frame.
    pub duration_ms: i64,
    /// Time spent inside the hold band across all holds.
    pub total_hold_ms: i64,
    pub best_hold_ms: i64,
    pub estimated_calories: f64,
}

// ============================================================================
// TESTS
// ============================================================================
