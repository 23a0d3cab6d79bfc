//! Per-exercise form rules.
//!
//! Each rule is a pure function from the confident landmark positions of one
//! body side to a list of [`FormIssue`]s, returned in priority order. Rules
//! never see counter state and never gate counting: a rep done with bad form
//! still counts, the issue is only reported.
//!
//! Thresholds are ratios or angles rather than absolute distances so they
//! hold regardless of how far the user stands from the camera.

use crate::angles::calculate_angle;
use crate::types::{FormIssue, Point2, Pose, Side};

/// Shin lean from vertical beyond which the knee is treated as past the toes (degrees).
pub const MAX_SHIN_LEAN_DEG: f32 = 35.0;
/// Torso lean from vertical allowed in a squat (degrees).
pub const MAX_SQUAT_TORSO_LEAN_DEG: f32 = 45.0;
/// Shoulder-hip-ankle angle below which a push-up body line is broken (degrees).
pub const MIN_PUSH_UP_BODY_LINE_DEG: f32 = 150.0;
/// Horizontal wrist-to-shoulder offset, as a fraction of arm length, allowed in a push-up.
pub const MAX_HAND_OFFSET_RATIO: f32 = 0.35;
/// Knee angle above which sit-up legs count as straight (degrees).
pub const MAX_SIT_UP_KNEE_DEG: f32 = 120.0;
/// Upper-arm swing away from the torso allowed in a curl (degrees).
pub const MAX_CURL_ELBOW_DRIFT_DEG: f32 = 30.0;
/// Torso sway from vertical allowed in a curl (degrees).
pub const MAX_CURL_TORSO_SWAY_DEG: f32 = 20.0;

pub const GOOD_FORM: &str = "Good form! Keep going";

/// Angle between `base -> top` and straight up in image space (y grows downward).
fn lean_from_vertical(top: Point2, base: Point2) -> f32 {
    calculate_angle(top, base, Point2::new(base.x, base.y - 1.0))
}

// ============================================================================
// LANDMARK CHAINS
// ============================================================================

/// Shoulder, hip, knee and ankle of one side. Drives squats and sit-ups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegChain {
    pub side: Side,
    pub shoulder: Point2,
    pub hip: Point2,
    pub knee: Point2,
    pub ankle: Point2,
}

impl LegChain {
    /// `None` unless every landmark of the chain is confidently detected.
    pub fn extract(pose: &Pose, side: Side, min_confidence: f32) -> Option<Self> {
        Some(Self {
            side,
            shoulder: pose.confident_position(side.shoulder(), min_confidence)?,
            hip: pose.confident_position(side.hip(), min_confidence)?,
            knee: pose.confident_position(side.knee(), min_confidence)?,
            ankle: pose.confident_position(side.ankle(), min_confidence)?,
        })
    }

    /// Hip-knee-ankle angle.
    pub fn knee_angle(&self) -> f32 {
        calculate_angle(self.hip, self.knee, self.ankle)
    }

    /// Shoulder-hip-knee angle.
    pub fn hip_angle(&self) -> f32 {
        calculate_angle(self.shoulder, self.hip, self.knee)
    }
}

/// Shoulder, elbow, wrist and hip of one side. Drives curls and push-ups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmChain {
    pub side: Side,
    pub shoulder: Point2,
    pub elbow: Point2,
    pub wrist: Point2,
    pub hip: Point2,
}

impl ArmChain {
    pub fn extract(pose: &Pose, side: Side, min_confidence: f32) -> Option<Self> {
        Some(Self {
            side,
            shoulder: pose.confident_position(side.shoulder(), min_confidence)?,
            elbow: pose.confident_position(side.elbow(), min_confidence)?,
            wrist: pose.confident_position(side.wrist(), min_confidence)?,
            hip: pose.confident_position(side.hip(), min_confidence)?,
        })
    }

    /// Shoulder-elbow-wrist angle.
    pub fn elbow_angle(&self) -> f32 {
        calculate_angle(self.shoulder, self.elbow, self.wrist)
    }

    fn arm_length(&self) -> f32 {
        self.shoulder.distance_to(self.elbow) + self.elbow.distance_to(self.wrist)
    }
}

/// Shoulder, hip and ankle of one side: the straight line of a plank or push-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyLine {
    pub side: Side,
    pub shoulder: Point2,
    pub hip: Point2,
    pub ankle: Point2,
}

impl BodyLine {
    pub fn extract(pose: &Pose, side: Side, min_confidence: f32) -> Option<Self> {
        Some(Self {
            side,
            shoulder: pose.confident_position(side.shoulder(), min_confidence)?,
            hip: pose.confident_position(side.hip(), min_confidence)?,
            ankle: pose.confident_position(side.ankle(), min_confidence)?,
        })
    }

    /// Shoulder-hip-ankle angle; 180 is a perfectly straight body.
    pub fn angle(&self) -> f32 {
        calculate_angle(self.shoulder, self.hip, self.ankle)
    }

    /// Vertical distance of the hip from the shoulder-ankle line.
    ///
    /// Positive when the hip sits below the line (sagging), negative when it
    /// sits above it (piking). Zero for a vertical line.
    pub fn hip_offset(&self) -> f32 {
        let dx = self.ankle.x - self.shoulder.x;
        if dx.abs() < f32::EPSILON {
            return 0.0;
        }
        let t = (self.hip.x - self.shoulder.x) / dx;
        let line_y = self.shoulder.y + t * (self.ankle.y - self.shoulder.y);
        self.hip.y - line_y
    }

    fn hip_issue(&self) -> FormIssue {
        let message = if self.hip_offset() > 0.0 {
            "Lift your hips"
        } else {
            "Lower your hips"
        };
        FormIssue::new(message, vec![self.side.hip()])
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Squat: knees over toes, chest up.
pub fn squat_issues(leg: &LegChain) -> Vec<FormIssue> {
    let mut issues = Vec::new();
    if lean_from_vertical(leg.knee, leg.ankle) > MAX_SHIN_LEAN_DEG {
        issues.push(FormIssue::new(
            "Keep your knees behind your toes",
            vec![leg.side.knee(), leg.side.ankle()],
        ));
    }
    if lean_from_vertical(leg.shoulder, leg.hip) > MAX_SQUAT_TORSO_LEAN_DEG {
        issues.push(FormIssue::new(
            "Keep your chest up",
            vec![leg.side.shoulder(), leg.side.hip()],
        ));
    }
    issues
}

/// Push-up: straight body, hands under shoulders.
pub fn push_up_issues(arm: &ArmChain, body: &BodyLine) -> Vec<FormIssue> {
    let mut issues = Vec::new();
    if body.angle() < MIN_PUSH_UP_BODY_LINE_DEG {
        issues.push(body.hip_issue());
    }
    let arm_length = arm.arm_length();
    if arm_length > f32::EPSILON
        && (arm.wrist.x - arm.shoulder.x).abs() / arm_length > MAX_HAND_OFFSET_RATIO
    {
        issues.push(FormIssue::new(
            "Place your hands under your shoulders",
            vec![arm.side.wrist(), arm.side.shoulder()],
        ));
    }
    issues
}

/// Sit-up: knees stay bent.
pub fn sit_up_issues(leg: &LegChain) -> Vec<FormIssue> {
    if leg.knee_angle() > MAX_SIT_UP_KNEE_DEG {
        vec![FormIssue::new("Bend your knees", vec![leg.side.knee()])]
    } else {
        Vec::new()
    }
}

/// Bicep curl: elbows pinned, no body swing.
pub fn curl_issues(arm: &ArmChain) -> Vec<FormIssue> {
    let mut issues = Vec::new();
    if calculate_angle(arm.hip, arm.shoulder, arm.elbow) > MAX_CURL_ELBOW_DRIFT_DEG {
        issues.push(FormIssue::new(
            "Keep your elbows at your sides",
            vec![arm.side.elbow(), arm.side.shoulder()],
        ));
    }
    if lean_from_vertical(arm.shoulder, arm.hip) > MAX_CURL_TORSO_SWAY_DEG {
        issues.push(FormIssue::new(
            "Don't swing your body",
            vec![arm.side.shoulder(), arm.side.hip()],
        ));
    }
    issues
}

/// Plank: hips neither sagging nor piked. `min_body_angle` is the lower edge
/// of the tracker's valid band.
pub fn plank_issues(body: &BodyLine, min_body_angle: f32) -> Vec<FormIssue> {
    if body.angle() < min_body_angle {
        vec![body.hip_issue()]
    } else {
        Vec::new()
    }
}

/// Merge issues from both sides: same message keeps one entry with the union of joints.
pub fn merge_issues(sides: impl IntoIterator<Item = Vec<FormIssue>>) -> Vec<FormIssue> {
    let mut merged: Vec<FormIssue> = Vec::new();
    for issue in sides.into_iter().flatten() {
        match merged.iter_mut().find(|m| m.message == issue.message) {
            Some(existing) => {
                for joint in issue.joints {
                    if !existing.joints.contains(&joint) {
                        existing.joints.push(joint);
                    }
                }
            }
            None => merged.push(issue),
        }
    }
    merged
}
