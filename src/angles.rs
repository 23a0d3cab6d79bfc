//! Joint angle geometry.
//!
//! The angle at a joint is measured between the rays `mid -> first` and
//! `mid -> last`, as the difference of their `atan2` headings, folded into
//! [0, 180] degrees.
//!
//! Overlapping rays (`first` and `last` in the same direction from `mid`, or
//! either coinciding with `mid`) are a singularity: depending on rounding the
//! heading difference lands near 0 or near 360, so the result is near 0 or
//! near 180. Callers must not rely on which.

use crate::types::{is_valid_angle, LandmarkPoint, Point2, Pose, Landmark, ANGLE_UNDEFINED};

/// Unsigned angle at `mid` between `mid -> first` and `mid -> last`, in degrees [0, 180].
///
/// Symmetric in `first` and `last`.
pub fn calculate_angle(first: Point2, mid: Point2, last: Point2) -> f32 {
    let radians = (last.y - mid.y).atan2(last.x - mid.x) - (first.y - mid.y).atan2(first.x - mid.x);
    let mut angle = radians.abs().to_degrees();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle.clamp(0.0, 180.0)
}

/// Confidence-gated angle between three optional landmarks.
///
/// Returns [`ANGLE_UNDEFINED`] without computing anything if any landmark is
/// absent or below `min_confidence`.
pub fn landmark_angle(
    first: Option<&LandmarkPoint>,
    mid: Option<&LandmarkPoint>,
    last: Option<&LandmarkPoint>,
    min_confidence: f32,
) -> f32 {
    match (first, mid, last) {
        (Some(a), Some(b), Some(c))
            if a.is_confident(min_confidence)
                && b.is_confident(min_confidence)
                && c.is_confident(min_confidence) =>
        {
            calculate_angle(a.position(), b.position(), c.position())
        }
        _ => ANGLE_UNDEFINED,
    }
}

/// [`landmark_angle`] looked up by name in a pose.
pub fn pose_angle(
    pose: &Pose,
    first: Landmark,
    mid: Landmark,
    last: Landmark,
    min_confidence: f32,
) -> f32 {
    landmark_angle(pose.get(first), pose.get(mid), pose.get(last), min_confidence)
}

/// Mean of the valid angles among a left/right pair.
///
/// One side occluded falls back to the other; both undefined stays undefined.
pub fn average_bilateral(left: f32, right: f32) -> f32 {
    match (is_valid_angle(left), is_valid_angle(right)) {
        (true, true) => (left + right) / 2.0,
        (true, false) => left,
        (false, true) => right,
        (false, false) => ANGLE_UNDEFINED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(x: f32, y: f32) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_right_angle() {
        let angle = calculate_angle(p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0));
        assert_abs_diff_eq!(angle, 90.0, epsilon = 0.5);
    }

    #[test]
    fn test_collinear_outward_is_straight() {
        let angle = calculate_angle(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0));
        assert_abs_diff_eq!(angle, 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reflex_difference_is_folded() {
        // Headings of -135 and +135 differ by 270 before folding.
        let angle = calculate_angle(p(-1.0, -1.0), p(0.0, 0.0), p(-1.0, 1.0));
        assert_abs_diff_eq!(angle, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_symmetry() {
        let a = p(0.2, 0.9);
        let b = p(0.4, 0.5);
        let c = p(0.8, 0.6);
        assert_eq!(calculate_angle(a, b, c), calculate_angle(c, b, a));
    }

    #[test]
    fn test_overlapping_rays_near_zero_or_straight() {
        let angle = calculate_angle(p(1.0, 1.0), p(0.0, 0.0), p(2.0, 2.0));
        assert!(angle < 0.5 || angle > 179.5, "got {}", angle);

        let degenerate = calculate_angle(p(0.0, 0.0), p(0.0, 0.0), p(0.0, 0.0));
        assert!(degenerate < 0.5 || degenerate > 179.5, "got {}", degenerate);
    }

    #[test]
    fn test_landmark_angle_requires_all_three() {
        let a = LandmarkPoint::new(0.0, 0.0, 0.9);
        let b = LandmarkPoint::new(0.0, 1.0, 0.9);
        let c = LandmarkPoint::new(1.0, 1.0, 0.9);

        assert_abs_diff_eq!(landmark_angle(Some(&a), Some(&b), Some(&c), 0.7), 90.0, epsilon = 0.5);
        assert_eq!(landmark_angle(None, Some(&b), Some(&c), 0.7), ANGLE_UNDEFINED);
        assert_eq!(landmark_angle(Some(&a), None, Some(&c), 0.7), ANGLE_UNDEFINED);
        assert_eq!(landmark_angle(Some(&a), Some(&b), None, 0.7), ANGLE_UNDEFINED);
    }

    #[test]
    fn test_landmark_angle_gates_on_confidence() {
        let a = LandmarkPoint::new(0.0, 0.0, 0.9);
        let weak = LandmarkPoint::new(0.0, 1.0, 0.5);
        let c = LandmarkPoint::new(1.0, 1.0, 0.9);
        assert_eq!(landmark_angle(Some(&a), Some(&weak), Some(&c), 0.7), ANGLE_UNDEFINED);
        // Threshold is inclusive.
        assert!(landmark_angle(Some(&a), Some(&weak), Some(&c), 0.5) > 0.0);
    }

    #[test]
    fn test_pose_angle_looks_up_landmarks() {
        let pose = Pose::new()
            .with(Landmark::LeftHip, LandmarkPoint::new(0.5, 0.5, 0.9))
            .with(Landmark::LeftKnee, LandmarkPoint::new(0.5, 0.7, 0.9))
            .with(Landmark::LeftAnkle, LandmarkPoint::new(0.5, 0.9, 0.9));
        let angle = pose_angle(&pose, Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle, 0.7);
        assert_abs_diff_eq!(angle, 180.0, epsilon = 1e-3);

        let right = pose_angle(&pose, Landmark::RightHip, Landmark::RightKnee, Landmark::RightAnkle, 0.7);
        assert_eq!(right, ANGLE_UNDEFINED);
    }

    #[test]
    fn test_average_bilateral() {
        assert_eq!(average_bilateral(100.0, 120.0), 110.0);
        assert_eq!(average_bilateral(100.0, ANGLE_UNDEFINED), 100.0);
        assert_eq!(average_bilateral(ANGLE_UNDEFINED, 120.0), 120.0);
        assert_eq!(average_bilateral(ANGLE_UNDEFINED, ANGLE_UNDEFINED), ANGLE_UNDEFINED);
    }
}
