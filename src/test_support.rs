//! Synthetic sensor streams and poses shared by the test modules.

use crate::types::{LandmarkPoint, MotionSample, Point2, Pose, Side};

pub const SAMPLE_INTERVAL_MS: i64 = 20; // 50Hz
pub const GRAVITY: f32 = 9.81;
pub const CONFIDENCE: f32 = 0.9;

/// Phone at rest long enough for the gravity estimate to settle.
pub fn rest(start_ms: i64, duration_ms: i64) -> Vec<MotionSample> {
    (0..duration_ms / SAMPLE_INTERVAL_MS)
        .map(|i| MotionSample::new(0.0, 0.0, GRAVITY, start_ms + i * SAMPLE_INTERVAL_MS))
        .collect()
}

/// Three-sample vertical jolt of +10 m/s² per spike, one spike every `period_ms`,
/// after a two second settling period and followed by one second of rest.
pub fn spike_train(spikes: usize, period_ms: i64) -> Vec<MotionSample> {
    let mut samples = rest(0, 2000);
    let mut t = 2000;
    for _ in 0..spikes {
        for i in 0..(period_ms / SAMPLE_INTERVAL_MS) {
            let z = if i < 3 { GRAVITY + 10.0 } else { GRAVITY };
            samples.push(MotionSample::new(0.0, 0.0, z, t));
            t += SAMPLE_INTERVAL_MS;
        }
    }
    samples.extend(rest(t, 1000));
    samples
}

fn put_both_sides(pose: &mut Pose, landmark: fn(Side) -> crate::types::Landmark, at: Point2) {
    for side in Side::BOTH {
        pose.set(landmark(side), LandmarkPoint::new(at.x, at.y, CONFIDENCE));
    }
}

/// Side-view squat with the requested knee angle: knee stacked over the
/// ankle, torso vertical above the hip. Triggers no form rule.
pub fn squat_pose(knee_angle_deg: f32) -> Pose {
    let ankle = Point2::new(0.5, 0.9);
    let knee = Point2::new(0.5, 0.7);
    let theta = knee_angle_deg.to_radians();
    let hip = Point2::new(knee.x + 0.2 * theta.sin(), knee.y + 0.2 * theta.cos());
    let shoulder = Point2::new(hip.x, hip.y - 0.25);

    let mut pose = Pose::new();
    put_both_sides(&mut pose, Side::ankle, ankle);
    put_both_sides(&mut pose, Side::knee, knee);
    put_both_sides(&mut pose, Side::hip, hip);
    put_both_sides(&mut pose, Side::shoulder, shoulder);
    pose
}

/// Standing curl with the requested elbow angle, upper arm pinned vertical.
pub fn curl_pose(elbow_angle_deg: f32) -> Pose {
    let shoulder = Point2::new(0.5, 0.3);
    let elbow = Point2::new(0.5, 0.45);
    let hip = Point2::new(0.5, 0.6);
    // Forearm rotated away from the elbow->shoulder ray by the elbow angle.
    let theta = elbow_angle_deg.to_radians();
    let wrist = Point2::new(elbow.x - 0.15 * theta.sin(), elbow.y - 0.15 * theta.cos());

    let mut pose = Pose::new();
    put_both_sides(&mut pose, Side::shoulder, shoulder);
    put_both_sides(&mut pose, Side::elbow, elbow);
    put_both_sides(&mut pose, Side::wrist, wrist);
    put_both_sides(&mut pose, Side::hip, hip);
    pose
}

/// Side-view plank: shoulder and ankle level, hip lowered by `sag`.
pub fn plank_pose(sag: f32) -> Pose {
    let mut pose = Pose::new();
    put_both_sides(&mut pose, Side::shoulder, Point2::new(0.2, 0.5));
    put_both_sides(&mut pose, Side::hip, Point2::new(0.5, 0.5 + sag));
    put_both_sides(&mut pose, Side::ankle, Point2::new(0.8, 0.5));
    pose
}

/// Side-view push-up with straight body and hands under the shoulders.
/// `depth` in [0, 1] bends the elbow from straight (0) to deep (1).
pub fn push_up_pose(depth: f32) -> Pose {
    let shoulder = Point2::new(0.2, 0.5);
    let wrist = Point2::new(0.2, 0.7);
    // Elbow pushed backwards along the body as the arm bends.
    let elbow = Point2::new(0.2 + 0.1 * depth, 0.6);

    let mut pose = Pose::new();
    put_both_sides(&mut pose, Side::shoulder, shoulder);
    put_both_sides(&mut pose, Side::elbow, elbow);
    put_both_sides(&mut pose, Side::wrist, wrist);
    put_both_sides(&mut pose, Side::hip, Point2::new(0.5, 0.5));
    put_both_sides(&mut pose, Side::ankle, Point2::new(0.8, 0.5));
    pose
}
