/// Basic usage example: feed accelerometer samples, count steps, then count a few squats
use motion_engine::{
    ExerciseType, FormAnalyzer, LandmarkPoint, MotionSample, Point2, Pose, StepSession,
};
use motion_engine::types::Side;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Motion Engine: Basic Example ===\n");

    // ------------------------------------------------------------------
    // Steps: phone at rest for two seconds, then eight steps at ~1.8Hz
    // ------------------------------------------------------------------
    let mut session = StepSession::with_defaults();
    let mut t = 0i64;
    let mut samples = Vec::new();
    for _ in 0..100 {
        samples.push(MotionSample::new(0.0, 0.0, 9.81, t));
        t += 20;
    }
    for _ in 0..8 {
        for i in 0..28 {
            let z = if i < 3 { 19.8 } else { 9.81 };
            samples.push(MotionSample::new(0.2, 0.1, z, t));
            t += 20;
        }
    }

    println!("Processing {} accelerometer samples...\n", samples.len());
    for sample in &samples {
        if let Some(step) = session.push_sample(sample) {
            println!(
                "  step {:>2} at {:>5}ms  magnitude {:.2} m/s²  cadence {:.2} Hz",
                step.step_count, step.timestamp_ms, step.magnitude, step.cadence_hz
            );
        }
    }
    let snapshot = session.finish();
    println!("\nSteps counted: {}", snapshot.step_count);

    // ------------------------------------------------------------------
    // Squats: knee angle swept 170 -> 90 -> 170 three times
    // ------------------------------------------------------------------
    let mut analyzer = match FormAnalyzer::with_defaults(ExerciseType::Squat) {
        Ok(analyzer) => analyzer,
        Err(err) => {
            eprintln!("invalid analyzer config: {}", err);
            return;
        }
    };

    println!("\nAnalyzing squat frames...\n");
    let mut frame_ms = 0i64;
    for _ in 0..3 {
        for angle in [170.0, 140.0, 110.0, 90.0, 110.0, 140.0, 170.0] {
            if let Some(result) = analyzer.analyze(&squat_pose(angle), frame_ms) {
                println!(
                    "  {:>4}ms  knee {:>5.1}°  {:<5}  reps {}  {}",
                    frame_ms, result.angle, result.state, result.rep_count, result.form_feedback.message
                );
            }
            frame_ms += 100;
        }
    }

    println!("\n=== Summary ===");
    println!("Steps: {}", snapshot.step_count);
    println!("Squats: {}", analyzer.rep_count());
}

/// Side-view squat pose with the given knee angle.
fn squat_pose(knee_angle_deg: f32) -> Pose {
    let ankle = Point2::new(0.5, 0.9);
    let knee = Point2::new(0.5, 0.7);
    let theta = knee_angle_deg.to_radians();
    let hip = Point2::new(knee.x + 0.2 * theta.sin(), knee.y + 0.2 * theta.cos());
    let shoulder = Point2::new(hip.x, hip.y - 0.25);

    let mut pose = Pose::new();
    for side in Side::BOTH {
        for (landmark, at) in [
            (side.ankle(), ankle),
            (side.knee(), knee),
            (side.hip(), hip),
            (side.shoulder(), shoulder),
        ] {
            pose.set(landmark, LandmarkPoint::new(at.x, at.y, 0.95));
        }
    }
    pose
}
