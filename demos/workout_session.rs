/// Workout session example: load a config, run a curl set and a plank, print
/// the summaries as JSON and compute a step streak.
use chrono::{Days, NaiveDate};
use motion_engine::types::Side;
use motion_engine::{
    DailyStepRecord, EngineConfig, ExerciseType, LandmarkPoint, MotionResult, Point2, Pose,
    StreakEngine, WorkoutSession,
};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"{
    "analyzer": {
        "min_confidence": 0.6,
        "bicep_curl": { "down_threshold": 145.0, "up_threshold": 55.0, "inverted": true }
    }
}"#;

fn main() -> MotionResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let config = EngineConfig::from_json_str(CONFIG)?;

    // Bicep curls
    let mut curls = WorkoutSession::new(&config.analyzer, ExerciseType::BicepCurl)?;
    let mut t = 0i64;
    for _ in 0..10 {
        for angle in [165.0, 120.0, 80.0, 45.0, 80.0, 120.0, 165.0] {
            curls.process_frame(&curl_pose(angle), t);
            t += 120;
        }
    }
    let curl_summary = curls.finish();
    println!("{}", serde_json::to_string_pretty(&curl_summary)?);

    // Plank: 40s, a sag, then 20s more
    let mut plank = WorkoutSession::new(&config.analyzer, ExerciseType::Plank)?;
    for second in 0..=62 {
        let sag = if (40..42).contains(&second) { 0.2 } else { 0.0 };
        if let Some(result) = plank.process_frame(&plank_pose(sag), second * 1_000) {
            if second % 10 == 0 {
                if let Some(hold) = &result.hold {
                    println!("  {}  score {:.1}  {}", hold.formatted, hold.form_score, result.form_feedback.message);
                }
            }
        }
    }
    let plank_summary = plank.finish();
    println!("{}", serde_json::to_string_pretty(&plank_summary)?);

    // Streak over the last two weeks
    let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap_or_default();
    let records: Vec<DailyStepRecord> = (0..14u64)
        .filter_map(|ago| {
            let date = today.checked_sub_days(Days::new(ago))?;
            let steps = if ago == 6 { 3_200 } else { 9_000 + (ago as i32) * 150 };
            Some(DailyStepRecord::new(date, steps, 8_000))
        })
        .collect();
    let streak = StreakEngine::new(config.streak.clone())?.calculate(&records, 8_000, today);
    println!("{}", serde_json::to_string_pretty(&streak)?);

    Ok(())
}

fn put(pose: &mut Pose, side: Side, landmark: fn(Side) -> motion_engine::Landmark, at: Point2) {
    pose.set(landmark(side), LandmarkPoint::new(at.x, at.y, 0.9));
}

/// Standing curl with the given elbow angle.
fn curl_pose(elbow_angle_deg: f32) -> Pose {
    let shoulder = Point2::new(0.5, 0.3);
    let elbow = Point2::new(0.5, 0.45);
    let theta = elbow_angle_deg.to_radians();
    let wrist = Point2::new(elbow.x - 0.15 * theta.sin(), elbow.y - 0.15 * theta.cos());

    let mut pose = Pose::new();
    for side in Side::BOTH {
        put(&mut pose, side, Side::shoulder, shoulder);
        put(&mut pose, side, Side::elbow, elbow);
        put(&mut pose, side, Side::wrist, wrist);
        put(&mut pose, side, Side::hip, Point2::new(0.5, 0.6));
    }
    pose
}

/// Side-view plank with the hip lowered by `sag`.
fn plank_pose(sag: f32) -> Pose {
    let mut pose = Pose::new();
    for side in Side::BOTH {
        put(&mut pose, side, Side::shoulder, Point2::new(0.2, 0.5));
        put(&mut pose, side, Side::hip, Point2::new(0.5, 0.5 + sag));
        put(&mut pose, side, Side::ankle, Point2::new(0.8, 0.5));
    }
    pose
}
