/// Stress and property tests.
///
/// Long runs, pathological input (NaN, clocks going backwards, sentinel
/// floods) and randomized invariants checked with proptest.

#[cfg(test)]
mod stress_tests {
    use proptest::prelude::*;

    use crate::angles::{average_bilateral, calculate_angle};
    use crate::form_analyzer::FormAnalyzer;
    use crate::hold_tracker::{HoldTracker, HoldTrackerConfig};
    use crate::rep_counter::{RepCounter, RepCounterConfig};
    use crate::session::StepSession;
    use crate::step_detection::StepFilter;
    use crate::test_support::*;
    use crate::types::*;

    fn squat_counter() -> RepCounter {
        RepCounter::new(RepCounterConfig::flexion(ExerciseType::Squat, 100.0, 160.0).unwrap())
    }

    fn plank_tracker() -> HoldTracker {
        HoldTracker::new(HoldTrackerConfig::new(160.0, 180.0).unwrap())
    }

    fn point() -> impl Strategy<Value = Point2> {
        (-2.0f32..2.0, -2.0f32..2.0).prop_map(|(x, y)| Point2::new(x, y))
    }

    // ============================================================================
    // PROPERTIES
    // ============================================================================

    proptest! {
        #[test]
        fn prop_angle_is_symmetric_and_bounded(a in point(), b in point(), c in point()) {
            let forward = calculate_angle(a, b, c);
            let backward = calculate_angle(c, b, a);
            prop_assert!((0.0..=180.0).contains(&forward));
            prop_assert!((forward - backward).abs() < 1e-3);
        }

        #[test]
        fn prop_sentinel_is_a_no_op(angles in proptest::collection::vec(0.0f32..180.0, 0..50)) {
            let mut counter = squat_counter();
            for angle in angles {
                counter.update(angle);
                let before = (counter.state(), counter.count());
                prop_assert!(!counter.update(ANGLE_UNDEFINED));
                prop_assert!(!counter.update(f32::NAN));
                prop_assert_eq!((counter.state(), counter.count()), before);
            }
        }

        #[test]
        fn prop_reps_never_exceed_full_cycles(angles in proptest::collection::vec(0.0f32..180.0, 0..400)) {
            let mut counter = squat_counter();
            let mut downs = 0u32;
            for angle in &angles {
                if *angle <= 100.0 {
                    downs += 1;
                }
                counter.update(*angle);
            }
            prop_assert!(counter.count() <= downs);
            prop_assert!(counter.count() as usize <= angles.len() / 2);
        }

        #[test]
        fn prop_hold_time_non_negative_and_best_monotonic(
            frames in proptest::collection::vec((120.0f32..185.0, -500i64..1500), 1..300)
        ) {
            let mut tracker = plank_tracker();
            let mut t = 0i64;
            let mut best = 0i64;
            for (angle, delta) in frames {
                t += delta;
                tracker.update(angle, t);
                prop_assert!(tracker.current_hold_ms() >= 0);
                prop_assert!(tracker.best_hold_ms() >= best);
                prop_assert!((0.0..=10.0).contains(&tracker.form_score()));
                best = tracker.best_hold_ms();
            }
        }

        #[test]
        fn prop_bilateral_average_lies_between_sides(l in 0.0f32..180.0, r in 0.0f32..180.0) {
            let avg = average_bilateral(l, r);
            prop_assert!(avg >= l.min(r) - 1e-4 && avg <= l.max(r) + 1e-4);
            prop_assert_eq!(average_bilateral(l, ANGLE_UNDEFINED), l);
        }

        #[test]
        fn prop_step_filter_survives_arbitrary_input(
            samples in proptest::collection::vec((-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0, -1000i64..1000), 0..500)
        ) {
            let mut filter = StepFilter::with_defaults();
            let mut t = 0i64;
            let mut last_step: Option<i64> = None;
            for (x, y, z, delta) in samples {
                t += delta;
                if let Some(step) = filter.process_sample(&MotionSample::new(x, y, z, t)) {
                    if let Some(prev) = last_step {
                        // A later step is never inside the refractory period of the previous one.
                        prop_assert!(step.timestamp_ms - prev >= 420);
                    }
                    last_step = Some(step.timestamp_ms);
                    prop_assert!(step.cadence_hz.is_finite() && step.cadence_hz >= 0.0);
                }
            }
        }
    }

    // ============================================================================
    // LONG RUNS
    // ============================================================================

    /// One hour of walking at 50Hz: 180_000 samples, one step every 600ms.
    #[test]
    fn stress_one_hour_walk() {
        let mut session = StepSession::with_defaults();
        let steps = 6_000;
        session.push_batch(&spike_train(steps, 600));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.step_count, steps as u32);
        assert!((snapshot.cadence_hz - 1000.0 / 600.0).abs() < 0.05);
    }

    /// A thousand squats with noisy angles around the targets.
    #[test]
    fn stress_thousand_squats() {
        let mut analyzer = FormAnalyzer::with_defaults(ExerciseType::Squat).unwrap();
        let mut t = 0;
        for rep in 0..1_000 {
            let wobble = (rep % 7) as f32;
            for angle in [172.0 - wobble, 130.0, 88.0 + wobble, 92.0, 130.0, 168.0 + wobble] {
                analyzer.analyze(&squat_pose(angle), t);
                t += 33;
            }
        }
        assert_eq!(analyzer.rep_count(), 1_000);
    }

    /// An hour-long plank with a break every minute.
    #[test]
    fn stress_hour_of_planks() {
        let mut analyzer = FormAnalyzer::with_defaults(ExerciseType::Plank).unwrap();
        let mut t = 0i64;
        for _ in 0..60 {
            for _ in 0..55 {
                analyzer.analyze(&plank_pose(0.0), t);
                t += 1_000;
            }
            for _ in 0..5 {
                analyzer.analyze(&plank_pose(0.2), t);
                t += 1_000;
            }
        }
        let tracker = analyzer.hold_tracker();
        assert_eq!(tracker.best_hold_ms(), 54_000);
        assert!(!tracker.is_holding());
    }

    // ============================================================================
    // PATHOLOGICAL INPUT
    // ============================================================================

    #[test]
    fn stress_nan_and_inf_samples() {
        let mut filter = StepFilter::with_defaults();
        for i in 0..1_000 {
            let bad = match i % 3 {
                0 => f32::NAN,
                1 => f32::INFINITY,
                _ => f32::NEG_INFINITY,
            };
            filter.process_sample(&MotionSample::new(bad, 0.0, GRAVITY, i * 20));
        }
        // Non-finite samples never reach the filter state.
        assert_eq!(filter.step_count(), 0);
        assert_eq!(filter.current_magnitude(), 0.0);

        let steps = filter.process_batch(&spike_train(5, 600));
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn stress_frozen_clock() {
        let mut filter = StepFilter::with_defaults();
        let samples = spike_train(20, 600);
        let frozen: Vec<_> = samples
            .iter()
            .map(|s| MotionSample::new(s.x, s.y, s.z, 5_000))
            .collect();
        let steps = filter.process_batch(&frozen);
        // The first step fires; every later crossing sees zero elapsed time.
        assert_eq!(steps.len(), 1);

        let mut tracker = plank_tracker();
        for _ in 0..100 {
            tracker.update(175.0, 5_000);
        }
        assert_eq!(tracker.current_hold_ms(), 0);
        assert!(tracker.is_holding());
    }

    #[test]
    fn stress_landmark_garbage() {
        let mut analyzer = FormAnalyzer::with_defaults(ExerciseType::Squat).unwrap();
        let mut data = vec![0.0f32; POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK];
        for (i, value) in data.iter_mut().enumerate() {
            *value = match i % 5 {
                0 => f32::NAN,
                1 => 1e30,
                2 => -1e30,
                3 => 0.95,
                _ => f32::INFINITY,
            };
        }
        let pose = Pose::from_flat(&data).unwrap();
        for t in 0..100 {
            if let Some(result) = analyzer.analyze(&pose, t) {
                assert!(!result.rep_completed);
            }
        }
        assert_eq!(analyzer.rep_count(), 0);
    }

    #[test]
    fn stress_rapid_exercise_switching() {
        let mut analyzer = FormAnalyzer::with_defaults(ExerciseType::Squat).unwrap();
        for i in 0..500 {
            let exercise = ExerciseType::ALL[i % ExerciseType::ALL.len()];
            analyzer.set_exercise(exercise);
            analyzer.analyze(&squat_pose(90.0), i as i64 * 10);
            analyzer.analyze(&squat_pose(170.0), i as i64 * 10 + 5);
        }
        for exercise in ExerciseType::ALL {
            if let Some(counter) = analyzer.counter(exercise) {
                assert!(counter.count() <= 1);
            }
        }
    }
}
