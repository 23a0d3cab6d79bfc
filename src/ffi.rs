//! C FFI bindings for mobile hosts.
//!
//! Exposes step sessions, the form analyzer and the streak calculation over a
//! C ABI so iOS/Android bridges can call into the engine.
//!
//! Memory Safety:
//! - Strings returned by `motion_*` functions must be freed with `motion_free_string()`
//! - Handles must be freed with their matching `_destroy()` function
//! - NULL checks are performed on all inputs
//!
//! Thread Safety:
//! - Handles are NOT thread-safe. Each handle must have a single owner thread.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::form_analyzer::FormAnalyzer;
use crate::session::StepSession;
use crate::streak::{DailyStepRecord, StreakEngine, DATE_FORMAT};
use crate::types::{ExerciseResult, ExerciseState, ExerciseType, MotionSample, Pose};

// ============================================================================
// OPAQUE HANDLE TYPES
// ============================================================================

/// Opaque handle to a form analyzer plus the last result it produced.
pub struct MotionAnalyzer {
    analyzer: FormAnalyzer,
    last_result: Option<ExerciseResult>,
}

/// Result status codes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer provided.
    NullPointer = 1,
    /// Invalid parameter value.
    InvalidParameter = 2,
    /// Frame skipped: required landmarks missing or below confidence.
    Skipped = 3,
}

/// Step session values after a sample.
#[repr(C)]
#[derive(Debug, Clone, Default)]
pub struct MotionStepOutput {
    /// Step fired on this sample (0 or 1).
    pub step_detected: i32,
    /// Total steps in the session.
    pub step_count: u32,
    /// Smoothed linear-acceleration magnitude in m/s².
    pub magnitude: f64,
    /// Steps per second (0 until two steps are seen).
    pub cadence_hz: f32,
    /// Timestamp of the last step, or -1 if none.
    pub last_step_ms: i64,
}

/// Analysis of one frame.
#[repr(C)]
#[derive(Debug, Clone, Default)]
pub struct MotionFrameOutput {
    /// Exercise code (0=Squat, 1=PushUp, 2=SitUp, 3=BicepCurl, 4=Plank).
    pub exercise: i32,
    /// Repetitions, or whole seconds held for Plank.
    pub rep_count: u32,
    /// Repetition completed on this frame (0 or 1). Use for haptics.
    pub rep_completed: i32,
    /// 0=Ready, 1=Up, 2=Down.
    pub state: i32,
    /// Driving joint angle in degrees.
    pub angle: f32,
    /// Form is correct (0 or 1).
    pub form_correct: i32,
    /// Bit `i` set when landmark `i` is flagged.
    pub flagged_joints: u64,
    /// Current hold in milliseconds (Plank only, else 0).
    pub hold_ms: i64,
    /// Best hold in milliseconds (Plank only, else 0).
    pub best_hold_ms: i64,
    /// Hold form score 0-10 (Plank only, else 0).
    pub form_score: f32,
}

/// Exercise for a C exercise code.
pub fn exercise_from_code(code: i32) -> Option<ExerciseType> {
    match code {
        0 => Some(ExerciseType::Squat),
        1 => Some(ExerciseType::PushUp),
        2 => Some(ExerciseType::SitUp),
        3 => Some(ExerciseType::BicepCurl),
        4 => Some(ExerciseType::Plank),
        _ => None,
    }
}

pub fn exercise_code(exercise: ExerciseType) -> i32 {
    match exercise {
        ExerciseType::Squat => 0,
        ExerciseType::PushUp => 1,
        ExerciseType::SitUp => 2,
        ExerciseType::BicepCurl => 3,
        ExerciseType::Plank => 4,
    }
}

fn state_code(state: ExerciseState) -> i32 {
    match state {
        ExerciseState::Unknown => 0,
        ExerciseState::Up => 1,
        ExerciseState::Down => 2,
    }
}

/// Engine config from an optional JSON string; NULL means defaults.
unsafe fn config_from_c(config_json: *const c_char) -> Option<EngineConfig> {
    if config_json.is_null() {
        return Some(EngineConfig::default());
    }
    let json = CStr::from_ptr(config_json).to_str().ok()?;
    EngineConfig::from_json_str(json).ok()
}

fn into_c_string(value: String) -> *mut c_char {
    match CString::new(value) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// STEP SESSION
// ============================================================================

/// Create a step session.
///
/// # Safety
/// - `config_json` must be NULL (defaults) or a valid null-terminated JSON config.
/// - The returned pointer must be freed with `motion_step_session_destroy()`.
///
/// # Returns
/// - Pointer to the session on success.
/// - NULL if the config does not parse or validate.
#[no_mangle]
pub unsafe extern "C" fn motion_step_session_create(config_json: *const c_char) -> *mut StepSession {
    let Some(config) = config_from_c(config_json) else {
        return ptr::null_mut();
    };
    match StepSession::new(config.step_filter) {
        Ok(session) => Box::into_raw(Box::new(session)),
        Err(_) => ptr::null_mut(),
    }
}

/// Destroy a step session.
///
/// # Safety
/// - `session` must come from `motion_step_session_create()` and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn motion_step_session_destroy(session: *mut StepSession) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Zero the step count and filter state.
///
/// # Safety
/// - `session` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn motion_step_session_reset(session: *mut StepSession) -> MotionStatus {
    if session.is_null() {
        return MotionStatus::NullPointer;
    }
    (*session).reset();
    MotionStatus::Ok
}

/// Feed one accelerometer sample (m/s², gravity included).
///
/// # Safety
/// - `session` must be a valid pointer.
/// - `output` must be a valid pointer to receive results.
#[no_mangle]
pub unsafe extern "C" fn motion_step_session_push_sample(
    session: *mut StepSession,
    timestamp_ms: i64,
    accel_x: f32,
    accel_y: f32,
    accel_z: f32,
    output: *mut MotionStepOutput,
) -> MotionStatus {
    if session.is_null() || output.is_null() {
        return MotionStatus::NullPointer;
    }

    let session = &mut *session;
    let step = session.push_sample(&MotionSample::new(accel_x, accel_y, accel_z, timestamp_ms));

    fill_step_output(session, &mut *output);
    (*output).step_detected = i32::from(step.is_some());
    MotionStatus::Ok
}

/// Read the live step values without feeding a sample.
///
/// # Safety
/// - `session` and `output` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn motion_step_session_snapshot(
    session: *const StepSession,
    output: *mut MotionStepOutput,
) -> MotionStatus {
    if session.is_null() || output.is_null() {
        return MotionStatus::NullPointer;
    }
    fill_step_output(&*session, &mut *output);
    MotionStatus::Ok
}

fn fill_step_output(session: &StepSession, output: &mut MotionStepOutput) {
    let snapshot = session.snapshot();
    output.step_detected = 0;
    output.step_count = snapshot.step_count;
    output.magnitude = snapshot.magnitude;
    output.cadence_hz = snapshot.cadence_hz;
    output.last_step_ms = snapshot.last_step_ms.unwrap_or(-1);
}

// ============================================================================
// FORM ANALYZER
// ============================================================================

/// Create a form analyzer for `exercise` (see [`MotionFrameOutput::exercise`]).
///
/// # Safety
/// - `config_json` must be NULL (defaults) or a valid null-terminated JSON config.
/// - The returned pointer must be freed with `motion_analyzer_destroy()`.
///
/// # Returns
/// - NULL for an unknown exercise code or an invalid config.
#[no_mangle]
pub unsafe extern "C" fn motion_analyzer_create(
    exercise: i32,
    config_json: *const c_char,
) -> *mut MotionAnalyzer {
    let Some(exercise) = exercise_from_code(exercise) else {
        return ptr::null_mut();
    };
    let Some(config) = config_from_c(config_json) else {
        return ptr::null_mut();
    };
    match FormAnalyzer::new(&config.analyzer, exercise) {
        Ok(analyzer) => Box::into_raw(Box::new(MotionAnalyzer {
            analyzer,
            last_result: None,
        })),
        Err(_) => ptr::null_mut(),
    }
}

/// Destroy a form analyzer.
///
/// # Safety
/// - `analyzer` must come from `motion_analyzer_create()` and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn motion_analyzer_destroy(analyzer: *mut MotionAnalyzer) {
    if !analyzer.is_null() {
        drop(Box::from_raw(analyzer));
    }
}

/// Switch exercise. The outgoing exercise's counter is reset.
///
/// # Safety
/// - `analyzer` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn motion_analyzer_set_exercise(
    analyzer: *mut MotionAnalyzer,
    exercise: i32,
) -> MotionStatus {
    if analyzer.is_null() {
        return MotionStatus::NullPointer;
    }
    let Some(exercise) = exercise_from_code(exercise) else {
        return MotionStatus::InvalidParameter;
    };
    let handle = &mut *analyzer;
    handle.analyzer.set_exercise(exercise);
    handle.last_result = None;
    MotionStatus::Ok
}

/// Reset the active exercise's counter or hold.
///
/// # Safety
/// - `analyzer` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn motion_analyzer_reset(analyzer: *mut MotionAnalyzer) -> MotionStatus {
    if analyzer.is_null() {
        return MotionStatus::NullPointer;
    }
    let handle = &mut *analyzer;
    handle.analyzer.reset();
    handle.last_result = None;
    MotionStatus::Ok
}

/// Analyze one frame of pose landmarks.
///
/// # Safety
/// - `analyzer` and `output` must be valid pointers.
/// - `landmarks` must point to `len` floats laid out as 33 `[x, y, confidence]` triples.
///
/// # Returns
/// - `Ok` with `output` filled.
/// - `Skipped` when the frame lacked confident landmarks; `output` is untouched.
/// - `InvalidParameter` when `len` is not 99.
#[no_mangle]
pub unsafe extern "C" fn motion_analyzer_process_frame(
    analyzer: *mut MotionAnalyzer,
    landmarks: *const f32,
    len: usize,
    timestamp_ms: i64,
    output: *mut MotionFrameOutput,
) -> MotionStatus {
    if analyzer.is_null() || landmarks.is_null() || output.is_null() {
        return MotionStatus::NullPointer;
    }

    let data = std::slice::from_raw_parts(landmarks, len);
    let Ok(pose) = Pose::from_flat(data) else {
        return MotionStatus::InvalidParameter;
    };

    let handle = &mut *analyzer;
    let Some(result) = handle.analyzer.analyze(&pose, timestamp_ms) else {
        return MotionStatus::Skipped;
    };

    let output = &mut *output;
    output.exercise = exercise_code(result.exercise);
    output.rep_count = result.rep_count;
    output.rep_completed = i32::from(result.rep_completed);
    output.state = state_code(result.state);
    output.angle = result.angle;
    output.form_correct = i32::from(result.form_feedback.is_correct);
    output.flagged_joints = result
        .form_feedback
        .flagged_joints
        .iter()
        .fold(0u64, |mask, joint| mask | (1u64 << joint.index()));
    match &result.hold {
        Some(hold) => {
            output.hold_ms = hold.current_hold_ms;
            output.best_hold_ms = hold.best_hold_ms;
            output.form_score = hold.form_score;
        }
        None => {
            output.hold_ms = 0;
            output.best_hold_ms = 0;
            output.form_score = 0.0;
        }
    }

    handle.last_result = Some(result);
    MotionStatus::Ok
}

/// Feedback message of the last analyzed frame.
///
/// # Safety
/// - `analyzer` must be a valid pointer.
///
/// # Returns
/// - UTF-8 string (MUST be freed with `motion_free_string()`).
/// - NULL if no frame has been analyzed since creation, reset or exercise switch.
#[no_mangle]
pub unsafe extern "C" fn motion_analyzer_feedback_message(
    analyzer: *const MotionAnalyzer,
) -> *mut c_char {
    if analyzer.is_null() {
        return ptr::null_mut();
    }
    match &(*analyzer).last_result {
        Some(result) => into_c_string(result.form_feedback.message.clone()),
        None => ptr::null_mut(),
    }
}

/// Last frame's full result as JSON.
///
/// # Safety
/// - `analyzer` must be a valid pointer.
///
/// # Returns
/// - JSON string (MUST be freed with `motion_free_string()`), or NULL.
#[no_mangle]
pub unsafe extern "C" fn motion_analyzer_last_result_json(
    analyzer: *const MotionAnalyzer,
) -> *mut c_char {
    if analyzer.is_null() {
        return ptr::null_mut();
    }
    match &(*analyzer).last_result {
        Some(result) => match serde_json::to_string(result) {
            Ok(json) => into_c_string(json),
            Err(_) => ptr::null_mut(),
        },
        None => ptr::null_mut(),
    }
}

// ============================================================================
// STREAKS
// ============================================================================

/// Compute streaks from a JSON array of `{date, steps, goal}` records.
///
/// # Safety
/// - `records_json` and `today` must be valid null-terminated strings.
///
/// # Returns
/// - `StreakResult` JSON (MUST be freed with `motion_free_string()`).
/// - NULL if the records or `today` (`yyyy-MM-dd`) do not parse.
#[no_mangle]
pub unsafe extern "C" fn motion_streak_calculate_json(
    records_json: *const c_char,
    goal: i32,
    today: *const c_char,
) -> *mut c_char {
    if records_json.is_null() || today.is_null() {
        return ptr::null_mut();
    }
    let Ok(records_json) = CStr::from_ptr(records_json).to_str() else {
        return ptr::null_mut();
    };
    let Ok(today) = CStr::from_ptr(today).to_str() else {
        return ptr::null_mut();
    };
    let Ok(today) = NaiveDate::parse_from_str(today, DATE_FORMAT) else {
        return ptr::null_mut();
    };
    let Ok(records) = serde_json::from_str::<Vec<DailyStepRecord>>(records_json) else {
        return ptr::null_mut();
    };

    let result = StreakEngine::default().calculate(&records, goal, today);
    match serde_json::to_string(&result) {
        Ok(json) => into_c_string(json),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a string returned by a `motion_*` function.
///
/// # Safety
/// - `ptr` must be a string returned by this library.
/// - Must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn motion_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Get the library version string.
///
/// # Returns
/// - Static string, do NOT free.
#[no_mangle]
pub extern "C" fn motion_version() -> *const c_char {
    static VERSION: &[u8] = concat!("motion-engine/", env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// TESTS
// ============================================================================
