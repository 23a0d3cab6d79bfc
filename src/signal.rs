//! Signal filtering primitives for the accelerometer path.
//!
//! - Gravity separation with a per-axis low-pass filter.
//! - Single-pole exponential smoothing of a scalar signal.
//!
//! Both filters are incremental (O(1) per sample, no history buffer). The
//! coefficients here are *retention* factors: the weight kept by the previous
//! estimate, so 0.92 means the new sample contributes 8%.

/// Per-axis low-pass estimate of the gravity vector.
///
/// `gravity_i = retention * gravity_i + (1 - retention) * raw_i`
#[derive(Debug, Clone)]
pub struct GravityFilter {
    gravity: [f32; 3],
    retention: f32,
}

impl GravityFilter {
    /// Starts from a zero gravity estimate; the filter converges within a
    /// second or two at typical sensor rates.
    pub fn new(retention: f32) -> Self {
        Self {
            gravity: [0.0; 3],
            retention,
        }
    }

    /// Fold a raw sample into the estimate and return the linear
    /// (gravity-removed) acceleration for that sample.
    pub fn update(&mut self, raw: [f32; 3]) -> [f32; 3] {
        let keep = self.retention;
        for (g, r) in self.gravity.iter_mut().zip(raw) {
            *g = keep * *g + (1.0 - keep) * r;
        }
        self.linear(raw)
    }

    /// `raw - gravity` per axis, without updating the estimate.
    pub fn linear(&self, raw: [f32; 3]) -> [f32; 3] {
        [
            raw[0] - self.gravity[0],
            raw[1] - self.gravity[1],
            raw[2] - self.gravity[2],
        ]
    }

    pub fn gravity(&self) -> [f32; 3] {
        self.gravity
    }

    pub fn reset(&mut self) {
        self.gravity = [0.0; 3];
    }
}

/// Exponentially smoothed scalar.
///
/// `value = retention * value + (1 - retention) * input`
#[derive(Debug, Clone)]
pub struct ExponentialSmoother {
    value: f64,
    retention: f64,
}

impl ExponentialSmoother {
    pub fn new(retention: f64) -> Self {
        Self { value: 0.0, retention }
    }

    pub fn update(&mut self, input: f64) -> f64 {
        self.value = self.retention * self.value + (1.0 - self.retention) * input;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Euclidean norm of a 3-vector.
#[inline]
pub fn magnitude(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
