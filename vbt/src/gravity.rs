//! Gravity direction tracking.
//!
//! A complementary filter: the gravity vector is carried forward with the
//! bias-corrected gyro and pulled a little toward each accelerometer reading.
//! Only the direction is needed to split out vertical acceleration, so no full
//! attitude is kept.

use log::trace;
use micromath::vector::{F32x3, Vector};
use micromath::F32Ext;

use crate::calibration::CalibrationResult;
use crate::config::{FilterConfig, STANDARD_GRAVITY};

/// Output of one gravity update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityUpdate {
    /// Linear acceleration along gravity, positive up (m/s²).
    pub vertical_accel: f32,
    /// Bias-corrected angular rate magnitude (°/s).
    pub gyro_magnitude: f32,
    /// Raw accelerometer magnitude (m/s²).
    pub accel_magnitude: f32,
}

#[derive(Debug, Clone)]
pub struct GravityTracker {
    blend: f32,
    floor: f32,
    gyro_bias: F32x3,
    estimate: F32x3,
}

impl GravityTracker {
    pub fn new(config: &FilterConfig, calibration: &CalibrationResult) -> Self {
        Self {
            blend: config.gravity_blend,
            floor: config.gravity_floor,
            gyro_bias: calibration.gyro_bias,
            estimate: calibration.gravity,
        }
    }

    pub fn estimate(&self) -> F32x3 {
        self.estimate
    }

    /// Advances the estimate by `dt` seconds and projects `accel` onto it.
    pub fn update(&mut self, accel: F32x3, gyro: F32x3, dt: f32) -> GravityUpdate {
        let rate = gyro - self.gyro_bias;
        let omega = rate * (core::f32::consts::PI / 180.0);

        // A vector fixed in the world frame turns against the body rotation;
        // `*` between two vectors is the cross product.
        let rotated = self.estimate + (self.estimate * omega) * dt;
        self.estimate = rotated * (1.0 - self.blend) + accel * self.blend;

        let mut norm = magnitude(self.estimate);
        if norm < self.floor {
            trace!("gravity estimate degenerate ({}), using standard gravity", norm);
            norm = STANDARD_GRAVITY;
        }
        let down = self.estimate * (1.0 / norm);

        GravityUpdate {
            vertical_accel: accel.dot(down) - STANDARD_GRAVITY,
            gyro_magnitude: magnitude(rate),
            accel_magnitude: magnitude(accel),
        }
    }
}

/// Euclidean length with the platform `sqrt`; the projection needs more
/// precision than `Vector::magnitude` gives.
pub(crate) fn magnitude(v: F32x3) -> f32 {
    v.dot(v).sqrt()
}
