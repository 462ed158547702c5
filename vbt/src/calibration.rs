use log::{debug, info};
use micromath::vector::{F32x3, Vector};

use crate::config::STANDARD_GRAVITY;
use crate::types::SensorSample;

/// Resting gravity vector and gyro bias, in sensor axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResult {
    /// m/s²
    pub gravity: F32x3,
    /// °/s
    pub gyro_bias: F32x3,
}

impl Default for CalibrationResult {
    /// Sensor flat with +Z up and a perfect gyro.
    fn default() -> Self {
        Self {
            gravity: F32x3 {
                x: 0.0,
                y: 0.0,
                z: STANDARD_GRAVITY,
            },
            gyro_bias: F32x3::default(),
        }
    }
}

/// Averages a fixed number of samples taken while the bar is held still.
///
/// Nothing checks that the device really was still; a moving calibration just
/// gives a worse gravity reference.
#[derive(Debug, Clone)]
pub struct Calibrator {
    target: u16,
    count: u16,
    accel_sum: F32x3,
    gyro_sum: F32x3,
}

impl Calibrator {
    pub fn new(samples: u16) -> Self {
        Self {
            target: samples.max(1),
            count: 0,
            accel_sum: F32x3::default(),
            gyro_sum: F32x3::default(),
        }
    }

    /// Adds a sample; returns the result once the window is full.
    pub fn push(&mut self, sample: &SensorSample) -> Option<CalibrationResult> {
        if self.is_complete() {
            return None;
        }

        self.accel_sum = self.accel_sum + sample.accel;
        self.gyro_sum = self.gyro_sum + sample.gyro;
        self.count += 1;

        if !self.is_complete() {
            return None;
        }

        let n = self.count as f32;
        let result = CalibrationResult {
            gravity: self.accel_sum * (1.0 / n),
            gyro_bias: self.gyro_sum * (1.0 / n),
        };

        info!(
            "calibrated over {} samples: |g|={:.4} bias=({:.3}, {:.3}, {:.3})",
            self.count,
            result.gravity.magnitude(),
            result.gyro_bias.x,
            result.gyro_bias.y,
            result.gyro_bias.z
        );
        Some(result)
    }

    pub fn progress(&self) -> (u16, u16) {
        (self.count, self.target)
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.target
    }
}

/// One-shot calibration over a captured buffer.
pub fn calibrate(samples: &[SensorSample]) -> CalibrationResult {
    if samples.is_empty() {
        debug!("no calibration samples, keeping defaults");
        return CalibrationResult::default();
    }

    let mut calibrator = Calibrator::new(samples.len().min(u16::MAX as usize) as u16);
    samples
        .iter()
        .find_map(|sample| calibrator.push(sample))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::magnitude;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_stationary_flat_calibration() {
        let mut calibrator = Calibrator::new(200);
        let mut result = None;
        for i in 0..200 {
            let sample = SensorSample::new([0.0, 0.0, STANDARD_GRAVITY], [0.0; 3], i * 5);
            result = calibrator.push(&sample);
        }

        let result = result.unwrap();
        assert_abs_diff_eq!(magnitude(result.gravity), STANDARD_GRAVITY, epsilon = 1e-3);
        assert_abs_diff_eq!(result.gyro_bias.x, 0.0);
        assert_abs_diff_eq!(result.gyro_bias.y, 0.0);
        assert_abs_diff_eq!(result.gyro_bias.z, 0.0);
    }

    #[test]
    fn test_result_only_on_last_sample() {
        let mut calibrator = Calibrator::new(3);
        let sample = SensorSample::new([1.0, 2.0, 3.0], [0.5, -0.5, 1.0], 0);

        assert!(calibrator.push(&sample).is_none());
        assert!(calibrator.push(&sample).is_none());
        assert_eq!(calibrator.progress(), (2, 3));

        let result = calibrator.push(&sample).unwrap();
        assert_abs_diff_eq!(result.gravity.y, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.gyro_bias.z, 1.0, epsilon = 1e-6);

        // Extra samples do not restart the window.
        assert!(calibrator.push(&sample).is_none());
    }

    #[test]
    fn test_mean_of_noisy_samples() {
        let samples = [
            SensorSample::new([0.2, 0.0, 9.7], [1.0, 0.0, -2.0], 0),
            SensorSample::new([-0.2, 0.1, 9.9], [3.0, 0.0, 0.0], 5),
        ];

        let result = calibrate(&samples);
        assert_abs_diff_eq!(result.gravity.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.gravity.y, 0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(result.gravity.z, 9.8, epsilon = 1e-5);
        assert_abs_diff_eq!(result.gyro_bias.x, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.gyro_bias.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_buffer_keeps_defaults() {
        assert_eq!(calibrate(&[]), CalibrationResult::default());
    }
}
