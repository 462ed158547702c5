//! Zero-velocity update detection.
//!
//! Integrated accelerometer bias shows up as velocity that never returns to
//! zero. When both the vertical acceleration and the angular rate have been
//! quiet for long enough the bar is taken to be at rest and the integrator
//! bleeds velocity off instead of integrating.

use crate::config::ZuptConfig;

#[derive(Debug, Clone)]
pub struct ZuptDetector {
    accel_threshold: f32,
    gyro_threshold: f32,
    still_samples: u16,
    counter: u16,
}

impl ZuptDetector {
    pub fn new(config: &ZuptConfig) -> Self {
        Self {
            accel_threshold: config.accel_threshold,
            gyro_threshold: config.gyro_threshold,
            still_samples: config.still_samples,
            counter: 0,
        }
    }

    /// Feeds one sample and reports whether the device is stationary.
    pub fn update(&mut self, vertical_accel: f32, gyro_magnitude: f32) -> bool {
        if vertical_accel.abs() < self.accel_threshold && gyro_magnitude < self.gyro_threshold {
            self.counter = self.counter.saturating_add(1);
        } else {
            self.counter = 0;
        }

        self.is_stationary()
    }

    pub fn is_stationary(&self) -> bool {
        self.counter >= self.still_samples
    }

    pub fn still_count(&self) -> u16 {
        self.counter
    }
}
