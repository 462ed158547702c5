use heapless::Vec;

use crate::config::MAX_CURVE_POINTS_PER_REP;
use crate::phase::elapsed_ms;
use crate::statistics::RunningStats;
use crate::types::{CurvePoint, RepRecord};

/// Per-repetition accumulators, live while a phase is active.
#[derive(Debug, Clone)]
pub struct RepAccumulator {
    decimation: u32,

    start_ms: u64,
    concentric_end_ms: u64,

    peak_velocity: f32,
    peak_velocity_ms: u64,
    peak_accel: f32,
    velocity_sum: f32,
    velocity_count: u32,
    concentric_displacement: f32,

    eccentric_peak_accel: f32,
    eccentric_displacement: f32,

    accel_magnitude: RunningStats,
    gyro_magnitude: RunningStats,

    active_samples: u32,
    curve: Vec<CurvePoint, MAX_CURVE_POINTS_PER_REP>,
}

impl RepAccumulator {
    pub fn new(decimation: u16) -> Self {
        Self {
            decimation: u32::from(decimation.max(1)),
            start_ms: 0,
            concentric_end_ms: 0,
            peak_velocity: 0.0,
            peak_velocity_ms: 0,
            peak_accel: 0.0,
            velocity_sum: 0.0,
            velocity_count: 0,
            concentric_displacement: 0.0,
            eccentric_peak_accel: 0.0,
            eccentric_displacement: 0.0,
            accel_magnitude: RunningStats::new(),
            gyro_magnitude: RunningStats::new(),
            active_samples: 0,
            curve: Vec::new(),
        }
    }

    /// Clears everything and seeds the concentric peaks with the entry sample.
    pub fn begin(&mut self, now_ms: u64, velocity: f32, accel: f32) {
        *self = Self {
            start_ms: now_ms,
            concentric_end_ms: now_ms,
            peak_velocity: velocity,
            peak_velocity_ms: now_ms,
            peak_accel: accel.abs(),
            velocity_sum: velocity,
            velocity_count: 1,
            ..Self::new(self.decimation as u16)
        };
    }

    pub fn track_concentric(&mut self, now_ms: u64, velocity: f32, accel: f32, displacement: f32) {
        if velocity > self.peak_velocity {
            self.peak_velocity = velocity;
            self.peak_velocity_ms = now_ms;
        }
        self.peak_accel = self.peak_accel.max(accel.abs());
        self.velocity_sum += velocity;
        self.velocity_count += 1;
        self.concentric_displacement = displacement;
    }

    pub fn end_concentric(&mut self, now_ms: u64, displacement: f32) {
        self.concentric_end_ms = now_ms;
        self.concentric_displacement = displacement;
    }

    /// `displacement` is the running total since the rep started.
    pub fn track_eccentric(&mut self, accel: f32, displacement: f32) {
        self.eccentric_peak_accel = self.eccentric_peak_accel.max(accel.abs());
        self.eccentric_displacement = displacement - self.concentric_displacement;
    }

    pub fn track_magnitudes(&mut self, accel_magnitude: f32, gyro_magnitude: f32) {
        self.accel_magnitude.push(accel_magnitude);
        self.gyro_magnitude.push(gyro_magnitude);
    }

    /// Offers the current velocity to the decimated curve.
    ///
    /// `set_remaining` is the room left in the whole-set pool. Returns false
    /// when a point was due but had no room.
    pub fn sample_curve(&mut self, now_ms: u64, velocity: f32, set_remaining: usize) -> bool {
        let due = self.active_samples % self.decimation == 0;
        self.active_samples += 1;
        if !due {
            return true;
        }

        if self.curve.len() >= set_remaining {
            return false;
        }
        let point = CurvePoint {
            offset_ms: elapsed_ms(self.start_ms, now_ms),
            velocity,
        };
        self.curve.push(point).is_ok()
    }

    pub fn curve_len(&self) -> usize {
        self.curve.len()
    }

    pub fn rom_cm(&self) -> f32 {
        self.concentric_displacement.abs() * 100.0
    }

    pub fn finish(&self, sequence: u16, now_ms: u64, eccentric_min_velocity: f32) -> RepRecord {
        let mean_velocity = if self.velocity_count > 0 {
            self.velocity_sum / self.velocity_count as f32
        } else {
            0.0
        };

        RepRecord {
            sequence,
            peak_velocity: self.peak_velocity,
            mean_velocity,
            peak_acceleration: self.peak_accel,
            time_to_peak_velocity_ms: elapsed_ms(self.start_ms, self.peak_velocity_ms),
            eccentric_peak_velocity: (-eccentric_min_velocity).max(0.0),
            eccentric_peak_acceleration: self.eccentric_peak_accel,
            rom_m: self.concentric_displacement.abs(),
            eccentric_displacement_m: self.eccentric_displacement,
            concentric_ms: elapsed_ms(self.start_ms, self.concentric_end_ms),
            eccentric_ms: elapsed_ms(self.concentric_end_ms, now_ms),
            total_ms: elapsed_ms(self.start_ms, now_ms),
            accel_magnitude: self.accel_magnitude.summary(),
            gyro_magnitude: self.gyro_magnitude.summary(),
            curve: self.curve.clone(),
        }
    }
}
