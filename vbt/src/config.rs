//! Tunables for the motion pipeline.
//!
//! Defaults are tuned for a bar-mounted IMU sampled at 200 Hz.

use crate::error::ConfigError;

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Length of the vertical acceleration moving average.
pub const SMOOTHING_WINDOW: usize = 5;

/// Maximum velocity curve points kept for one repetition.
pub const MAX_CURVE_POINTS_PER_REP: usize = 80;

/// Maximum velocity curve points kept across a whole set.
pub const MAX_CURVE_POINTS_PER_SET: usize = 800;

/// Maximum repetitions recorded in one set.
pub const MAX_REPS_PER_SET: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Stationary samples averaged into a calibration.
    pub samples: u16,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { samples: 200 }
    }
}

/// Gravity tracking, conditioning and integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Share of the raw accelerometer reading blended into the gravity estimate.
    pub gravity_blend: f32,
    /// Below this magnitude the gravity estimate is considered degenerate (m/s²).
    pub gravity_floor: f32,
    /// Smoothed vertical acceleration under this magnitude is zeroed (m/s²).
    pub deadband: f32,
    /// Per-sample velocity leak applied while integrating.
    pub velocity_leak: f32,
    /// Symmetric velocity bound (m/s).
    pub velocity_clamp: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            gravity_blend: 0.04,
            gravity_floor: 0.1,
            deadband: 0.12,
            velocity_leak: 0.996,
            velocity_clamp: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZuptConfig {
    /// m/s²
    pub accel_threshold: f32,
    /// °/s
    pub gyro_threshold: f32,
    /// Consecutive still samples before the device counts as stationary.
    pub still_samples: u16,
    /// Velocity multiplier applied per stationary sample.
    pub decay: f32,
}

impl Default for ZuptConfig {
    fn default() -> Self {
        Self {
            accel_threshold: 0.25,
            gyro_threshold: 15.0,
            still_samples: 40,
            decay: 0.90,
        }
    }
}

/// Thresholds driving the repetition state machine.
///
/// Velocities are m/s, durations milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseConfig {
    pub min_rest_ms: u32,
    pub start_velocity: f32,
    pub concentric_end_velocity: f32,
    pub min_concentric_ms: u32,
    /// Most negative velocity must pass this for the descent to count.
    pub eccentric_min_velocity: f32,
    pub eccentric_end_velocity: f32,
    pub min_eccentric_ms: u32,
    /// Ceiling for either active phase.
    pub phase_timeout_ms: u32,
    pub min_rom_cm: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            min_rest_ms: 120,
            start_velocity: 0.10,
            concentric_end_velocity: 0.05,
            min_concentric_ms: 100,
            eccentric_min_velocity: -0.06,
            eccentric_end_velocity: 0.03,
            min_eccentric_ms: 100,
            phase_timeout_ms: 5000,
            min_rom_cm: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveConfig {
    /// Keep one curve point every `decimation` active samples.
    pub decimation: u16,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self { decimation: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    /// Interval used when the measured one is unusable (ms).
    pub nominal_interval_ms: u32,
    /// Largest gap between samples taken as measured (ms).
    pub max_gap_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            nominal_interval_ms: 5,
            max_gap_ms: 100,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VbtConfig {
    pub calibration: CalibrationConfig,
    pub filter: FilterConfig,
    pub zupt: ZuptConfig,
    pub phase: PhaseConfig,
    pub curve: CurveConfig,
    pub timing: TimingConfig,
}

impl VbtConfig {
    /// Rejects settings that would stall or destabilise the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calibration.samples == 0 {
            return Err(ConfigError::NoCalibrationSamples);
        }
        if !unit_interval(self.filter.gravity_blend) {
            return Err(ConfigError::GravityBlend);
        }
        if !unit_interval(self.filter.velocity_leak) || !unit_interval(self.zupt.decay) {
            return Err(ConfigError::DecayFactor);
        }
        if !(self.filter.velocity_clamp > 0.0) {
            return Err(ConfigError::VelocityClamp);
        }
        if self.filter.deadband < 0.0 || self.filter.gravity_floor < 0.0 {
            return Err(ConfigError::NegativeThreshold);
        }
        if self.phase.concentric_end_velocity > self.phase.start_velocity
            || self.phase.eccentric_min_velocity >= 0.0
        {
            return Err(ConfigError::PhaseThresholds);
        }
        if self.curve.decimation == 0 {
            return Err(ConfigError::CurveDecimation);
        }
        if self.timing.nominal_interval_ms == 0
            || self.timing.nominal_interval_ms > self.timing.max_gap_ms
        {
            return Err(ConfigError::NominalInterval);
        }
        Ok(())
    }
}

fn unit_interval(value: f32) -> bool {
    value > 0.0 && value <= 1.0
}
