use micromath::vector::F32x3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::MAX_CURVE_POINTS_PER_REP;
use crate::statistics::Stats;

/// One 6-axis IMU reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// m/s²
    pub accel: F32x3,
    /// °/s
    pub gyro: F32x3,
    /// Arrival time in milliseconds.
    pub timestamp_ms: u64,
}

impl SensorSample {
    pub fn new(accel: [f32; 3], gyro: [f32; 3], timestamp_ms: u64) -> Self {
        Self {
            accel: F32x3 {
                x: accel[0],
                y: accel[1],
                z: accel[2],
            },
            gyro: F32x3 {
                x: gyro[0],
                y: gyro[1],
                z: gyro[2],
            },
            timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    #[default]
    Resting,
    /// Bar moving up.
    Concentric,
    /// Bar moving down.
    Eccentric,
}

impl Phase {
    pub fn is_active(self) -> bool {
        self != Phase::Resting
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurvePoint {
    /// Milliseconds since the repetition started.
    pub offset_ms: u32,
    /// m/s
    pub velocity: f32,
}

/// A finished repetition.
///
/// Velocities are m/s, accelerations m/s², gyro magnitudes °/s and
/// durations milliseconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepRecord {
    /// Starts at 1, contiguous within a set.
    pub sequence: u16,
    pub peak_velocity: f32,
    pub mean_velocity: f32,
    pub peak_acceleration: f32,
    pub time_to_peak_velocity_ms: u32,
    /// Speed of the fastest point of the descent, always >= 0.
    pub eccentric_peak_velocity: f32,
    pub eccentric_peak_acceleration: f32,
    /// Concentric range of motion in meters.
    pub rom_m: f32,
    /// Net travel during the descent, relative to the top of the lift.
    pub eccentric_displacement_m: f32,
    pub concentric_ms: u32,
    pub eccentric_ms: u32,
    pub total_ms: u32,
    pub accel_magnitude: Stats,
    pub gyro_magnitude: Stats,
    pub curve: heapless::Vec<CurvePoint, MAX_CURVE_POINTS_PER_REP>,
}
