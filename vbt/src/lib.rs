//! Repetition detection for a bar-mounted IMU.
//!
//! Feed timestamped accelerometer/gyro samples into an [`Engine`]; it tracks
//! the gravity direction, integrates vertical velocity with zero-velocity
//! correction, and splits the motion into concentric/eccentric repetitions,
//! each reported as a [`RepRecord`].
//!
//! The crate is `no_std` and never allocates; every buffer has a fixed
//! capacity and overflows are counted in [`SetStats`].

#![cfg_attr(not(test), no_std)]

pub mod aggregator;
pub mod calibration;
pub mod conditioner;
pub mod config;
pub mod engine;
pub mod error;
pub mod gravity;
pub mod integrator;
pub mod phase;
pub mod pipeline;
pub mod session;
pub mod statistics;
pub mod types;
pub mod zupt;

pub use calibration::{calibrate, CalibrationResult, Calibrator};
pub use config::{
    CalibrationConfig, CurveConfig, FilterConfig, PhaseConfig, TimingConfig, VbtConfig,
    ZuptConfig, MAX_CURVE_POINTS_PER_REP, MAX_CURVE_POINTS_PER_SET, MAX_REPS_PER_SET,
    STANDARD_GRAVITY,
};
pub use engine::{Engine, EngineMode, Feed};
pub use error::{ConfigError, ControlError};
pub use pipeline::{DiscardReason, Pipeline, RepEvent, Tick};
pub use session::{SetSession, SetStats, SetSummary};
pub use statistics::Stats;
pub use types::{CurvePoint, Phase, RepRecord, SensorSample};
