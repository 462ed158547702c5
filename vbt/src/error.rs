use core::fmt;

/// Invalid [`VbtConfig`](crate::config::VbtConfig) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NoCalibrationSamples,
    GravityBlend,
    DecayFactor,
    VelocityClamp,
    NegativeThreshold,
    PhaseThresholds,
    CurveDecimation,
    NominalInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoCalibrationSamples => "calibration needs at least one sample",
            Self::GravityBlend => "gravity blend weight must be in (0, 1]",
            Self::DecayFactor => "leak and ZUPT decay must be in (0, 1]",
            Self::VelocityClamp => "velocity clamp must be positive",
            Self::NegativeThreshold => "deadband and gravity floor must not be negative",
            Self::PhaseThresholds => "phase velocity thresholds are inconsistent",
            Self::CurveDecimation => "curve decimation must be at least 1",
            Self::NominalInterval => "nominal interval must be positive and within the max gap",
        };
        f.write_str(msg)
    }
}

/// Control event issued in a mode that cannot honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    SetInProgress,
    CalibrationInProgress,
    NoActiveSet,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetInProgress => f.write_str("a set is being recorded"),
            Self::CalibrationInProgress => f.write_str("calibration is running"),
            Self::NoActiveSet => f.write_str("no set is being recorded"),
        }
    }
}
