//! Control surface used by the firmware loop.
//!
//! The firmware feeds every sensor sample through [`Engine::feed`] and maps
//! button or command events onto the control calls. Only one of calibration
//! or a set can run at a time.

use log::{info, warn};

use crate::calibration::{CalibrationResult, Calibrator};
use crate::config::VbtConfig;
use crate::error::{ConfigError, ControlError};
use crate::pipeline::{Pipeline, Tick};
use crate::session::SetSession;
use crate::types::{Phase, RepRecord, SensorSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Idle,
    Calibrating,
    Recording,
}

/// What happened to a fed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feed {
    /// Nothing running.
    Ignored,
    /// Calibration still collecting.
    Calibrating { collected: u16, target: u16 },
    /// The sample completed calibration.
    Calibrated(CalibrationResult),
    Tick(Tick),
}

struct ActiveSet {
    pipeline: Pipeline,
    session: SetSession,
}

pub struct Engine {
    config: VbtConfig,
    calibration: Option<CalibrationResult>,
    calibrator: Option<Calibrator>,
    active: Option<ActiveSet>,
}

impl Engine {
    pub fn new(config: VbtConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: VbtConfig) -> Self {
        Self {
            config,
            calibration: None,
            calibrator: None,
            active: None,
        }
    }

    pub fn config(&self) -> &VbtConfig {
        &self.config
    }

    pub fn mode(&self) -> EngineMode {
        if self.calibrator.is_some() {
            EngineMode::Calibrating
        } else if self.active.is_some() {
            EngineMode::Recording
        } else {
            EngineMode::Idle
        }
    }

    /// Starts collecting stationary samples. Overwrites any earlier calibration
    /// once complete.
    pub fn begin_calibration(&mut self) -> Result<(), ControlError> {
        self.ensure_idle()?;

        info!("calibration started ({} samples)", self.config.calibration.samples);
        self.calibrator = Some(Calibrator::new(self.config.calibration.samples));
        Ok(())
    }

    /// Opens a new set, replacing any previous pipeline state.
    pub fn start_set(&mut self) -> Result<(), ControlError> {
        self.ensure_idle()?;

        let calibration = match self.calibration {
            Some(calibration) => calibration,
            None => {
                warn!("starting set without calibration, assuming flat mount");
                CalibrationResult::default()
            }
        };

        info!("set started");
        self.active = Some(ActiveSet {
            pipeline: Pipeline::new(&self.config, &calibration),
            session: SetSession::new(),
        });
        Ok(())
    }

    /// Ends the set and hands back its records. A rep in progress is lost.
    pub fn stop_set(&mut self) -> Result<SetSession, ControlError> {
        let active = self.active.take().ok_or(ControlError::NoActiveSet)?;

        if active.pipeline.phase().is_active() {
            info!("set stopped mid-rep, partial rep dropped");
        }
        info!("set stopped with {} reps", active.session.rep_count());
        Ok(active.session)
    }

    pub fn feed(&mut self, sample: &SensorSample) -> Feed {
        if let Some(calibrator) = self.calibrator.as_mut() {
            return match calibrator.push(sample) {
                Some(result) => {
                    self.calibrator = None;
                    self.calibration = Some(result);
                    Feed::Calibrated(result)
                }
                None => {
                    let (collected, target) = calibrator.progress();
                    Feed::Calibrating { collected, target }
                }
            };
        }

        match self.active.as_mut() {
            Some(active) => Feed::Tick(active.pipeline.tick(sample, &mut active.session)),
            None => Feed::Ignored,
        }
    }

    pub fn calibration(&self) -> Option<&CalibrationResult> {
        self.calibration.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.active
            .as_ref()
            .map_or(Phase::Resting, |active| active.pipeline.phase())
    }

    pub fn rep_count(&self) -> u16 {
        self.active
            .as_ref()
            .map_or(0, |active| active.session.rep_count())
    }

    pub fn last_rep(&self) -> Option<&RepRecord> {
        self.active.as_ref().and_then(|active| active.session.last())
    }

    pub fn session(&self) -> Option<&SetSession> {
        self.active.as_ref().map(|active| &active.session)
    }

    fn ensure_idle(&self) -> Result<(), ControlError> {
        match self.mode() {
            EngineMode::Idle => Ok(()),
            EngineMode::Calibrating => Err(ControlError::CalibrationInProgress),
            EngineMode::Recording => Err(ControlError::SetInProgress),
        }
    }
}

impl Default for Engine {
    /// Engine on [`VbtConfig::default`], which always passes `validate()`.
    fn default() -> Self {
        Self::with_config(VbtConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STANDARD_GRAVITY;

    fn still(t: u64) -> SensorSample {
        SensorSample::new([0.0, 0.0, STANDARD_GRAVITY], [0.5, 0.0, 0.0], t)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = VbtConfig::default();
        config.curve.decimation = 0;
        assert!(matches!(
            Engine::new(config),
            Err(ConfigError::CurveDecimation)
        ));
    }

    #[test]
    fn test_default_matches_validated_construction() {
        let engine = Engine::default();
        assert_eq!(engine.config().validate(), Ok(()));

        let built = Engine::new(VbtConfig::default()).unwrap();
        assert_eq!(built.config(), engine.config());
        assert_eq!(built.mode(), EngineMode::Idle);
    }

    #[test]
    fn test_calibration_flow() {
        let mut engine = Engine::default();
        assert!(!engine.is_calibrated());
        assert_eq!(engine.feed(&still(0)), Feed::Ignored);

        engine.begin_calibration().unwrap();
        assert_eq!(engine.mode(), EngineMode::Calibrating);
        assert_eq!(engine.start_set(), Err(ControlError::CalibrationInProgress));

        let mut done = None;
        for i in 0..200 {
            if let Feed::Calibrated(result) = engine.feed(&still(i * 5)) {
                done = Some(result);
            }
        }

        let result = done.unwrap();
        assert_eq!(engine.mode(), EngineMode::Idle);
        assert_eq!(engine.calibration(), Some(&result));
        assert!((result.gyro_bias.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_set_lifecycle() {
        let mut engine = Engine::default();
        assert_eq!(engine.stop_set().unwrap_err(), ControlError::NoActiveSet);

        engine.start_set().unwrap();
        assert_eq!(engine.mode(), EngineMode::Recording);
        assert_eq!(engine.start_set(), Err(ControlError::SetInProgress));
        assert_eq!(engine.begin_calibration(), Err(ControlError::SetInProgress));

        for i in 0..50 {
            assert!(matches!(engine.feed(&still(i * 5)), Feed::Tick(_)));
        }
        assert_eq!(engine.phase(), Phase::Resting);
        assert_eq!(engine.rep_count(), 0);
        assert!(engine.last_rep().is_none());

        let session = engine.stop_set().unwrap();
        assert!(session.records().is_empty());
        assert_eq!(engine.mode(), EngineMode::Idle);
        assert!(engine.session().is_none());
    }
}
