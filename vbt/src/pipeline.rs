//! Per-sample processing for one set.
//!
//! sample -> gravity projection -> smoothing/deadband -> ZUPT + integration
//! -> phase machine -> rep accumulation.

use log::{debug, info, warn};

use crate::aggregator::RepAccumulator;
use crate::calibration::CalibrationResult;
use crate::conditioner::Conditioner;
use crate::config::{PhaseConfig, TimingConfig, VbtConfig};
use crate::gravity::GravityTracker;
use crate::integrator::{sample_interval, Integrator};
use crate::phase::{transition, PhaseState, Transition};
use crate::session::SetSession;
use crate::types::{Phase, SensorSample};
use crate::zupt::ZuptDetector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscardReason {
    /// Full cycle, but the lift was shorter than the minimum ROM.
    ShortRange { rom_cm: f32 },
    /// Concentric phase never ended before the timeout.
    ConcentricTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepEvent {
    ConcentricStarted,
    EccentricStarted,
    /// `stored` is false when the set buffer was already full.
    Completed { sequence: u16, stored: bool },
    Discarded(DiscardReason),
}

/// Observable result of one processed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub phase: Phase,
    pub velocity: f32,
    pub displacement: f32,
    /// Conditioned vertical acceleration, m/s².
    pub vertical_accel: f32,
    pub stationary: bool,
    pub interval_substituted: bool,
    pub event: Option<RepEvent>,
}

/// Working state of one running set.
#[derive(Debug, Clone)]
pub struct Pipeline {
    phase_config: PhaseConfig,
    timing: TimingConfig,

    gravity: GravityTracker,
    conditioner: Conditioner,
    zupt: ZuptDetector,
    integrator: Integrator,
    state: PhaseState,
    rep: RepAccumulator,

    last_timestamp_ms: Option<u64>,
}

impl Pipeline {
    pub fn new(config: &VbtConfig, calibration: &CalibrationResult) -> Self {
        Self {
            phase_config: config.phase,
            timing: config.timing,
            gravity: GravityTracker::new(&config.filter, calibration),
            conditioner: Conditioner::new(config.filter.deadband),
            zupt: ZuptDetector::new(&config.zupt),
            integrator: Integrator::new(&config.filter, config.zupt.decay),
            state: PhaseState::default(),
            rep: RepAccumulator::new(config.curve.decimation),
            last_timestamp_ms: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn velocity(&self) -> f32 {
        self.integrator.velocity()
    }

    pub fn displacement(&self) -> f32 {
        self.integrator.displacement()
    }

    /// Processes one sample. Must be called in timestamp order.
    pub fn tick(&mut self, sample: &SensorSample, session: &mut SetSession) -> Tick {
        let now = sample.timestamp_ms;
        let (dt, interval_substituted) = sample_interval(self.last_timestamp_ms, now, &self.timing);
        self.last_timestamp_ms = Some(now);
        if interval_substituted {
            session.stats_mut().intervals_substituted += 1;
        }

        let gravity = self.gravity.update(sample.accel, sample.gyro, dt);
        let accel = self.conditioner.process(gravity.vertical_accel);
        let stationary = self.zupt.update(accel, gravity.gyro_magnitude);
        let velocity = self.integrator.update_velocity(accel, dt, stationary);

        let active = self.state.phase();
        if active.is_active() {
            let displacement = self.integrator.accumulate_displacement(dt);
            match active {
                Phase::Concentric => {
                    self.rep.track_concentric(now, velocity, accel, displacement)
                }
                Phase::Eccentric => self.rep.track_eccentric(accel, displacement),
                Phase::Resting => {}
            }
            self.rep
                .track_magnitudes(gravity.accel_magnitude, gravity.gyro_magnitude);
            self.sample_curve(now, velocity, session);
        }

        let (next, step) = transition(self.state, now, velocity, &self.phase_config);
        self.state = next;

        let event = match step {
            Transition::Stay => None,
            Transition::StartConcentric => {
                self.integrator.reset_displacement();
                self.rep.begin(now, velocity, accel);
                self.rep
                    .track_magnitudes(gravity.accel_magnitude, gravity.gyro_magnitude);
                self.sample_curve(now, velocity, session);
                debug!("concentric start at {} ms, v={:.3}", now, velocity);
                Some(RepEvent::ConcentricStarted)
            }
            Transition::StartEccentric => {
                self.rep.end_concentric(now, self.integrator.displacement());
                debug!(
                    "eccentric start at {} ms, rom {:.1} cm",
                    now,
                    self.rep.rom_cm()
                );
                Some(RepEvent::EccentricStarted)
            }
            Transition::AbandonConcentric => {
                self.integrator.reset_displacement();
                session.stats_mut().concentric_timeouts += 1;
                warn!("concentric phase timed out at {} ms, attempt discarded", now);
                Some(RepEvent::Discarded(DiscardReason::ConcentricTimeout))
            }
            Transition::CompleteCycle {
                min_velocity,
                timed_out,
            } => {
                self.integrator.reset_displacement();
                if timed_out {
                    session.stats_mut().eccentric_timeouts += 1;
                    warn!("eccentric phase timed out at {} ms, closing rep", now);
                }
                Some(self.complete(now, min_velocity, session))
            }
        };

        Tick {
            phase: self.state.phase(),
            velocity,
            displacement: self.integrator.displacement(),
            vertical_accel: accel,
            stationary,
            interval_substituted,
            event,
        }
    }

    fn sample_curve(&mut self, now: u64, velocity: f32, session: &mut SetSession) {
        if !self.rep.sample_curve(now, velocity, session.curve_remaining()) {
            let stats = session.stats_mut();
            if stats.curve_points_dropped == 0 {
                warn!("velocity curve full at {} ms, dropping further points", now);
            }
            stats.curve_points_dropped = stats.curve_points_dropped.saturating_add(1);
        }
    }

    fn complete(&mut self, now: u64, min_velocity: f32, session: &mut SetSession) -> RepEvent {
        let rom_cm = self.rep.rom_cm();
        if rom_cm < self.phase_config.min_rom_cm {
            session.stats_mut().short_range_discards += 1;
            debug!("cycle discarded, rom {:.1} cm", rom_cm);
            return RepEvent::Discarded(DiscardReason::ShortRange { rom_cm });
        }

        let sequence = session.next_sequence();
        let record = self.rep.finish(sequence, now, min_velocity);
        info!(
            "rep {}: peak {:.2} m/s, mean {:.2} m/s, rom {:.1} cm",
            sequence, record.peak_velocity, record.mean_velocity, rom_cm
        );
        let stored = session.push(record);

        RepEvent::Completed { sequence, stored }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STANDARD_GRAVITY;
    use approx::assert_abs_diff_eq;

    fn pipeline() -> (Pipeline, SetSession) {
        (
            Pipeline::new(&VbtConfig::default(), &CalibrationResult::default()),
            SetSession::new(),
        )
    }

    fn vertical(accel: f32, t: u64) -> SensorSample {
        SensorSample::new([0.0, 0.0, STANDARD_GRAVITY + accel], [0.0; 3], t)
    }

    #[test]
    fn test_duplicate_timestamp_uses_nominal_interval() {
        let (mut pipeline, mut session) = pipeline();

        let tick = pipeline.tick(&vertical(2.0, 1000), &mut session);
        assert!(!tick.interval_substituted);
        let tick = pipeline.tick(&vertical(2.0, 1000), &mut session);
        assert!(tick.interval_substituted);

        // Both steps used 5 ms.
        let expected = (2.0 * 0.005 * 0.996 + 2.0 * 0.005) * 0.996;
        assert_abs_diff_eq!(tick.velocity, expected, epsilon = 1e-5);
        assert_eq!(session.stats().intervals_substituted, 1);
    }

    #[test]
    fn test_long_gap_uses_nominal_interval() {
        let (mut pipeline, mut session) = pipeline();

        pipeline.tick(&vertical(2.0, 0), &mut session);
        let before = pipeline.velocity();
        let tick = pipeline.tick(&vertical(2.0, 5000), &mut session);

        assert!(tick.interval_substituted);
        assert_abs_diff_eq!(tick.velocity, (before + 2.0 * 0.005) * 0.996, epsilon = 1e-6);
    }

    #[test]
    fn test_resting_never_moves() {
        let (mut pipeline, mut session) = pipeline();

        // Slow creep that stays under the start threshold.
        for i in 0..400u64 {
            let tick = pipeline.tick(&vertical(0.15, i * 5), &mut session);
            assert_eq!(tick.phase, Phase::Resting);
            assert_eq!(tick.displacement, 0.0);
        }
    }

    #[test]
    fn test_long_concentric_overflows_curve() {
        let (mut pipeline, mut session) = pipeline();

        // ~4.3 s of steady push makes ~85 due curve points, past the per-rep cap.
        for i in 0..900u64 {
            pipeline.tick(&vertical(0.5, i * 5), &mut session);
        }

        assert_eq!(pipeline.phase(), Phase::Concentric);
        assert!(session.stats().curve_points_dropped > 0);
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_cloned_pipeline_tracks_identically() {
        let (mut pipeline, mut session) = pipeline();
        for i in 0..60u64 {
            pipeline.tick(&vertical(2.0, i * 5), &mut session);
        }

        let mut copy = pipeline.clone();
        let mut copy_session = session.clone();
        for i in 60..120u64 {
            let a = pipeline.tick(&vertical(-1.0, i * 5), &mut session);
            let b = copy.tick(&vertical(-1.0, i * 5), &mut copy_session);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_first_event_is_concentric_start() {
        let (mut pipeline, mut session) = pipeline();
        let mut events = std::vec::Vec::new();

        for i in 0..100u64 {
            let tick = pipeline.tick(&vertical(2.0, i * 5), &mut session);
            if let Some(event) = tick.event {
                events.push(event);
            }
        }

        assert_eq!(events, [RepEvent::ConcentricStarted]);
        assert_eq!(pipeline.phase(), Phase::Concentric);
        assert!(pipeline.displacement() > 0.0);
    }
}
