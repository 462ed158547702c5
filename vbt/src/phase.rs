//! Repetition phase state machine.
//!
//! Resting -> Concentric -> Eccentric -> Resting. Each state carries the
//! timestamps it needs, so the transition function is a single exhaustive
//! match.

use crate::config::PhaseConfig;
use crate::types::Phase;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseState {
    Resting {
        /// End of the previous attempt, if any this set.
        last_end_ms: Option<u64>,
    },
    Concentric {
        start_ms: u64,
    },
    Eccentric {
        start_ms: u64,
        concentric_end_ms: u64,
        /// Most negative velocity seen since the top of the lift.
        min_velocity: f32,
    },
}

impl Default for PhaseState {
    fn default() -> Self {
        PhaseState::Resting { last_end_ms: None }
    }
}

impl PhaseState {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseState::Resting { .. } => Phase::Resting,
            PhaseState::Concentric { .. } => Phase::Concentric,
            PhaseState::Eccentric { .. } => Phase::Eccentric,
        }
    }
}

/// What the state machine decided for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Stay,
    StartConcentric,
    StartEccentric,
    /// Concentric ran past the timeout; the attempt is thrown away.
    AbandonConcentric,
    /// Up and down both done, or the descent timed out.
    CompleteCycle { min_velocity: f32, timed_out: bool },
}

/// Milliseconds from `from` to `to`, saturating.
pub(crate) fn elapsed_ms(from: u64, to: u64) -> u32 {
    to.saturating_sub(from).min(u64::from(u32::MAX)) as u32
}

/// Advances `state` for a sample at `now_ms` with the given vertical velocity.
pub fn transition(
    state: PhaseState,
    now_ms: u64,
    velocity: f32,
    config: &PhaseConfig,
) -> (PhaseState, Transition) {
    match state {
        PhaseState::Resting { last_end_ms } => {
            let rested = last_end_ms.map_or(true, |end| elapsed_ms(end, now_ms) > config.min_rest_ms);

            if rested && velocity > config.start_velocity {
                (PhaseState::Concentric { start_ms: now_ms }, Transition::StartConcentric)
            } else {
                (state, Transition::Stay)
            }
        }

        PhaseState::Concentric { start_ms } => {
            let duration = elapsed_ms(start_ms, now_ms);

            if velocity < config.concentric_end_velocity && duration >= config.min_concentric_ms {
                let eccentric = PhaseState::Eccentric {
                    start_ms,
                    concentric_end_ms: now_ms,
                    min_velocity: velocity,
                };
                (eccentric, Transition::StartEccentric)
            } else if duration > config.phase_timeout_ms {
                let resting = PhaseState::Resting {
                    last_end_ms: Some(now_ms),
                };
                (resting, Transition::AbandonConcentric)
            } else {
                (state, Transition::Stay)
            }
        }

        PhaseState::Eccentric {
            start_ms,
            concentric_end_ms,
            min_velocity,
        } => {
            let min_velocity = min_velocity.min(velocity);
            let duration = elapsed_ms(concentric_end_ms, now_ms);

            let timed_out = duration > config.phase_timeout_ms;
            let settled = min_velocity < config.eccentric_min_velocity
                && velocity.abs() < config.eccentric_end_velocity
                && duration >= config.min_eccentric_ms;

            if timed_out || settled {
                let resting = PhaseState::Resting {
                    last_end_ms: Some(now_ms),
                };
                (
                    resting,
                    Transition::CompleteCycle {
                        min_velocity,
                        timed_out: timed_out && !settled,
                    },
                )
            } else {
                let eccentric = PhaseState::Eccentric {
                    start_ms,
                    concentric_end_ms,
                    min_velocity,
                };
                (eccentric, Transition::Stay)
            }
        }
    }
}
