use log::trace;

use crate::config::{FilterConfig, TimingConfig};

/// Elapsed seconds between two sample timestamps.
///
/// Missing, non-increasing and overlong gaps fall back to the nominal
/// interval so a stalled read cannot inject a huge integration step. The
/// flag is true when the fallback was used.
pub fn sample_interval(previous_ms: Option<u64>, now_ms: u64, timing: &TimingConfig) -> (f32, bool) {
    let nominal = timing.nominal_interval_ms as f32 / 1000.0;

    match previous_ms.and_then(|prev| now_ms.checked_sub(prev)) {
        Some(delta) if delta > 0 && delta <= u64::from(timing.max_gap_ms) => {
            (delta as f32 / 1000.0, false)
        }
        Some(delta) => {
            trace!("sample gap of {} ms replaced by nominal interval", delta);
            (nominal, true)
        }
        // First sample, or the clock went backwards.
        None => (nominal, previous_ms.is_some()),
    }
}

/// Vertical velocity and displacement.
#[derive(Debug, Clone)]
pub struct Integrator {
    leak: f32,
    clamp: f32,
    zupt_decay: f32,
    velocity: f32,
    displacement: f32,
}

impl Integrator {
    pub fn new(config: &FilterConfig, zupt_decay: f32) -> Self {
        Self {
            leak: config.velocity_leak,
            clamp: config.velocity_clamp,
            zupt_decay,
            velocity: 0.0,
            displacement: 0.0,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn displacement(&self) -> f32 {
        self.displacement
    }

    /// Integrates acceleration, or decays toward zero while stationary.
    pub fn update_velocity(&mut self, accel: f32, dt: f32, stationary: bool) -> f32 {
        let velocity = if stationary {
            self.velocity * self.zupt_decay
        } else {
            (self.velocity + accel * dt) * self.leak
        };

        self.velocity = velocity.clamp(-self.clamp, self.clamp);
        self.velocity
    }

    pub fn accumulate_displacement(&mut self, dt: f32) -> f32 {
        self.displacement += self.velocity * dt;
        self.displacement
    }

    pub fn reset_displacement(&mut self) {
        self.displacement = 0.0;
    }
}
