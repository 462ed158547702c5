//! Synthetic 200 Hz sample streams for the end-to-end tests.

#![allow(dead_code)]

use vbt::{Engine, Feed, SensorSample, Tick, STANDARD_GRAVITY};

pub const PERIOD_MS: u64 = 5;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Generates flat-mounted samples, one vertical acceleration per segment.
pub struct Stream {
    t: u64,
}

impl Stream {
    pub fn new() -> Self {
        Self { t: 0 }
    }

    pub fn now(&self) -> u64 {
        self.t
    }

    pub fn sample(&mut self, vertical_accel: f32) -> SensorSample {
        let sample = SensorSample::new(
            [0.0, 0.0, STANDARD_GRAVITY + vertical_accel],
            [0.0; 3],
            self.t,
        );
        self.t += PERIOD_MS;
        sample
    }

    /// `(acceleration, samples)` pairs.
    pub fn segments(&mut self, segments: &[(f32, usize)]) -> Vec<SensorSample> {
        let mut out = Vec::new();
        for &(accel, count) in segments {
            for _ in 0..count {
                out.push(self.sample(accel));
            }
        }
        out
    }
}

/// Rest, push up hard, brake, then lower and settle: one clean rep of ~6.5 cm.
pub const FULL_REP: &[(f32, usize)] = &[
    (2.0, 40),
    (-2.0, 40),
    (0.0, 20),
    (-1.5, 30),
    (1.5, 30),
    (0.0, 150),
];

/// Same shape but the lift only travels ~0.6 cm.
pub const SHORT_REP: &[(f32, usize)] = &[
    (2.0, 14),
    (-2.0, 14),
    (0.0, 20),
    (-1.5, 30),
    (1.5, 30),
    (0.0, 150),
];

pub const REST: (f32, usize) = (0.0, 50);

pub fn recording_engine() -> Engine {
    let mut engine = Engine::default();
    engine.start_set().unwrap();
    engine
}

pub fn feed_all(engine: &mut Engine, samples: &[SensorSample]) -> Vec<Tick> {
    samples
        .iter()
        .filter_map(|sample| match engine.feed(sample) {
            Feed::Tick(tick) => Some(tick),
            _ => None,
        })
        .collect()
}
