#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Descriptive extremes of a signal over one repetition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// Streaming min/max/mean, no sample storage.
#[derive(Debug, Clone, Copy)]
pub struct RunningStats {
    min: f32,
    max: f32,
    sum: f32,
    count: u32,
}

impl RunningStats {
    pub const fn new() -> Self {
        Self {
            min: f32::MAX,
            max: f32::MIN,
            sum: 0.0,
            count: 0,
        }
    }

    pub fn push(&mut self, value: f32) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f32
    }

    /// All zeros when nothing was pushed.
    pub fn summary(&self) -> Stats {
        if self.count == 0 {
            return Stats::default();
        }

        Stats {
            min: self.min,
            max: self.max,
            mean: self.mean(),
        }
    }
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}
