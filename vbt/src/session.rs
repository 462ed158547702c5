//! Per-set record keeping.

use heapless::Vec;
use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{MAX_CURVE_POINTS_PER_SET, MAX_REPS_PER_SET};
use crate::types::RepRecord;

/// Counters for everything the pipeline drops instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetStats {
    /// Completed reps that did not fit in the record buffer.
    pub records_dropped: u16,
    pub curve_points_dropped: u16,
    /// Cycles whose concentric ROM was below the minimum.
    pub short_range_discards: u16,
    /// Concentric phases abandoned at the timeout.
    pub concentric_timeouts: u16,
    /// Eccentric phases cut short by the timeout (still emitted if long enough).
    pub eccentric_timeouts: u16,
    /// Samples integrated with the nominal interval instead of the measured one.
    pub intervals_substituted: u32,
}

/// Set-level aggregate handed to the upload side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SetSummary {
    pub rep_count: u16,
    /// Mean of the per-rep mean concentric velocities (m/s).
    pub avg_velocity: f32,
    /// Fastest concentric peak in the set (m/s).
    pub peak_velocity: f32,
    /// Drop from the first to the last rep's mean velocity, in percent.
    pub velocity_loss_pct: Option<f32>,
}

/// Reps recorded during one set.
#[derive(Debug, Clone, Default)]
pub struct SetSession {
    records: Vec<RepRecord, MAX_REPS_PER_SET>,
    rep_count: u16,
    curve_points: usize,
    stats: SetStats,
}

impl SetSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next sequence number. Counts every emitted rep, stored or not.
    pub fn next_sequence(&mut self) -> u16 {
        self.rep_count = self.rep_count.saturating_add(1);
        self.rep_count
    }

    /// Stores a finished rep; false when the set is already full.
    pub fn push(&mut self, record: RepRecord) -> bool {
        let points = record.curve.len();
        match self.records.push(record) {
            Ok(()) => {
                self.curve_points += points;
                true
            }
            Err(record) => {
                warn!("set full, dropping rep {}", record.sequence);
                self.stats.records_dropped = self.stats.records_dropped.saturating_add(1);
                false
            }
        }
    }

    /// Room left in the set-wide velocity curve pool.
    pub fn curve_remaining(&self) -> usize {
        MAX_CURVE_POINTS_PER_SET.saturating_sub(self.curve_points)
    }

    pub fn records(&self) -> &[RepRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&RepRecord> {
        self.records.last()
    }

    pub fn rep_count(&self) -> u16 {
        self.rep_count
    }

    pub fn stats(&self) -> &SetStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SetStats {
        &mut self.stats
    }

    pub fn summary(&self) -> SetSummary {
        let reps = self.records.as_slice();
        if reps.is_empty() {
            return SetSummary {
                rep_count: 0,
                avg_velocity: 0.0,
                peak_velocity: 0.0,
                velocity_loss_pct: None,
            };
        }

        let avg_velocity = reps.iter().map(|r| r.mean_velocity).sum::<f32>() / reps.len() as f32;
        let peak_velocity = reps
            .iter()
            .map(|r| r.peak_velocity)
            .fold(f32::MIN, f32::max);

        let first = reps[0].mean_velocity;
        let velocity_loss_pct = match reps.last() {
            Some(last) if reps.len() >= 2 && first > 0.0 => {
                Some((first - last.mean_velocity) / first * 100.0)
            }
            _ => None,
        };

        SetSummary {
            rep_count: reps.len() as u16,
            avg_velocity,
            peak_velocity,
            velocity_loss_pct,
        }
    }
}
