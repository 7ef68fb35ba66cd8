use std::sync::Arc;

use crate::error::BanzhafError;
use crate::hierarchy::UnitId;
use crate::index::PowerIndex;

/// Per-unit count of trials in which the unit was critical.
///
/// Counts are stored by unit index, in the unit order of the resolved
/// hierarchy they were created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalityCounters {
    units: Arc<[UnitId]>,
    counts: Vec<u64>,
    trials: u64,
}

impl CriticalityCounters {
    pub fn zeroed(units: Arc<[UnitId]>) -> Self {
        let counts = vec![0; units.len()];
        Self {
            units,
            counts,
            trials: 0,
        }
    }

    #[inline]
    pub fn increment(&mut self, unit: usize) {
        self.counts[unit] += 1;
    }

    #[inline]
    pub fn record_trial(&mut self) {
        self.trials += 1;
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn get(&self, unit: &UnitId) -> Option<u64> {
        self.units
            .iter()
            .position(|candidate| candidate == unit)
            .map(|idx| self.counts[idx])
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, u64)> {
        self.units.iter().zip(self.counts.iter().copied())
    }

    /// Folds another accumulator over the same units into this one.
    pub fn merge(&mut self, other: &CriticalityCounters) {
        debug_assert_eq!(self.units, other.units, "merging counters over different units");
        for (count, extra) in self.counts.iter_mut().zip(&other.counts) {
            *count += extra;
        }
        self.trials += other.trials;
    }

    /// Divides every count by the total.
    pub fn normalize(&self) -> Result<PowerIndex, BanzhafError> {
        let total = self.total();
        if total == 0 {
            return Err(BanzhafError::DegenerateRun {
                trials: self.trials,
            });
        }
        let total = total as f64;
        let weights = self
            .counts
            .iter()
            .map(|&count| count as f64 / total)
            .collect();
        Ok(PowerIndex::new(Arc::clone(&self.units), weights))
    }
}
