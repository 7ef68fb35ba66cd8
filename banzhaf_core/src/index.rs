use std::sync::Arc;

use crate::hierarchy::{ResolvedHierarchy, UnitId};

/// Scale applied to the per-person derivative, roughly the adult population
/// the index is spread over.
pub const PER_PERSON_SCALE: f64 = 210_000_000.0;

/// Normalized criticality distribution: the Banzhaf power estimate per unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerIndex {
    units: Arc<[UnitId]>,
    weights: Vec<f64>,
}

impl PowerIndex {
    pub(crate) fn new(units: Arc<[UnitId]>, weights: Vec<f64>) -> Self {
        debug_assert_eq!(units.len(), weights.len());
        Self { units, weights }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn get(&self, unit: &UnitId) -> Option<f64> {
        self.units
            .iter()
            .position(|candidate| candidate == unit)
            .map(|idx| self.weights[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, f64)> {
        self.units.iter().zip(self.weights.iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Summed weight of every unit belonging to `member`.
    pub fn member_total(&self, member: &str) -> f64 {
        self.iter()
            .filter(|(unit, _)| unit.member == member)
            .map(|(_, weight)| weight)
            .sum()
    }

    /// Units ordered by descending weight, ties kept in unit order.
    pub fn ranked(&self) -> Vec<(&UnitId, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Largest absolute per-unit difference against another index over the same units.
    pub fn max_abs_diff(&self, other: &PowerIndex) -> Option<f64> {
        if self.units != other.units {
            return None;
        }
        Some(
            self.weights
                .iter()
                .zip(&other.weights)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max),
        )
    }

    /// Index per head of each unit's population, scaled by [`PER_PERSON_SCALE`].
    ///
    /// `None` when the hierarchy lacks population figures or was resolved over
    /// different units. Units with an empty population get `None` entries.
    pub fn per_person(&self, hierarchy: &ResolvedHierarchy) -> Option<Vec<Option<f64>>> {
        if hierarchy.units() != &self.units {
            return None;
        }
        let populations = hierarchy.unit_populations()?;
        Some(
            self.weights
                .iter()
                .zip(populations)
                .map(|(&weight, population)| {
                    (population > 0.0).then(|| weight / population * PER_PERSON_SCALE)
                })
                .collect(),
        )
    }
}
