use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::counters::CriticalityCounters;
use crate::error::BanzhafError;
use crate::hierarchy::ResolvedHierarchy;
use crate::index::PowerIndex;
use crate::outcome::Tally;
use crate::source::{seeded, seeded_stream, UniformSource};
use crate::trial::Trial;

/// Trials between progress events.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Monte Carlo estimate of the Banzhaf index over a resolved hierarchy.
///
/// Every trial flips one fair coin per block; block shares only decide how
/// much a yes coin moves its member, never the odds of the coin itself.
#[derive(Debug, Clone)]
pub struct MonteCarloEstimator<'h> {
    hierarchy: &'h ResolvedHierarchy,
    tally: Tally,
    trials: u64,
}

impl<'h> MonteCarloEstimator<'h> {
    pub fn new(hierarchy: &'h ResolvedHierarchy, trials: u64) -> Self {
        Self {
            hierarchy,
            tally: Tally::new(hierarchy.total_weight(), hierarchy.threshold()),
            trials,
        }
    }

    /// Runs every trial sequentially, drawing coins from `source`.
    pub fn run<R>(&self, source: &mut R) -> CriticalityCounters
    where
        R: UniformSource + ?Sized,
    {
        info!(
            target: "banzhaf::estimator",
            granularity = %self.hierarchy.granularity(),
            members = self.hierarchy.members().len(),
            units = self.hierarchy.unit_count(),
            threshold = self.tally.threshold(),
            trials = self.trials,
            "estimator.run=start"
        );
        let counters = self.run_trials(self.trials, source, 0);
        info!(
            target: "banzhaf::estimator",
            trials = counters.trials(),
            critical_total = counters.total(),
            "estimator.run=complete"
        );
        counters
    }

    /// Sequential run on the portable generator seeded with `seed`.
    pub fn run_seeded(&self, seed: u64) -> CriticalityCounters {
        self.run(&mut seeded(seed))
    }

    /// Splits the trials over `workers` independent streams of `seed`.
    ///
    /// Each worker accumulates its own counters; they are summed once all
    /// workers finish. Results depend on the worker count, not on scheduling.
    pub fn run_parallel(&self, seed: u64, workers: usize) -> CriticalityCounters {
        let workers = workers.max(1) as u64;
        info!(
            target: "banzhaf::estimator",
            granularity = %self.hierarchy.granularity(),
            units = self.hierarchy.unit_count(),
            trials = self.trials,
            workers,
            "estimator.run=start_parallel"
        );
        let base = self.trials / workers;
        let remainder = self.trials % workers;

        let counters = (0..workers)
            .into_par_iter()
            .map(|worker| {
                let share = base + u64::from(worker < remainder);
                let mut rng = seeded_stream(seed, worker);
                self.run_trials(share, &mut rng, worker)
            })
            .reduce(
                || CriticalityCounters::zeroed(Arc::clone(self.hierarchy.units())),
                |mut merged, partial| {
                    merged.merge(&partial);
                    merged
                },
            );
        info!(
            target: "banzhaf::estimator",
            trials = counters.trials(),
            critical_total = counters.total(),
            "estimator.run=complete"
        );
        counters
    }

    /// Runs and normalizes in one step.
    pub fn estimate<R>(&self, source: &mut R) -> Result<PowerIndex, BanzhafError>
    where
        R: UniformSource + ?Sized,
    {
        self.run(source).normalize()
    }

    fn run_trials<R>(&self, trials: u64, source: &mut R, worker: u64) -> CriticalityCounters
    where
        R: UniformSource + ?Sized,
    {
        let mut counters = CriticalityCounters::zeroed(Arc::clone(self.hierarchy.units()));
        let mut trial = Trial::new(self.hierarchy);

        for completed in 1..=trials {
            trial.cast(self.hierarchy, &self.tally, |_| source.flip());
            trial.for_each_critical_unit(self.hierarchy, &self.tally, |unit| {
                counters.increment(unit)
            });
            counters.record_trial();

            if completed % PROGRESS_INTERVAL == 0 {
                debug!(
                    target: "banzhaf::estimator",
                    worker,
                    completed,
                    of = trials,
                    "estimator.progress"
                );
            }
        }
        counters
    }
}
