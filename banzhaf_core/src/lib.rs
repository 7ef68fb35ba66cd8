//! Banzhaf power index estimation for hierarchical voting bodies.
//!
//! A body is a set of weighted members (states), each optionally split into
//! demographic blocks that decide the member's vote by internal majority.
//! [`estimate`] resolves the blocks, samples independent fair-coin votes for
//! every block and normalizes how often each unit was pivotal. Small flat
//! bodies can also be counted exactly with [`enumerate_exact`].

pub mod config;
mod counters;
mod demographics;
mod enumeration;
mod error;
mod estimator;
mod hierarchy;
mod index;
pub mod outcome;
mod source;
mod trial;

pub use config::{
    load_estimator_config_from_env, load_member_table_from_env, ConfigError, EstimatorConfig,
    MemberTable,
};
pub use counters::CriticalityCounters;
pub use demographics::{
    BlockAxis, BlockLabel, BlockLayout, DemographicSource, DemographicTable, Granularity,
};
pub use enumeration::{enumerate_exact, MAX_ENUMERATION_MEMBERS};
pub use error::{BanzhafError, LayoutError, LookupDetail};
pub use estimator::MonteCarloEstimator;
pub use hierarchy::{
    decisive_threshold, Hierarchy, Member, ResolvedBlock, ResolvedHierarchy, ResolvedMember,
    UnitId,
};
pub use index::{PowerIndex, PER_PERSON_SCALE};
pub use outcome::{NationalOutcome, Side, Tally};
pub use source::{seeded, seeded_stream, ScriptedSource, UniformSource};
pub use trial::Trial;

/// Outcome of a configured estimation run.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub hierarchy: ResolvedHierarchy,
    pub counters: CriticalityCounters,
    pub index: PowerIndex,
}

impl Estimate {
    /// Per-person derivative of the index, when populations are known.
    pub fn per_person(&self) -> Option<Vec<Option<f64>>> {
        self.index.per_person(&self.hierarchy)
    }
}

/// Resolves `body` at the configured granularity and runs the Monte Carlo estimate.
///
/// Demographic failures surface before any trial runs. `table` is not
/// consulted in flat mode.
pub fn estimate<S>(
    body: &Hierarchy,
    table: &S,
    config: &EstimatorConfig,
) -> Result<Estimate, BanzhafError>
where
    S: DemographicSource + ?Sized,
{
    let layout = config.layout();
    let hierarchy = if layout.is_flat() {
        body.flat()
    } else {
        body.members_with_blocks(&layout, table, config.share_tolerance())?
    };

    let estimator = MonteCarloEstimator::new(&hierarchy, config.trials());
    let counters = if config.workers() > 1 {
        estimator.run_parallel(config.seed(), config.workers())
    } else {
        estimator.run_seeded(config.seed())
    };
    let index = counters.normalize()?;

    Ok(Estimate {
        hierarchy,
        counters,
        index,
    })
}
