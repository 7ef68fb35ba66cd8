use std::sync::Arc;

use tracing::info;

use crate::counters::CriticalityCounters;
use crate::error::BanzhafError;
use crate::hierarchy::Hierarchy;
use crate::outcome::Tally;
use crate::trial::Trial;

/// Largest body the exhaustive search accepts; 2^24 assignments.
pub const MAX_ENUMERATION_MEMBERS: usize = 24;

/// Exact member-level Banzhaf counts over every yes/no assignment.
///
/// Assignment `mask` gives member `i` a yes vote when bit `i` is set. Each
/// assignment is evaluated by the same trial logic the Monte Carlo path uses,
/// so the counters' `trials` is the number of assignments.
pub fn enumerate_exact(hierarchy: &Hierarchy) -> Result<CriticalityCounters, BanzhafError> {
    let members = hierarchy.len();
    if members > MAX_ENUMERATION_MEMBERS {
        return Err(BanzhafError::EnumerationTooLarge {
            members,
            max: MAX_ENUMERATION_MEMBERS,
        });
    }

    let body = hierarchy.flat();
    let tally = Tally::new(body.total_weight(), body.threshold());
    let assignments: u64 = 1 << members;
    info!(
        target: "banzhaf::enumeration",
        members,
        assignments,
        threshold = body.threshold(),
        "enumeration.run=start"
    );

    let mut counters = CriticalityCounters::zeroed(Arc::clone(body.units()));
    let mut trial = Trial::new(&body);
    for mask in 0..assignments {
        // flat bodies hold exactly one block per member, in member order
        trial.cast(&body, &tally, |block| mask & (1 << block) != 0);
        trial.for_each_critical_unit(&body, &tally, |unit| counters.increment(unit));
        counters.record_trial();
    }

    info!(
        target: "banzhaf::enumeration",
        critical_total = counters.total(),
        "enumeration.run=complete"
    );
    Ok(counters)
}
