//! Outcome and criticality rules shared by the sampled and enumerated paths.

/// Share of a member's population its winning side must exceed.
pub const MEMBER_MAJORITY: f64 = 0.5;

/// Side of a binary vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    #[inline]
    pub fn from_yes(yes: bool) -> Self {
        if yes {
            Side::Yes
        } else {
            Side::No
        }
    }

    #[inline]
    pub fn is_yes(self) -> bool {
        matches!(self, Side::Yes)
    }
}

/// Result of tallying one assignment of member votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NationalOutcome {
    pub winner: Side,
    pub yes_total: u64,
    pub no_total: u64,
}

impl NationalOutcome {
    pub fn winning_total(&self) -> u64 {
        match self.winner {
            Side::Yes => self.yes_total,
            Side::No => self.no_total,
        }
    }
}

/// Weighted majority rule over a fixed total weight.
///
/// Yes wins with at least `threshold` weight. No therefore wins with at least
/// `total - threshold + 1`, and each side is judged against its own bar when
/// deciding criticality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    total_weight: u64,
    threshold: u64,
}

impl Tally {
    pub fn new(total_weight: u64, threshold: u64) -> Self {
        Self {
            total_weight,
            threshold,
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn decide(&self, yes_total: u64) -> NationalOutcome {
        let winner = if yes_total >= self.threshold {
            Side::Yes
        } else {
            Side::No
        };
        NationalOutcome {
            winner,
            yes_total,
            no_total: self.total_weight.saturating_sub(yes_total),
        }
    }

    /// Weight the given side needs to carry the vote.
    pub fn side_threshold(&self, side: Side) -> u64 {
        match side {
            Side::Yes => self.threshold,
            Side::No => (self.total_weight + 1).saturating_sub(self.threshold),
        }
    }

    /// Whether a winning-coalition member of `weight` is pivotal.
    #[inline]
    pub fn member_is_critical(&self, outcome: &NationalOutcome, weight: u64) -> bool {
        outcome.winning_total().saturating_sub(weight) < self.side_threshold(outcome.winner)
    }
}

/// Whether a block that sided with its member is pivotal inside it.
///
/// `winning_share` is the member-internal share behind the member's own vote.
#[inline]
pub fn block_is_critical(winning_share: f64, block_share: f64) -> bool {
    winning_share - block_share < MEMBER_MAJORITY
}

/// Member-internal share behind the side the member voted for.
#[inline]
pub fn winning_share(side: Side, yes_share: f64) -> f64 {
    match side {
        Side::Yes => yes_share,
        Side::No => 1.0 - yes_share,
    }
}
