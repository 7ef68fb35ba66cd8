use crate::hierarchy::ResolvedHierarchy;
use crate::outcome::{
    block_is_critical, winning_share, NationalOutcome, Side, Tally, MEMBER_MAJORITY,
};

/// State of one simulated vote across the whole hierarchy.
///
/// Buffers are sized once per hierarchy and overwritten by every
/// [`Trial::cast`]; nothing carries over between trials.
#[derive(Debug, Clone)]
pub struct Trial {
    block_votes: Vec<bool>,
    yes_shares: Vec<f64>,
    member_sides: Vec<Side>,
    outcome: NationalOutcome,
}

impl Trial {
    pub fn new(hierarchy: &ResolvedHierarchy) -> Self {
        let members = hierarchy.members().len();
        Self {
            block_votes: vec![false; hierarchy.blocks().len()],
            yes_shares: vec![0.0; members],
            member_sides: vec![Side::No; members],
            outcome: NationalOutcome {
                winner: Side::No,
                yes_total: 0,
                no_total: hierarchy.total_weight(),
            },
        }
    }

    /// Casts every block's vote, then aggregates members and the national tally.
    ///
    /// `vote` is called once per block, in hierarchy order, with the block index.
    pub fn cast<F>(&mut self, hierarchy: &ResolvedHierarchy, tally: &Tally, mut vote: F)
    where
        F: FnMut(usize) -> bool,
    {
        let mut yes_total = 0u64;
        for (member_idx, member) in hierarchy.members().iter().enumerate() {
            let mut yes_share = 0.0;
            for block_idx in member.blocks.clone() {
                let yes = vote(block_idx);
                self.block_votes[block_idx] = yes;
                if yes {
                    yes_share += hierarchy.blocks()[block_idx].share;
                }
            }
            let side = Side::from_yes(yes_share > MEMBER_MAJORITY);
            if side.is_yes() {
                yes_total += member.weight;
            }
            self.yes_shares[member_idx] = yes_share;
            self.member_sides[member_idx] = side;
        }
        self.outcome = tally.decide(yes_total);
    }

    pub fn outcome(&self) -> &NationalOutcome {
        &self.outcome
    }

    pub fn member_side(&self, member_idx: usize) -> Side {
        self.member_sides[member_idx]
    }

    pub fn yes_share(&self, member_idx: usize) -> f64 {
        self.yes_shares[member_idx]
    }

    /// Indices of members that voted with the national winner.
    pub fn winning_coalition(&self) -> impl Iterator<Item = usize> + '_ {
        let winner = self.outcome.winner;
        self.member_sides
            .iter()
            .enumerate()
            .filter(move |(_, side)| **side == winner)
            .map(|(idx, _)| idx)
    }

    /// Blocks of `member_idx` that voted with that member.
    pub fn winning_blocks<'a>(
        &'a self,
        hierarchy: &'a ResolvedHierarchy,
        member_idx: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        let side = self.member_sides[member_idx];
        hierarchy.members()[member_idx]
            .blocks
            .clone()
            .filter(move |&block_idx| self.block_votes[block_idx] == side.is_yes())
    }

    /// Reports every critical unit of this trial.
    ///
    /// A block counts only when its member is critical nationally and the block
    /// is pivotal inside the member.
    pub fn for_each_critical_unit<F>(
        &self,
        hierarchy: &ResolvedHierarchy,
        tally: &Tally,
        mut emit: F,
    ) where
        F: FnMut(usize),
    {
        for member_idx in self.winning_coalition() {
            let member = &hierarchy.members()[member_idx];
            if !tally.member_is_critical(&self.outcome, member.weight) {
                continue;
            }
            let share_behind =
                winning_share(self.member_sides[member_idx], self.yes_shares[member_idx]);
            for block_idx in self.winning_blocks(hierarchy, member_idx) {
                if block_is_critical(share_behind, hierarchy.blocks()[block_idx].share) {
                    emit(block_idx);
                }
            }
        }
    }

    /// Indices of members critical at the national level.
    pub fn critical_members(&self, hierarchy: &ResolvedHierarchy, tally: &Tally) -> Vec<usize> {
        self.winning_coalition()
            .filter(|&idx| tally.member_is_critical(&self.outcome, hierarchy.members()[idx].weight))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::{BlockAxis, BlockLayout, DemographicTable};
    use crate::hierarchy::{Hierarchy, Member};

    fn tally_for(hierarchy: &ResolvedHierarchy) -> Tally {
        Tally::new(hierarchy.total_weight(), hierarchy.threshold())
    }

    fn critical(trial: &Trial, hierarchy: &ResolvedHierarchy, tally: &Tally) -> Vec<usize> {
        let mut units = Vec::new();
        trial.for_each_critical_unit(hierarchy, tally, |unit| units.push(unit));
        units
    }

    #[test]
    fn dictator_member_carries_the_vote() {
        let body = Hierarchy::new(vec![Member::new("A", 3), Member::new("B", 2)])
            .unwrap()
            .flat();
        let tally = tally_for(&body);
        let mut trial = Trial::new(&body);
        trial.cast(&body, &tally, |block| block == 0);

        assert_eq!(trial.outcome().winner, Side::Yes);
        assert_eq!(trial.outcome().yes_total, 3);
        assert_eq!(trial.winning_coalition().collect::<Vec<_>>(), vec![0]);
        assert_eq!(trial.critical_members(&body, &tally), vec![0]);
        assert_eq!(critical(&trial, &body, &tally), vec![0]);
    }

    fn split_member(shares: &[(&str, f64)]) -> ResolvedHierarchy {
        let categories: Vec<&str> = shares.iter().map(|(name, _)| *name).collect();
        let layout = BlockLayout::new(vec![BlockAxis::new("race", categories)]);
        let table = DemographicTable::new().with_row("S", shares.iter().copied());
        Hierarchy::new(vec![Member::new("S", 1)])
            .unwrap()
            .members_with_blocks(&layout, &table, 1e-6)
            .unwrap()
    }

    #[test]
    fn unanimous_blocks_only_the_majority_block_is_critical() {
        let body = split_member(&[("X", 0.6), ("Y", 0.4)]);
        let tally = tally_for(&body);
        let mut trial = Trial::new(&body);
        trial.cast(&body, &tally, |_| true);

        assert_eq!(trial.member_side(0), Side::Yes);
        assert!((trial.yes_share(0) - 1.0).abs() < 1e-12);
        assert_eq!(critical(&trial, &body, &tally), vec![0]);
    }

    #[test]
    fn two_blocks_can_be_critical_together() {
        let body = split_member(&[("X", 0.3), ("Y", 0.3), ("Z", 0.4)]);
        let tally = tally_for(&body);
        let mut trial = Trial::new(&body);
        trial.cast(&body, &tally, |block| block < 2);

        assert_eq!(trial.member_side(0), Side::Yes);
        assert_eq!(critical(&trial, &body, &tally), vec![0, 1]);
    }

    #[test]
    fn no_side_blocks_use_no_share() {
        let body = split_member(&[("X", 0.3), ("Y", 0.3), ("Z", 0.4)]);
        let tally = tally_for(&body);
        let mut trial = Trial::new(&body);
        // only X yes: member no with 0.7 behind it
        trial.cast(&body, &tally, |block| block == 0);

        assert_eq!(trial.outcome().winner, Side::No);
        assert_eq!(trial.winning_blocks(&body, 0).collect::<Vec<_>>(), vec![1, 2]);
        // 0.7 - 0.3 = 0.4 and 0.7 - 0.4 = 0.3 both drop below one half
        assert_eq!(critical(&trial, &body, &tally), vec![1, 2]);
    }

    #[test]
    fn blocks_of_non_critical_members_are_skipped() {
        let layout = BlockLayout::new(vec![BlockAxis::new("race", ["X", "Y"])]);
        let table = DemographicTable::new()
            .with_row("A", [("X", 0.6), ("Y", 0.4)])
            .with_row("B", [("X", 0.6), ("Y", 0.4)])
            .with_row("C", [("X", 0.6), ("Y", 0.4)]);
        let body = Hierarchy::new(vec![
            Member::new("A", 1),
            Member::new("B", 1),
            Member::new("C", 1),
        ])
        .unwrap()
        .members_with_blocks(&layout, &table, 1e-6)
        .unwrap();
        let tally = tally_for(&body);
        let mut trial = Trial::new(&body);
        // every block yes: 3 of 3, no member alone flips the outcome
        trial.cast(&body, &tally, |_| true);

        assert_eq!(trial.outcome().yes_total, 3);
        assert!(trial.critical_members(&body, &tally).is_empty());
        assert!(critical(&trial, &body, &tally).is_empty());
    }
}
