use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::demographics::{BlockLabel, BlockLayout, DemographicSource, Granularity};
use crate::error::BanzhafError;

/// Top-level voting unit, e.g. a state and its electoral votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub weight: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

impl Member {
    pub fn new(id: impl Into<String>, weight: u64) -> Self {
        Self {
            id: id.into(),
            weight,
            population: None,
        }
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }
}

/// Smallest weight that wins a vote over `total_weight`: `⌈total/2⌉`.
pub fn decisive_threshold(total_weight: u64) -> u64 {
    total_weight.div_ceil(2)
}

/// The voting body as loaded: members and their weights, no block structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    members: Vec<Member>,
}

impl Hierarchy {
    pub fn new(members: Vec<Member>) -> Result<Self, BanzhafError> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member.id.as_str()) {
                return Err(BanzhafError::DuplicateMember(member.id.clone()));
            }
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.members.iter().map(|member| member.weight).sum()
    }

    pub fn threshold(&self) -> u64 {
        decisive_threshold(self.total_weight())
    }

    /// Members as single indivisible blocks.
    pub fn flat(&self) -> ResolvedHierarchy {
        let partitions = self.members.iter().map(|_| vec![(None, 1.0)]).collect();
        self.assemble(BlockLayout::flat(), partitions)
    }

    /// Resolves every member's block partition from `table`.
    ///
    /// The whole body is resolved up front, so a single missing or malformed
    /// row fails the call before any trial can run.
    pub fn members_with_blocks<S>(
        &self,
        layout: &BlockLayout,
        table: &S,
        tolerance: f64,
    ) -> Result<ResolvedHierarchy, BanzhafError>
    where
        S: DemographicSource + ?Sized,
    {
        let partitions = self
            .members
            .iter()
            .map(|member| layout.resolve(&member.id, table, tolerance))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.assemble(layout.clone(), partitions))
    }

    fn assemble(
        &self,
        layout: BlockLayout,
        partitions: Vec<Vec<(Option<BlockLabel>, f64)>>,
    ) -> ResolvedHierarchy {
        let unit_count = partitions.iter().map(Vec::len).sum();
        let mut members = Vec::with_capacity(self.members.len());
        let mut blocks = Vec::with_capacity(unit_count);
        let mut units = Vec::with_capacity(unit_count);

        for (member, partition) in self.members.iter().zip(partitions) {
            let start = blocks.len();
            for (label, share) in partition {
                units.push(UnitId {
                    member: member.id.clone(),
                    block: label.clone(),
                });
                blocks.push(ResolvedBlock { label, share });
            }
            members.push(ResolvedMember {
                id: member.id.clone(),
                weight: member.weight,
                population: member.population,
                blocks: start..blocks.len(),
            });
        }

        let total_weight = self.total_weight();
        ResolvedHierarchy {
            layout,
            members,
            blocks,
            units: units.into(),
            total_weight,
            threshold: decisive_threshold(total_weight),
        }
    }
}

/// Key of a unit that criticality is counted for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId {
    pub member: String,
    pub block: Option<BlockLabel>,
}

impl UnitId {
    pub fn member(id: impl Into<String>) -> Self {
        Self {
            member: id.into(),
            block: None,
        }
    }

    pub fn block<I, C>(id: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            member: id.into(),
            block: Some(BlockLabel(categories.into_iter().map(Into::into).collect())),
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.block {
            Some(label) => write!(f, "{}/{}", self.member, label),
            None => f.write_str(&self.member),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBlock {
    pub label: Option<BlockLabel>,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMember {
    pub id: String,
    pub weight: u64,
    pub population: Option<u64>,
    /// Range into [`ResolvedHierarchy::blocks`].
    pub blocks: Range<usize>,
}

/// A body with every member's block partition resolved, ready to simulate.
///
/// Blocks are stored contiguously; a block's position in that list is also its
/// unit index in criticality counters.
#[derive(Debug, Clone)]
pub struct ResolvedHierarchy {
    layout: BlockLayout,
    members: Vec<ResolvedMember>,
    blocks: Vec<ResolvedBlock>,
    units: Arc<[UnitId]>,
    total_weight: u64,
    threshold: u64,
}

impl ResolvedHierarchy {
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn granularity(&self) -> Granularity {
        self.layout.granularity()
    }

    pub fn members(&self) -> &[ResolvedMember] {
        &self.members
    }

    pub fn blocks(&self) -> &[ResolvedBlock] {
        &self.blocks
    }

    pub fn member_blocks(&self, member: &ResolvedMember) -> &[ResolvedBlock] {
        &self.blocks[member.blocks.clone()]
    }

    pub fn units(&self) -> &Arc<[UnitId]> {
        &self.units
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Absolute population of every unit, `None` when no member carries one.
    ///
    /// Units of members without a population count as empty.
    pub fn unit_populations(&self) -> Option<Vec<f64>> {
        if self.members.iter().all(|member| member.population.is_none()) {
            return None;
        }
        let mut populations = Vec::with_capacity(self.blocks.len());
        for member in &self.members {
            let population = member.population.unwrap_or(0) as f64;
            populations.extend(
                self.member_blocks(member)
                    .iter()
                    .map(|block| population * block.share),
            );
        }
        Some(populations)
    }
}
