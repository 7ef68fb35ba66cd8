use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BanzhafError, LayoutError, LookupDetail};

/// Expected sum of the shares along every axis of a member.
pub const FULL_SHARE: f64 = 1.0;

/// Granularity a run is carried out at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Members vote as indivisible units.
    #[default]
    Flat,
    /// Members split along one demographic axis.
    SingleLevelBlocks,
    /// Members split along several composed axes.
    MultiLevelBlocks,
}

impl Granularity {
    /// Builtin block layout used when no explicit axes are configured.
    pub fn default_layout(self) -> BlockLayout {
        match self {
            Granularity::Flat => BlockLayout::flat(),
            Granularity::SingleLevelBlocks => BlockLayout::race(),
            Granularity::MultiLevelBlocks => BlockLayout::race_age_sex(),
        }
    }

    /// Whether a layout with `axes` axes belongs to this granularity.
    pub fn accepts_axes(self, axes: usize) -> bool {
        match self {
            Granularity::Flat => axes == 0,
            Granularity::SingleLevelBlocks => axes == 1,
            Granularity::MultiLevelBlocks => axes > 1,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Flat => "flat",
            Granularity::SingleLevelBlocks => "single_level_blocks",
            Granularity::MultiLevelBlocks => "multi_level_blocks",
        };
        f.write_str(name)
    }
}

/// One categorical dimension a member's population is split along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAxis {
    pub name: String,
    pub categories: Vec<String>,
}

impl BlockAxis {
    pub fn new<N, I, C>(name: N, categories: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }
}

/// Composite key of a block: one category per axis, in axis order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockLabel(pub Vec<String>);

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("|"))
    }
}

/// Product partition of a member's population along independent axes.
///
/// An empty layout is the flat case: every member is a single block holding
/// its whole population.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockLayout {
    axes: Vec<BlockAxis>,
}

impl BlockLayout {
    pub fn new(axes: Vec<BlockAxis>) -> Self {
        Self { axes }
    }

    pub fn flat() -> Self {
        Self::default()
    }

    /// Single race axis using the column names of the ACS share table.
    pub fn race() -> Self {
        Self::new(vec![BlockAxis::new(
            "race",
            ["white_pct", "black_pct", "hisp_other_pct"],
        )])
    }

    /// Race × age × sex, using the column names of the KFF share table.
    pub fn race_age_sex() -> Self {
        Self::new(vec![
            BlockAxis::new(
                "race",
                [
                    "White",
                    "Black",
                    "Hispanic",
                    "Asian",
                    "American Indian/Alaska Native",
                    "Native Hawaiian/Other Pacific Islander",
                    "Multiple Races",
                ],
            ),
            BlockAxis::new(
                "age",
                [
                    "Adults 19-25",
                    "Adults 26-34",
                    "Adults 35-54",
                    "Adults 55-64",
                    "65+",
                ],
            ),
            BlockAxis::new("sex", ["Male", "Female"]),
        ])
    }

    pub fn axes(&self) -> &[BlockAxis] {
        &self.axes
    }

    pub fn is_flat(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn granularity(&self) -> Granularity {
        match self.axes.len() {
            0 => Granularity::Flat,
            1 => Granularity::SingleLevelBlocks,
            _ => Granularity::MultiLevelBlocks,
        }
    }

    /// Rejects axes that would yield no blocks or repeated unit keys.
    pub fn check(&self) -> Result<(), LayoutError> {
        let mut axis_names = HashSet::with_capacity(self.axes.len());
        for axis in &self.axes {
            if !axis_names.insert(axis.name.as_str()) {
                return Err(LayoutError::DuplicateAxis(axis.name.clone()));
            }
            if axis.categories.is_empty() {
                return Err(LayoutError::EmptyAxis(axis.name.clone()));
            }
            let mut seen = HashSet::with_capacity(axis.categories.len());
            for category in &axis.categories {
                if !seen.insert(category.as_str()) {
                    return Err(LayoutError::DuplicateCategory {
                        axis: axis.name.clone(),
                        category: category.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of blocks per member; 1 for the flat layout.
    pub fn block_count(&self) -> usize {
        self.axes
            .iter()
            .map(|axis| axis.categories.len())
            .product()
    }

    /// Resolves the blocks of one member in nested-loop order (first axis outermost).
    ///
    /// Every axis is checked to cover the member's whole population before any
    /// block is produced; a block's share is the product of its per-axis shares.
    pub fn resolve<S>(
        &self,
        member: &str,
        source: &S,
        tolerance: f64,
    ) -> Result<Vec<(Option<BlockLabel>, f64)>, BanzhafError>
    where
        S: DemographicSource + ?Sized,
    {
        if self.is_flat() {
            return Ok(vec![(None, FULL_SHARE)]);
        }
        self.check()?;
        if !source.has_member(member) {
            return Err(BanzhafError::DataLookup {
                member: member.to_string(),
                detail: LookupDetail::MissingMember,
            });
        }

        let mut axis_shares: Vec<Vec<f64>> = Vec::with_capacity(self.axes.len());
        for axis in &self.axes {
            let mut shares = Vec::with_capacity(axis.categories.len());
            for category in &axis.categories {
                let share = source.share(member, category).ok_or_else(|| {
                    BanzhafError::DataLookup {
                        member: member.to_string(),
                        detail: LookupDetail::MissingCategory(category.clone()),
                    }
                })?;
                if !share.is_finite() || !(0.0..=1.0).contains(&share) {
                    return Err(BanzhafError::DataLookup {
                        member: member.to_string(),
                        detail: LookupDetail::InvalidShare {
                            category: category.clone(),
                            share,
                        },
                    });
                }
                shares.push(share);
            }
            let found: f64 = shares.iter().sum();
            if (found - FULL_SHARE).abs() > tolerance {
                return Err(BanzhafError::ShareSumInvariant {
                    member: member.to_string(),
                    axis: axis.name.clone(),
                    expected: FULL_SHARE,
                    found,
                });
            }
            axis_shares.push(shares);
        }

        let mut blocks = Vec::with_capacity(self.block_count());
        let mut cursor = vec![0usize; self.axes.len()];
        loop {
            let mut share = FULL_SHARE;
            let mut label = Vec::with_capacity(self.axes.len());
            for (axis_idx, &category_idx) in cursor.iter().enumerate() {
                share *= axis_shares[axis_idx][category_idx];
                label.push(self.axes[axis_idx].categories[category_idx].clone());
            }
            blocks.push((Some(BlockLabel(label)), share));

            // odometer increment, last axis fastest
            let mut axis_idx = self.axes.len();
            loop {
                if axis_idx == 0 {
                    return Ok(blocks);
                }
                axis_idx -= 1;
                cursor[axis_idx] += 1;
                if cursor[axis_idx] < self.axes[axis_idx].categories.len() {
                    break;
                }
                cursor[axis_idx] = 0;
            }
        }
    }
}

/// Read access to per-member category shares.
pub trait DemographicSource {
    fn has_member(&self, member: &str) -> bool;

    fn share(&self, member: &str, category: &str) -> Option<f64>;
}

/// In-memory demographic table keyed by member id, then category label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemographicTable {
    rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl DemographicTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, member: impl Into<String>, category: impl Into<String>, share: f64) {
        self.rows
            .entry(member.into())
            .or_default()
            .insert(category.into(), share);
    }

    pub fn with_row<I, C>(mut self, member: &str, shares: I) -> Self
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<String>,
    {
        for (category, share) in shares {
            self.insert(member, category, share);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl DemographicSource for DemographicTable {
    fn has_member(&self, member: &str) -> bool {
        self.rows.contains_key(member)
    }

    fn share(&self, member: &str, category: &str) -> Option<f64> {
        self.rows.get(member)?.get(category).copied()
    }
}
