use thiserror::Error;

/// Reason a demographic lookup could not produce a usable share.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupDetail {
    #[error("member is absent from the demographic table")]
    MissingMember,
    #[error("category {0:?} is absent from the member's row")]
    MissingCategory(String),
    #[error("share {share} for category {category:?} is not within [0, 1]")]
    InvalidShare { category: String, share: f64 },
}

/// Structural defect of a block layout, found before any share is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("axis {0:?} has no categories")]
    EmptyAxis(String),
    #[error("axis {0:?} appears more than once")]
    DuplicateAxis(String),
    #[error("category {category:?} appears more than once on axis {axis:?}")]
    DuplicateCategory { axis: String, category: String },
}

/// Failures raised while resolving a voting body or estimating its index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BanzhafError {
    #[error("demographic lookup failed for member {member:?}: {detail}")]
    DataLookup { member: String, detail: LookupDetail },
    #[error(
        "block shares for member {member:?} along axis {axis:?} sum to {found}, expected {expected}"
    )]
    ShareSumInvariant {
        member: String,
        axis: String,
        expected: f64,
        found: f64,
    },
    #[error("invalid block layout: {0}")]
    InvalidLayout(#[from] LayoutError),
    #[error("no unit was critical across {trials} trials")]
    DegenerateRun { trials: u64 },
    #[error("member {0:?} is listed more than once")]
    DuplicateMember(String),
    #[error("exact enumeration supports at most {max} members, body has {members}")]
    EnumerationTooLarge { members: usize, max: usize },
}

impl BanzhafError {
    /// Degenerate runs are recoverable by the caller; everything else points at bad input.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, BanzhafError::DegenerateRun { .. })
    }
}
