use thiserror::Error;

/// Errors raised while building a [`SkipList`](crate::SkipList).
///
/// Reads and writes on a constructed list never fail. A missing key is reported as `None`.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SkipListError {
    #[error("level probability must be in (0, 1), got {0}")]
    InvalidProbability(f64),
    #[error("max level must be at least 1, got {0}")]
    InvalidMaxLevel(usize),
}
