//! Solved-problem counts per difficulty.

use serde::{Deserialize, Serialize};

/// Cumulative accepted-problem counts for one user, split by difficulty.
///
/// Counts are stored as `i64` to match SQLite `INTEGER` columns. The
/// external platform reports non-negative, mostly non-decreasing values,
/// but nothing downstream relies on that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolvedCounts {
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
}

impl SolvedCounts {
    /// All-zero counts, used for users with no recorded snapshot.
    pub const ZERO: SolvedCounts = SolvedCounts {
        easy: 0,
        medium: 0,
        hard: 0,
    };

    pub fn new(easy: i64, medium: i64, hard: i64) -> Self {
        Self { easy, medium, hard }
    }
}

impl std::fmt::Display for SolvedCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "easy={} medium={} hard={}", self.easy, self.medium, self.hard)
    }
}
