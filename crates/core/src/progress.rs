//! Period progress: the clamped per-difficulty delta between a baseline and
//! the latest snapshot.

use serde::Serialize;

use crate::counts::SolvedCounts;
use crate::types::Timestamp;

/// Per-difficulty progress over a scoring period. Always non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
}

impl Progress {
    pub const ZERO: Progress = Progress {
        easy: 0,
        medium: 0,
        hard: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// A measurement used as one end of a progress computation.
///
/// Both baselines and snapshots reduce to this shape: the counts and the
/// instant they were captured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub counts: SolvedCounts,
    pub captured_at: Timestamp,
}

/// Clamped delta `max(0, latest - baseline)` for each difficulty.
///
/// Each category is clamped independently, so a reset in one difficulty
/// never cancels out gains in another.
pub fn progress_between(baseline: &SolvedCounts, latest: &SolvedCounts) -> Progress {
    Progress {
        easy: (latest.easy - baseline.easy).max(0),
        medium: (latest.medium - baseline.medium).max(0),
        hard: (latest.hard - baseline.hard).max(0),
    }
}

/// Progress for a period given the resolved baseline and latest snapshot.
///
/// Returns zero when:
/// - there is no latest snapshot at or before `as_of`,
/// - the latest snapshot predates `period_start` (nothing changed during the period),
/// - the baseline was established after the latest snapshot.
///
/// A missing baseline is treated as all-zero counts.
pub fn period_progress(
    baseline: Option<&Measurement>,
    latest: Option<&Measurement>,
    period_start: Timestamp,
) -> Progress {
    let Some(latest) = latest else {
        return Progress::ZERO;
    };
    if latest.captured_at < period_start {
        return Progress::ZERO;
    }
    match baseline {
        Some(baseline) if baseline.captured_at > latest.captured_at => Progress::ZERO,
        Some(baseline) => progress_between(&baseline.counts, &latest.counts),
        None => progress_between(&SolvedCounts::ZERO, &latest.counts),
    }
}
