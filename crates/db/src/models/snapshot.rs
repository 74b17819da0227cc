//! Solved-count snapshots (append-only).

use leetboard_core::counts::SolvedCounts;
use leetboard_core::progress::Measurement;
use leetboard_core::types::{Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// One stored measurement of a user's cumulative counts.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Snapshot {
    pub id: i64,
    pub user_id: UserId,
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
    pub captured_at: Timestamp,
}

impl Snapshot {
    pub fn counts(&self) -> SolvedCounts {
        SolvedCounts::new(self.easy, self.medium, self.hard)
    }

    pub fn measurement(&self) -> Measurement {
        Measurement {
            counts: self.counts(),
            captured_at: self.captured_at,
        }
    }
}

/// Result of [`SnapshotRepo::append`](crate::repositories::SnapshotRepo::append).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// A new row was written.
    Inserted(Snapshot),
    /// Counts match the most recent row; nothing written.
    Unchanged,
    /// The timestamp is not after the most recent row; nothing written.
    Stale,
}

impl AppendOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, AppendOutcome::Inserted(_))
    }
}
