//! Per-user baselines for the current scoring period.

use leetboard_core::counts::SolvedCounts;
use leetboard_core::progress::Measurement;
use leetboard_core::types::{Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A stored baseline written by a period rotation.
///
/// `established_at` is the capture time of the snapshot it was copied from;
/// `period_start` is the boundary the rotation ran for.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Baseline {
    pub user_id: UserId,
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
    pub established_at: Timestamp,
    pub period_start: Timestamp,
}

impl Baseline {
    pub fn counts(&self) -> SolvedCounts {
        SolvedCounts::new(self.easy, self.medium, self.hard)
    }

    pub fn measurement(&self) -> Measurement {
        Measurement {
            counts: self.counts(),
            captured_at: self.established_at,
        }
    }
}
