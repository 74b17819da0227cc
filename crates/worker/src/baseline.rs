//! Baseline resolution for a scoring period.
//!
//! A rotated baseline stored for the requested period wins. Otherwise the
//! baseline is selected from the snapshot history:
//!
//! 1. the earliest snapshot captured at or after `period_start`;
//! 2. otherwise the earliest snapshot ever recorded;
//! 3. otherwise all-zero counts.

use leetboard_core::counts::SolvedCounts;
use leetboard_core::progress::Measurement;
use leetboard_core::types::Timestamp;
use leetboard_db::repositories::{BaselineRepo, SnapshotRepo};
use leetboard_db::DbPool;

/// Where a resolved baseline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSource {
    /// A row written by period rotation for this period.
    Rotated,
    /// Selected from the user's snapshot history.
    Snapshot,
    /// The user has no snapshots.
    Zero,
}

/// The reference counts progress is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBaseline {
    pub counts: SolvedCounts,
    /// Capture time of the underlying snapshot; `None` for a zero baseline.
    pub established_at: Option<Timestamp>,
    pub source: BaselineSource,
}

impl ResolvedBaseline {
    pub fn zero() -> Self {
        Self {
            counts: SolvedCounts::ZERO,
            established_at: None,
            source: BaselineSource::Zero,
        }
    }

    /// The baseline as one end of a progress computation. A zero baseline
    /// has no capture time and yields `None`.
    pub fn measurement(&self) -> Option<Measurement> {
        self.established_at.map(|captured_at| Measurement {
            counts: self.counts,
            captured_at,
        })
    }
}

/// Select a baseline from snapshot history alone, ignoring stored rows.
pub async fn baseline_for(
    pool: &DbPool,
    user_id: &str,
    period_start: Timestamp,
) -> Result<ResolvedBaseline, sqlx::Error> {
    let snapshot = match SnapshotRepo::earliest_at_or_after(pool, user_id, period_start).await? {
        Some(snapshot) => Some(snapshot),
        None => SnapshotRepo::earliest(pool, user_id).await?,
    };

    Ok(match snapshot {
        Some(snapshot) => ResolvedBaseline {
            counts: snapshot.counts(),
            established_at: Some(snapshot.captured_at),
            source: BaselineSource::Snapshot,
        },
        None => ResolvedBaseline::zero(),
    })
}

/// Resolve the baseline used for `user_id` in the period starting at
/// `period_start`, preferring a rotated baseline for that exact period.
pub async fn resolve_baseline(
    pool: &DbPool,
    user_id: &str,
    period_start: Timestamp,
) -> Result<ResolvedBaseline, sqlx::Error> {
    if let Some(stored) = BaselineRepo::find_for_period(pool, user_id, period_start).await? {
        return Ok(ResolvedBaseline {
            counts: stored.counts(),
            established_at: Some(stored.established_at),
            source: BaselineSource::Rotated,
        });
    }

    baseline_for(pool, user_id, period_start).await
}
