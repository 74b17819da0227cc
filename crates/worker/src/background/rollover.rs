//! Period rollover: rotates stored baselines once per period boundary.
//!
//! The loop wakes on a fixed check interval, computes the boundary of the
//! current period, and asks the store to rotate if that boundary has not
//! been rotated yet. The marker check and the rotation share one
//! transaction, so repeated checks within a period (or concurrent
//! processes) rotate at most once.

use std::time::Duration;

use chrono::Utc;
use leetboard_core::leaderboard::{leader, LeaderboardEntry};
use leetboard_core::period::rotation_due;
use leetboard_core::state::RolloverState;
use leetboard_core::types::Timestamp;
use leetboard_db::models::rotation::RotationOutcome;
use leetboard_db::repositories::RotationRepo;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::EngineResult;
use crate::service::LeaderboardService;

/// What a completed rotation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolloverReport {
    /// Start of the period that just began.
    pub boundary: Timestamp,
    /// Baseline rows written.
    pub baselines: u64,
    /// First place of the period that just closed.
    pub closing_leader: Option<LeaderboardEntry>,
    /// Entries on the closing leaderboard.
    pub closing_entries: usize,
}

/// Background service that rotates baselines at period boundaries.
pub struct PeriodRollover {
    service: LeaderboardService,
    check_interval: Duration,
    state: watch::Sender<RolloverState>,
}

impl PeriodRollover {
    pub fn new(service: LeaderboardService, check_interval: Duration) -> Self {
        let (state, _) = watch::channel(RolloverState::Waiting);
        Self {
            service,
            check_interval,
            state,
        }
    }

    /// Observe the rollover's state.
    pub fn subscribe(&self) -> watch::Receiver<RolloverState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> RolloverState {
        *self.state.borrow()
    }

    /// Run the check loop until `cancel` is triggered.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            period = %self.service.context().period,
            check_interval_secs = self.check_interval.as_secs(),
            "Period rollover started"
        );

        let mut interval = tokio::time::interval(self.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Period rollover cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.check(Utc::now()).await {
                        tracing::error!(error = %e, "Period rollover check failed");
                    }
                }
            }
        }

        self.transition(RolloverState::Stopped);
    }

    /// Rotate baselines if the period containing `now` has not been rotated.
    ///
    /// Returns `None` when nothing was due.
    pub async fn check(&self, now: Timestamp) -> EngineResult<Option<RolloverReport>> {
        let ctx = self.service.context();
        let boundary = ctx.period.period_start(now);

        if let Some(state) = RotationRepo::state(&ctx.pool).await? {
            if !rotation_due(Some(state.last_boundary), boundary) {
                tracing::debug!(%boundary, "Baselines already rotated for this period");
                return Ok(None);
            }
        }

        self.transition(RolloverState::RotatingBaseline);
        let result = self.rotate(boundary, now).await;
        self.transition(RolloverState::Waiting);
        result
    }

    async fn rotate(
        &self,
        boundary: Timestamp,
        now: Timestamp,
    ) -> EngineResult<Option<RolloverReport>> {
        let ctx = self.service.context();

        // Standings must be read before the previous period's baselines are
        // replaced.
        let previous_start = ctx.period.previous_period_start(boundary);
        let closing = self.service.get_leaderboard(previous_start, boundary).await?;
        let closing_leader = leader(&closing).cloned();

        match RotationRepo::rotate_if_due(&ctx.pool, boundary, now).await? {
            RotationOutcome::Rotated {
                boundary,
                baselines,
            } => {
                match &closing_leader {
                    Some(entry) => tracing::info!(
                        %previous_start,
                        user_id = %entry.user_id,
                        score = entry.score,
                        entries = closing.len(),
                        "Period closed"
                    ),
                    None => tracing::info!(%previous_start, "Period closed with no users"),
                }
                tracing::info!(%boundary, baselines, "Baselines rotated");

                Ok(Some(RolloverReport {
                    boundary,
                    baselines,
                    closing_leader,
                    closing_entries: closing.len(),
                }))
            }
            RotationOutcome::AlreadyRotated { last_boundary } => {
                tracing::debug!(%last_boundary, "Rotation raced with another writer");
                Ok(None)
            }
        }
    }

    fn transition(&self, next: RolloverState) {
        let previous = self.state.send_replace(next);
        if previous != next && !previous.can_transition(next) {
            tracing::warn!(from = ?previous, to = ?next, "Unexpected rollover state transition");
        }
    }
}
