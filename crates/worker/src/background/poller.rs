//! Periodic snapshot poller.
//!
//! Each cycle visits every registered user, fetches their solved counts
//! under a per-user timeout, and appends a snapshot. One user's failure
//! (network error, malformed payload, timeout, storage error) is logged and
//! never stops the sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use leetboard_core::fetch::{FetchError, SolvedCountSource};
use leetboard_core::state::PollerState;
use leetboard_db::models::snapshot::AppendOutcome;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::EngineResult;
use crate::service::LeaderboardService;

/// Counters for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    /// Registered users at the start of the cycle.
    pub users: usize,
    /// Snapshots written.
    pub stored: usize,
    /// Fetches whose counts matched the latest snapshot.
    pub unchanged: usize,
    /// Fetches or writes that failed.
    pub failed: usize,
}

/// Background service that refreshes snapshots on a fixed interval.
pub struct Poller {
    service: LeaderboardService,
    source: Arc<dyn SolvedCountSource>,
    interval: Duration,
    fetch_timeout: Duration,
    state: watch::Sender<PollerState>,
}

impl Poller {
    pub fn new(
        service: LeaderboardService,
        source: Arc<dyn SolvedCountSource>,
        interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            service,
            source,
            interval,
            fetch_timeout,
            state,
        }
    }

    /// Observe the poller's state.
    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Run the poll loop until `cancel` is triggered.
    ///
    /// The first cycle starts immediately; later cycles start on each
    /// interval tick.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            fetch_timeout_ms = self.fetch_timeout.as_millis() as u64,
            "Poller started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Poller cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.run_cycle(&cancel).await {
                        Ok(summary) => {
                            tracing::info!(
                                users = summary.users,
                                stored = summary.stored,
                                unchanged = summary.unchanged,
                                failed = summary.failed,
                                "Poll cycle complete"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Poll cycle failed");
                        }
                    }
                }
            }
        }

        self.transition(PollerState::Stopped);
    }

    /// Run one sweep over all registered users.
    ///
    /// Returns early with the partial summary if `cancel` fires between or
    /// during fetches. Only failing to list users is an error.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> EngineResult<PollSummary> {
        let users = self.service.list_users().await?;
        let mut summary = PollSummary {
            users: users.len(),
            ..PollSummary::default()
        };

        for user in &users {
            if cancel.is_cancelled() {
                break;
            }

            self.transition(PollerState::Fetching);
            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                result = tokio::time::timeout(
                    self.fetch_timeout,
                    self.source.fetch_solved_counts(&user.user_id),
                ) => result.unwrap_or(Err(FetchError::Timeout(self.fetch_timeout))),
            };

            let counts = match fetched {
                Ok(counts) => counts,
                Err(e) => {
                    tracing::warn!(user_id = %user.user_id, error = %e, "Fetch failed, skipping");
                    summary.failed += 1;
                    continue;
                }
            };

            self.transition(PollerState::Storing);
            match self
                .service
                .add_snapshot(&user.user_id, counts, Utc::now())
                .await
            {
                Ok(AppendOutcome::Inserted(_)) => summary.stored += 1,
                Ok(AppendOutcome::Unchanged | AppendOutcome::Stale) => summary.unchanged += 1,
                Err(e) => {
                    tracing::warn!(user_id = %user.user_id, error = %e, "Snapshot write failed");
                    summary.failed += 1;
                }
            }
        }

        self.transition(PollerState::Idle);
        Ok(summary)
    }

    fn transition(&self, next: PollerState) {
        let previous = self.state.send_replace(next);
        if previous != next && !previous.can_transition(next) {
            tracing::warn!(from = ?previous, to = ?next, "Unexpected poller state transition");
        }
    }
}
