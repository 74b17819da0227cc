//! Leaderboard service: the operations exposed to outer layers.
//!
//! Every read is served from the store. No method here performs network
//! I/O; fresh counts arrive only through the poller (or [`add_snapshot`]).
//!
//! [`add_snapshot`]: LeaderboardService::add_snapshot

use chrono::Utc;
use futures::TryStreamExt;
use leetboard_core::counts::SolvedCounts;
use leetboard_core::error::CoreError;
use leetboard_core::leaderboard::{rank_entries, LeaderboardEntry, UserProgress};
use leetboard_core::progress::{period_progress, Progress};
use leetboard_core::types::Timestamp;
use leetboard_core::users::{normalize_display_name, validate_user_id};
use leetboard_db::models::baseline::Baseline;
use leetboard_db::models::snapshot::{AppendOutcome, Snapshot};
use leetboard_db::models::user::{CreateUser, User};
use leetboard_db::repositories::{BaselineRepo, SnapshotRepo, UserRepo};
use serde::Serialize;

use crate::baseline::resolve_baseline;
use crate::context::EngineContext;
use crate::error::EngineResult;

/// Entity name used in [`CoreError::NotFound`].
const USER_ENTITY: &str = "user";

/// Full contents of the store, for troubleshooting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreDump {
    /// Registered users, ordered by id.
    pub users: Vec<User>,
    /// Every snapshot, newest first, including retained history of removed
    /// users.
    pub snapshots: Vec<Snapshot>,
    /// Stored baselines, ordered by user.
    pub baselines: Vec<Baseline>,
}

/// Facade over the store for leaderboard reads and user management.
#[derive(Debug, Clone)]
pub struct LeaderboardService {
    ctx: EngineContext,
}

impl LeaderboardService {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user for tracking.
    ///
    /// Fails with [`CoreError::Conflict`] if the id is already registered.
    pub async fn register_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> EngineResult<User> {
        validate_user_id(user_id)?;
        let display_name = normalize_display_name(display_name)?;

        let input = CreateUser {
            user_id: user_id.to_string(),
            display_name,
        };
        let user = UserRepo::create(&self.ctx.pool, &input).await?.ok_or_else(|| {
            CoreError::Conflict(format!("User '{user_id}' is already registered"))
        })?;

        tracing::info!(user_id = %user.user_id, "User registered");
        Ok(user)
    }

    /// Stop tracking a user. Snapshot history is kept or purged according to
    /// the configured deletion policy.
    pub async fn remove_user(&self, user_id: &str) -> EngineResult<()> {
        let deleted = UserRepo::delete(&self.ctx.pool, user_id, self.ctx.deletion).await?;
        if !deleted {
            return Err(not_found(user_id).into());
        }

        let retained = SnapshotRepo::count_for_user(&self.ctx.pool, user_id).await?;
        tracing::info!(
            user_id,
            policy = ?self.ctx.deletion,
            retained_snapshots = retained,
            "User removed"
        );
        Ok(())
    }

    /// All registered users, ordered by id.
    pub async fn list_users(&self) -> EngineResult<Vec<User>> {
        Ok(UserRepo::list(&self.ctx.pool).await?)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Record a measurement for a registered user.
    ///
    /// Duplicate counts and out-of-order timestamps are absorbed and
    /// reported through the returned [`AppendOutcome`].
    pub async fn add_snapshot(
        &self,
        user_id: &str,
        counts: SolvedCounts,
        captured_at: Timestamp,
    ) -> EngineResult<AppendOutcome> {
        validate_user_id(user_id)?;
        validate_counts(&counts)?;

        if UserRepo::find_by_id(&self.ctx.pool, user_id).await?.is_none() {
            return Err(not_found(user_id).into());
        }

        let outcome = SnapshotRepo::append(&self.ctx.pool, user_id, counts, captured_at).await?;
        match &outcome {
            AppendOutcome::Inserted(snapshot) => {
                tracing::debug!(user_id, %counts, snapshot_id = snapshot.id, "Snapshot stored");
            }
            AppendOutcome::Unchanged => {
                tracing::debug!(user_id, %counts, "Counts unchanged, snapshot skipped");
            }
            AppendOutcome::Stale => {
                tracing::debug!(user_id, %captured_at, "Stale timestamp, snapshot skipped");
            }
        }
        Ok(outcome)
    }

    /// A user's full snapshot history, oldest first.
    pub async fn snapshot_history(&self, user_id: &str) -> EngineResult<Vec<Snapshot>> {
        let snapshots = SnapshotRepo::all_for_user(&self.ctx.pool, user_id)
            .try_collect()
            .await?;
        Ok(snapshots)
    }

    // -----------------------------------------------------------------------
    // Progress and leaderboard
    // -----------------------------------------------------------------------

    /// Progress of a registered user for the period starting at
    /// `period_start`, measured with data captured up to `as_of`.
    pub async fn progress(
        &self,
        user_id: &str,
        period_start: Timestamp,
        as_of: Timestamp,
    ) -> EngineResult<Progress> {
        validate_window(period_start, as_of)?;
        if UserRepo::find_by_id(&self.ctx.pool, user_id).await?.is_none() {
            return Err(not_found(user_id).into());
        }
        Ok(self.user_progress(user_id, period_start, as_of).await?)
    }

    /// Ranked leaderboard for the period starting at `period_start`.
    ///
    /// Every registered user appears, including those without snapshots. A
    /// failed lookup for one user is logged and scored as zero; failing to
    /// list users is an error. The outcome of each build is recorded in the
    /// leaderboard metrics.
    pub async fn get_leaderboard(
        &self,
        period_start: Timestamp,
        as_of: Timestamp,
    ) -> EngineResult<Vec<LeaderboardEntry>> {
        validate_window(period_start, as_of)?;

        let result = self.build_leaderboard(period_start, as_of).await;
        match &result {
            Ok(_) => self.ctx.metrics.record_leaderboard_built(Utc::now()),
            Err(_) => self.ctx.metrics.record_leaderboard_failed(),
        }
        result
    }

    async fn build_leaderboard(
        &self,
        period_start: Timestamp,
        as_of: Timestamp,
    ) -> EngineResult<Vec<LeaderboardEntry>> {
        let users = UserRepo::list(&self.ctx.pool).await?;
        let mut rows = Vec::with_capacity(users.len());

        for user in &users {
            let progress = match self.user_progress(&user.user_id, period_start, as_of).await {
                Ok(progress) => progress,
                Err(e) => {
                    tracing::warn!(
                        user_id = %user.user_id,
                        error = %e,
                        "Progress lookup failed, scoring as zero"
                    );
                    Progress::ZERO
                }
            };
            rows.push(UserProgress {
                user_id: user.user_id.clone(),
                display_name: user.label().to_string(),
                progress,
            });
        }

        Ok(rank_entries(rows, &self.ctx.scoring))
    }

    /// Leaderboard for the period containing `now`.
    pub async fn current_leaderboard(
        &self,
        now: Timestamp,
    ) -> EngineResult<Vec<LeaderboardEntry>> {
        let period_start = self.ctx.period.period_start(now);
        self.get_leaderboard(period_start, now).await
    }

    // -----------------------------------------------------------------------
    // Troubleshooting
    // -----------------------------------------------------------------------

    /// Dump users, snapshots and baselines as stored.
    pub async fn debug_dump(&self) -> EngineResult<StoreDump> {
        let pool = &self.ctx.pool;
        Ok(StoreDump {
            users: UserRepo::list(pool).await?,
            snapshots: SnapshotRepo::list_all(pool).await?,
            baselines: BaselineRepo::list(pool).await?,
        })
    }

    async fn user_progress(
        &self,
        user_id: &str,
        period_start: Timestamp,
        as_of: Timestamp,
    ) -> Result<Progress, sqlx::Error> {
        let pool = &self.ctx.pool;
        let baseline = resolve_baseline(pool, user_id, period_start).await?;
        let latest = SnapshotRepo::latest_at_or_before(pool, user_id, as_of).await?;

        Ok(period_progress(
            baseline.measurement().as_ref(),
            latest.map(|s| s.measurement()).as_ref(),
            period_start,
        ))
    }
}

fn not_found(user_id: &str) -> CoreError {
    CoreError::NotFound {
        entity: USER_ENTITY,
        id: user_id.to_string(),
    }
}

fn validate_counts(counts: &SolvedCounts) -> Result<(), CoreError> {
    if counts.easy < 0 || counts.medium < 0 || counts.hard < 0 {
        return Err(CoreError::Validation(format!(
            "Solved counts must be non-negative, got {counts}"
        )));
    }
    Ok(())
}

fn validate_window(period_start: Timestamp, as_of: Timestamp) -> Result<(), CoreError> {
    if period_start > as_of {
        return Err(CoreError::Validation(format!(
            "Period start {period_start} is after as_of {as_of}"
        )));
    }
    Ok(())
}
