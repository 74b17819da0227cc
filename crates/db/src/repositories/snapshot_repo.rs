//! Repository for the `snapshots` table (append-only time series).

use futures::stream::BoxStream;
use leetboard_core::counts::SolvedCounts;
use leetboard_core::types::Timestamp;

use crate::models::snapshot::{AppendOutcome, Snapshot};
use crate::DbPool;

/// Column list for `snapshots` SELECT queries.
const COLUMNS: &str = "id, user_id, easy, medium, hard, captured_at";

/// Full-history query used by [`SnapshotRepo::all_for_user`]. Kept as a
/// literal so the returned stream can borrow it for `'static`.
const ALL_FOR_USER_QUERY: &str = "\
    SELECT id, user_id, easy, medium, hard, captured_at \
    FROM snapshots WHERE user_id = ?1 \
    ORDER BY captured_at ASC";

/// Provides append and lookup operations for snapshots.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Append a snapshot unless it would duplicate the latest counts or
    /// break strictly increasing `captured_at` for the user.
    ///
    /// The dedup and ordering checks run inside the INSERT itself, so the
    /// append is atomic with respect to concurrent writers. A skipped
    /// append is not an error.
    pub async fn append(
        pool: &DbPool,
        user_id: &str,
        counts: SolvedCounts,
        captured_at: Timestamp,
    ) -> Result<AppendOutcome, sqlx::Error> {
        let query = format!(
            "INSERT INTO snapshots (user_id, easy, medium, hard, captured_at) \
             SELECT ?1, ?2, ?3, ?4, ?5 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM snapshots WHERE user_id = ?1 AND captured_at >= ?5 \
             ) \
             AND NOT EXISTS ( \
                 SELECT 1 FROM ( \
                     SELECT easy, medium, hard FROM snapshots \
                     WHERE user_id = ?1 ORDER BY captured_at DESC LIMIT 1 \
                 ) AS latest \
                 WHERE latest.easy = ?2 AND latest.medium = ?3 AND latest.hard = ?4 \
             ) \
             ON CONFLICT (user_id, captured_at) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Snapshot>(&query)
            .bind(user_id)
            .bind(counts.easy)
            .bind(counts.medium)
            .bind(counts.hard)
            .bind(captured_at)
            .fetch_optional(pool)
            .await?;

        if let Some(snapshot) = inserted {
            return Ok(AppendOutcome::Inserted(snapshot));
        }

        // Nothing written: report why.
        match Self::latest(pool, user_id).await? {
            Some(latest) if latest.captured_at >= captured_at => Ok(AppendOutcome::Stale),
            _ => Ok(AppendOutcome::Unchanged),
        }
    }

    /// Most recent snapshot with `captured_at <= at`.
    pub async fn latest_at_or_before(
        pool: &DbPool,
        user_id: &str,
        at: Timestamp,
    ) -> Result<Option<Snapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM snapshots \
             WHERE user_id = ?1 AND captured_at <= ?2 \
             ORDER BY captured_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, Snapshot>(&query)
            .bind(user_id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// Earliest snapshot with `captured_at >= at`.
    ///
    /// `captured_at` is unique per user, so there is never a tie to break.
    pub async fn earliest_at_or_after(
        pool: &DbPool,
        user_id: &str,
        at: Timestamp,
    ) -> Result<Option<Snapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM snapshots \
             WHERE user_id = ?1 AND captured_at >= ?2 \
             ORDER BY captured_at ASC LIMIT 1"
        );
        sqlx::query_as::<_, Snapshot>(&query)
            .bind(user_id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// First snapshot ever recorded for the user.
    pub async fn earliest(pool: &DbPool, user_id: &str) -> Result<Option<Snapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM snapshots WHERE user_id = ?1 \
             ORDER BY captured_at ASC LIMIT 1"
        );
        sqlx::query_as::<_, Snapshot>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent snapshot for the user.
    pub async fn latest(pool: &DbPool, user_id: &str) -> Result<Option<Snapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM snapshots WHERE user_id = ?1 \
             ORDER BY captured_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, Snapshot>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lazily stream a user's full history, oldest first.
    ///
    /// Each call issues a fresh query, so the stream can be restarted by
    /// calling again.
    pub fn all_for_user<'a>(
        pool: &'a DbPool,
        user_id: &'a str,
    ) -> BoxStream<'a, Result<Snapshot, sqlx::Error>> {
        sqlx::query_as::<_, Snapshot>(ALL_FOR_USER_QUERY)
            .bind(user_id)
            .fetch(pool)
    }

    /// Number of stored snapshots for the user.
    pub async fn count_for_user(pool: &DbPool, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM snapshots WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Every stored snapshot, newest first.
    pub async fn list_all(pool: &DbPool) -> Result<Vec<Snapshot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM snapshots ORDER BY captured_at DESC, user_id");
        sqlx::query_as::<_, Snapshot>(&query).fetch_all(pool).await
    }
}
