//! Repository for the `baselines` table.

use leetboard_core::types::Timestamp;

use crate::models::baseline::Baseline;
use crate::DbPool;

const COLUMNS: &str = "user_id, easy, medium, hard, established_at, period_start";

/// Read access to stored baselines. Writes happen only through
/// [`RotationRepo`](super::RotationRepo) and user deletion.
pub struct BaselineRepo;

impl BaselineRepo {
    /// The stored baseline for a user if it was rotated for `period_start`.
    pub async fn find_for_period(
        pool: &DbPool,
        user_id: &str,
        period_start: Timestamp,
    ) -> Result<Option<Baseline>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM baselines WHERE user_id = ?1 AND period_start = ?2");
        sqlx::query_as::<_, Baseline>(&query)
            .bind(user_id)
            .bind(period_start)
            .fetch_optional(pool)
            .await
    }

    /// All stored baselines ordered by user.
    pub async fn list(pool: &DbPool) -> Result<Vec<Baseline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM baselines ORDER BY user_id");
        sqlx::query_as::<_, Baseline>(&query).fetch_all(pool).await
    }
}
