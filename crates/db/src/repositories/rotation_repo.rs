//! Repository for baseline rotation (`baselines` + `rotation_state`).

use leetboard_core::period::rotation_due;
use leetboard_core::types::Timestamp;

use crate::models::rotation::{RotationOutcome, RotationState};
use crate::DbPool;

/// Performs period rotations and exposes the rotation marker.
pub struct RotationRepo;

impl RotationRepo {
    /// The last completed rotation, if any.
    pub async fn state(pool: &DbPool) -> Result<Option<RotationState>, sqlx::Error> {
        sqlx::query_as::<_, RotationState>(
            "SELECT last_boundary, rotated_at FROM rotation_state WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
    }

    /// Rotate every registered user's baseline to the snapshot in force at
    /// `boundary`, unless a rotation for `boundary` already happened.
    ///
    /// The marker check, the baseline replacement, and the marker update
    /// share one transaction, so a rotation is applied at most once per
    /// boundary and readers never observe a half-rotated table. Users
    /// without a snapshot at or before `boundary` are left without a stored
    /// baseline.
    pub async fn rotate_if_due(
        pool: &DbPool,
        boundary: Timestamp,
        rotated_at: Timestamp,
    ) -> Result<RotationOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let last_boundary: Option<Timestamp> =
            sqlx::query_scalar("SELECT last_boundary FROM rotation_state WHERE id = 1")
                .fetch_optional(&mut *tx)
                .await?;

        if let Some(last) = last_boundary {
            if !rotation_due(Some(last), boundary) {
                tx.commit().await?;
                return Ok(RotationOutcome::AlreadyRotated {
                    last_boundary: last,
                });
            }
        }

        sqlx::query("DELETE FROM baselines")
            .execute(&mut *tx)
            .await?;

        let baselines = sqlx::query(
            "INSERT INTO baselines (user_id, easy, medium, hard, established_at, period_start) \
             SELECT s.user_id, s.easy, s.medium, s.hard, s.captured_at, ?1 \
             FROM users u \
             JOIN snapshots s ON s.user_id = u.user_id \
             WHERE s.captured_at = ( \
                 SELECT MAX(s2.captured_at) FROM snapshots s2 \
                 WHERE s2.user_id = u.user_id AND s2.captured_at <= ?1 \
             )",
        )
        .bind(boundary)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "INSERT INTO rotation_state (id, last_boundary, rotated_at) VALUES (1, ?1, ?2) \
             ON CONFLICT (id) DO UPDATE SET \
                 last_boundary = excluded.last_boundary, \
                 rotated_at = excluded.rotated_at",
        )
        .bind(boundary)
        .bind(rotated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RotationOutcome::Rotated {
            boundary,
            baselines,
        })
    }
}
