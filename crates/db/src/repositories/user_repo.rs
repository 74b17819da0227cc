//! Repository for the `users` table.

use chrono::Utc;

use crate::models::user::{CreateUser, DeletionPolicy, User};
use crate::DbPool;

/// Column list for `users` queries.
const COLUMNS: &str = "user_id, display_name, registered_at";

/// Provides CRUD operations for tracked users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user.
    ///
    /// Returns `None` if a user with the same id already exists.
    pub async fn create(pool: &DbPool, input: &CreateUser) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (user_id, display_name, registered_at) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT (user_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.user_id)
            .bind(&input.display_name)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &DbPool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE user_id = ?1");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by id.
    pub async fn list(pool: &DbPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY user_id");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Delete a user and their baseline, applying `policy` to their
    /// snapshot history. Runs in one transaction.
    ///
    /// Returns `true` if the user existed.
    pub async fn delete(
        pool: &DbPool,
        user_id: &str,
        policy: DeletionPolicy,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM baselines WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if policy == DeletionPolicy::PurgeSnapshots {
            let purged = sqlx::query("DELETE FROM snapshots WHERE user_id = ?1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            tracing::debug!(user_id, purged, "Purged snapshot history");
        }

        let deleted = sqlx::query("DELETE FROM users WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}
