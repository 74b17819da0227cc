//! Tracked user entity and registration DTO.

use leetboard_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub registered_at: Timestamp,
}

impl User {
    /// Name shown on the leaderboard: the display name, or the slug.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

/// DTO for registering a user. Validated by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub user_id: UserId,
    pub display_name: Option<String>,
}

/// What happens to a removed user's snapshot history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DeletionPolicy {
    /// Keep snapshots for audit; only the user row and baseline go.
    #[default]
    RetainSnapshots,
    /// Delete snapshots together with the user.
    PurgeSnapshots,
}
