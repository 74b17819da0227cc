//! Rotation marker and outcomes.

use leetboard_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// The single `rotation_state` row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RotationState {
    pub last_boundary: Timestamp,
    pub rotated_at: Timestamp,
}

/// Result of [`RotationRepo::rotate_if_due`](crate::repositories::RotationRepo::rotate_if_due).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// Baselines were replaced for `boundary`.
    Rotated { boundary: Timestamp, baselines: u64 },
    /// A rotation for this boundary (or a later one) already happened.
    AlreadyRotated { last_boundary: Timestamp },
}
