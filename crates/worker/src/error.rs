use leetboard_core::error::CoreError;

/// Error type for engine operations.
///
/// Wraps [`CoreError`] for domain errors and adds the storage failure case,
/// so callers can tell "nothing to show" apart from "store unavailable".
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `leetboard_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for engine return values.
pub type EngineResult<T> = Result<T, EngineError>;
