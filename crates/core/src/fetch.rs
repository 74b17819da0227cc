//! Abstract source of solved-problem counts.
//!
//! The poller only knows about [`SolvedCountSource`]; the LeetCode GraphQL
//! client is one implementation, test doubles are another.

use std::time::Duration;

use async_trait::async_trait;

use crate::counts::SolvedCounts;

/// Reasons a fetch produced no counts. Every variant is transient from the
/// poller's point of view: the user is skipped and retried next cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Request failed: {0}")]
    Request(String),

    /// The platform returned a non-2xx status code.
    #[error("Platform returned HTTP {0}")]
    HttpStatus(u16),

    /// The payload could not be decoded or lacked expected fields.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// The platform reported no such user.
    #[error("User not found on platform: {0}")]
    UserNotFound(String),

    /// The fetch did not complete within the per-user timeout.
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Fetches a user's cumulative solved counts from the external platform.
#[async_trait]
pub trait SolvedCountSource: Send + Sync {
    async fn fetch_solved_counts(&self, user_id: &str) -> Result<SolvedCounts, FetchError>;
}
