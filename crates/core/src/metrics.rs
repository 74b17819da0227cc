//! Prometheus metrics for the fetch client and the leaderboard builder.
//!
//! One [`Metrics`] value is created at startup and cloned into every
//! component that records into it; clones share the same registry.

use std::fmt;
use std::time::Duration;

use prometheus::{
    register_gauge_with_registry, register_histogram_with_registry,
    register_int_counter_vec_with_registry, register_int_gauge_with_registry, Encoder, Gauge,
    Histogram, IntCounterVec, IntGauge, Registry, TextEncoder,
};

use crate::types::Timestamp;

/// Response code label for a request that failed before any HTTP status.
pub const CODE_ERROR: &str = "error";

/// Response code label for a request that hit its timeout.
pub const CODE_TIMEOUT: &str = "timeout";

#[derive(Clone)]
pub struct Metrics {
    api_response_codes: IntCounterVec,
    api_latency: Histogram,
    null_users_found: IntCounterVec,
    leetcode_api_error: IntGauge,
    leaderboard_last_updated: Gauge,
    leaderboard_update_error: IntGauge,
    registry: Registry,
}

impl Metrics {
    /// Create the metric set on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let api_response_codes = register_int_counter_vec_with_registry!(
            "leetboard_api_response_codes_total",
            "Response codes of requests made to the LeetCode GraphQL API",
            &["code"],
            registry
        )?;

        let api_latency = register_histogram_with_registry!(
            "leetboard_api_latency_seconds",
            "Latency of requests made to the LeetCode GraphQL API",
            registry
        )?;

        let null_users_found = register_int_counter_vec_with_registry!(
            "leetboard_null_users_found_total",
            "Times the LeetCode GraphQL API returned a null or nonexistent user",
            &["username"],
            registry
        )?;

        let leetcode_api_error = register_int_gauge_with_registry!(
            "leetboard_leetcode_api_error",
            "Outcome of the last LeetCode API call: 0 for success and 1 for failure",
            registry
        )?;

        let leaderboard_last_updated = register_gauge_with_registry!(
            "leetboard_leaderboard_last_updated",
            "Unix timestamp of the last successful leaderboard build",
            registry
        )?;

        let leaderboard_update_error = register_int_gauge_with_registry!(
            "leetboard_leaderboard_update_error",
            "Outcome of the last leaderboard build: 0 for success and 1 for failure",
            registry
        )?;

        Ok(Self {
            api_response_codes,
            api_latency,
            null_users_found,
            leetcode_api_error,
            leaderboard_last_updated,
            leaderboard_update_error,
            registry,
        })
    }

    // -----------------------------------------------------------------------
    // Fetch client
    // -----------------------------------------------------------------------

    /// Count one API response under `code` (an HTTP status or one of
    /// [`CODE_ERROR`] / [`CODE_TIMEOUT`]).
    pub fn record_api_response(&self, code: &str) {
        self.api_response_codes.with_label_values(&[code]).inc();
    }

    pub fn observe_api_latency(&self, elapsed: Duration) {
        self.api_latency.observe(elapsed.as_secs_f64());
    }

    pub fn record_null_user(&self, user_id: &str) {
        self.null_users_found.with_label_values(&[user_id]).inc();
    }

    /// Record whether the last API call failed.
    pub fn set_api_error(&self, failed: bool) {
        self.leetcode_api_error.set(i64::from(failed));
    }

    // -----------------------------------------------------------------------
    // Leaderboard builds
    // -----------------------------------------------------------------------

    /// Record a successful build at `at`.
    pub fn record_leaderboard_built(&self, at: Timestamp) {
        self.leaderboard_last_updated.set(at.timestamp() as f64);
        self.leaderboard_update_error.set(0);
    }

    /// Record a failed build. The last-updated time is left unchanged.
    pub fn record_leaderboard_failed(&self) {
        self.leaderboard_update_error.set(1);
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn api_responses(&self, code: &str) -> u64 {
        self.api_response_codes.with_label_values(&[code]).get()
    }

    pub fn api_error(&self) -> bool {
        self.leetcode_api_error.get() != 0
    }

    pub fn null_users(&self, user_id: &str) -> u64 {
        self.null_users_found.with_label_values(&[user_id]).get()
    }

    /// Unix seconds of the last successful build, or 0 if none.
    pub fn leaderboard_last_updated(&self) -> i64 {
        self.leaderboard_last_updated.get() as i64
    }

    pub fn leaderboard_update_failed(&self) -> bool {
        self.leaderboard_update_error.get() != 0
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}
