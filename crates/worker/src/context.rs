use leetboard_core::metrics::Metrics;
use leetboard_core::period::PeriodRule;
use leetboard_core::scoring::ScoringPolicy;
use leetboard_db::models::user::DeletionPolicy;
use leetboard_db::DbPool;

use crate::config::EngineConfig;

/// Shared engine state handed to the service and both background loops.
///
/// Built once at startup and cheaply cloneable (the pool and the metrics
/// registry are reference counted, the rest is `Copy`).
#[derive(Debug, Clone)]
pub struct EngineContext {
    /// Database connection pool.
    pub pool: DbPool,
    /// Point weights, fixed for the process lifetime.
    pub scoring: ScoringPolicy,
    /// Period boundary rule.
    pub period: PeriodRule,
    /// What happens to snapshot history when a user is removed.
    pub deletion: DeletionPolicy,
    /// Process-wide metrics, shared with the fetch client.
    pub metrics: Metrics,
}

impl EngineContext {
    pub fn new(
        pool: DbPool,
        scoring: ScoringPolicy,
        period: PeriodRule,
        deletion: DeletionPolicy,
        metrics: Metrics,
    ) -> Self {
        Self {
            pool,
            scoring,
            period,
            deletion,
            metrics,
        }
    }

    /// Build the context from loaded configuration.
    pub fn from_config(pool: DbPool, config: &EngineConfig, metrics: Metrics) -> Self {
        Self::new(pool, config.scoring, config.period, config.deletion, metrics)
    }
}
