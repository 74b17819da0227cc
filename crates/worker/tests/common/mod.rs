#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc, Weekday};
use leetboard_core::counts::SolvedCounts;
use leetboard_core::fetch::{FetchError, SolvedCountSource};
use leetboard_core::metrics::Metrics;
use leetboard_core::period::PeriodRule;
use leetboard_core::scoring::ScoringPolicy;
use leetboard_core::types::Timestamp;
use leetboard_db::models::user::DeletionPolicy;
use leetboard_worker::context::EngineContext;
use leetboard_worker::service::LeaderboardService;
use sqlx::SqlitePool;

/// A timestamp in March 2024. Sundays that month: 3, 10, 17, 24, 31.
pub fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

/// Build a service with weights 1/3/5 and weekly periods starting Sunday.
pub fn test_service(pool: SqlitePool) -> LeaderboardService {
    test_service_with(pool, DeletionPolicy::RetainSnapshots)
}

pub fn test_service_with(pool: SqlitePool, deletion: DeletionPolicy) -> LeaderboardService {
    LeaderboardService::new(EngineContext::new(
        pool,
        ScoringPolicy::default(),
        PeriodRule::weekly(Weekday::Sun),
        deletion,
        Metrics::new().unwrap(),
    ))
}

/// Scripted response for one user.
#[derive(Debug, Clone)]
pub enum Scripted {
    Counts(SolvedCounts),
    Fail(FetchError),
    /// Never completes; exercises the per-user timeout.
    Hang,
}

/// In-memory [`SolvedCountSource`] driven by per-user scripts.
#[derive(Default)]
pub struct FakeSource {
    scripts: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: &str, script: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .insert(user_id.to_string(), script);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SolvedCountSource for FakeSource {
    async fn fetch_solved_counts(&self, user_id: &str) -> Result<SolvedCounts, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().get(user_id).cloned();
        match script {
            Some(Scripted::Counts(counts)) => Ok(counts),
            Some(Scripted::Fail(e)) => Err(e),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(FetchError::UserNotFound(user_id.to_string())),
        }
    }
}
