//! Integration tests for the period rollover.

mod common;

use std::time::Duration;

use common::{at, test_service};
use leetboard_core::counts::SolvedCounts;
use leetboard_core::state::RolloverState;
use leetboard_db::repositories::{BaselineRepo, RotationRepo};
use leetboard_worker::background::PeriodRollover;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

const CHECK_INTERVAL: Duration = Duration::from_secs(3600);

#[sqlx::test(migrations = "../../db/migrations")]
async fn rotation_resets_next_period_progress(pool: SqlitePool) {
    let service = test_service(pool.clone());
    service.register_user("bob", None).await.unwrap();
    service
        .add_snapshot("bob", SolvedCounts::new(10, 5, 1), at(5, 0))
        .await
        .unwrap();
    service
        .add_snapshot("bob", SolvedCounts::new(12, 5, 1), at(8, 0))
        .await
        .unwrap();

    let rollover = PeriodRollover::new(service.clone(), CHECK_INTERVAL);
    let report = rollover.check(at(10, 1)).await.unwrap().unwrap();
    assert_eq!(report.boundary, at(10, 0));
    assert_eq!(report.baselines, 1);
    assert_eq!(rollover.state(), RolloverState::Waiting);

    let baseline = BaselineRepo::find_for_period(&pool, "bob", at(10, 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(baseline.counts(), SolvedCounts::new(12, 5, 1));
    assert_eq!(baseline.period_start, at(10, 0));

    let progress = service.progress("bob", at(10, 0), at(10, 2)).await.unwrap();
    assert!(progress.is_zero());

    service
        .add_snapshot("bob", SolvedCounts::new(13, 5, 1), at(11, 0))
        .await
        .unwrap();
    let progress = service.progress("bob", at(10, 0), at(11, 1)).await.unwrap();
    assert_eq!(progress.easy, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn closing_standings_report_previous_leader(pool: SqlitePool) {
    let service = test_service(pool);
    service.register_user("alice", None).await.unwrap();
    service.register_user("bob", None).await.unwrap();
    service
        .add_snapshot("bob", SolvedCounts::new(10, 5, 1), at(5, 0))
        .await
        .unwrap();
    service
        .add_snapshot("bob", SolvedCounts::new(12, 5, 1), at(8, 0))
        .await
        .unwrap();

    let rollover = PeriodRollover::new(service, CHECK_INTERVAL);
    let report = rollover.check(at(10, 1)).await.unwrap().unwrap();

    assert_eq!(report.closing_entries, 2);
    let leader = report.closing_leader.unwrap();
    assert_eq!(leader.user_id, "bob");
    assert_eq!(leader.score, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_checks_rotate_once_per_period(pool: SqlitePool) {
    let service = test_service(pool.clone());
    service.register_user("bob", None).await.unwrap();
    service
        .add_snapshot("bob", SolvedCounts::new(1, 0, 0), at(5, 0))
        .await
        .unwrap();

    let rollover = PeriodRollover::new(service, CHECK_INTERVAL);

    assert!(rollover.check(at(10, 0)).await.unwrap().is_some());
    assert!(rollover.check(at(10, 5)).await.unwrap().is_none());
    assert!(rollover.check(at(16, 23)).await.unwrap().is_none());

    let next = rollover.check(at(17, 0)).await.unwrap().unwrap();
    assert_eq!(next.boundary, at(17, 0));

    let state = RotationRepo::state(&pool).await.unwrap().unwrap();
    assert_eq!(state.last_boundary, at(17, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_store_rotates_without_baselines(pool: SqlitePool) {
    let rollover = PeriodRollover::new(test_service(pool), CHECK_INTERVAL);
    let report = rollover.check(at(10, 0)).await.unwrap().unwrap();

    assert_eq!(report.baselines, 0);
    assert_eq!(report.closing_entries, 0);
    assert!(report.closing_leader.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn run_rotates_then_stops_on_cancel(pool: SqlitePool) {
    let rollover = PeriodRollover::new(test_service(pool.clone()), CHECK_INTERVAL);
    let state = rollover.subscribe();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(rollover.run(cancel.clone()));

    // The first tick fires immediately.
    let mut rotated = None;
    for _ in 0..100 {
        rotated = RotationRepo::state(&pool).await.unwrap();
        if rotated.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(rotated.is_some());

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("rollover did not stop")
        .unwrap();
    assert_eq!(*state.borrow(), RolloverState::Stopped);
}
