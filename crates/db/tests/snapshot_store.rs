//! Integration tests for the snapshot store: dedup, ordering, lookups.

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use futures::TryStreamExt;
use leetboard_core::counts::SolvedCounts;
use leetboard_core::types::Timestamp;
use leetboard_db::models::snapshot::AppendOutcome;
use leetboard_db::repositories::SnapshotRepo;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn counts(easy: i64, medium: i64, hard: i64) -> SolvedCounts {
    SolvedCounts::new(easy, medium, hard)
}

// ---------------------------------------------------------------------------
// Append
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn identical_counts_are_stored_once(pool: SqlitePool) {
    let first = SnapshotRepo::append(&pool, "alice", counts(5, 2, 0), at(1, 0))
        .await
        .unwrap();
    assert_matches!(first, AppendOutcome::Inserted(_));

    let second = SnapshotRepo::append(&pool, "alice", counts(5, 2, 0), at(1, 1))
        .await
        .unwrap();
    assert_eq!(second, AppendOutcome::Unchanged);

    assert_eq!(SnapshotRepo::count_for_user(&pool, "alice").await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn changed_counts_append_new_row(pool: SqlitePool) {
    SnapshotRepo::append(&pool, "alice", counts(5, 2, 0), at(1, 0)).await.unwrap();
    let outcome = SnapshotRepo::append(&pool, "alice", counts(6, 2, 0), at(1, 1))
        .await
        .unwrap();

    assert_matches!(outcome, AppendOutcome::Inserted(ref s) if s.easy == 6);
    assert_eq!(SnapshotRepo::count_for_user(&pool, "alice").await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reverting_to_older_counts_is_a_new_row(pool: SqlitePool) {
    // Dedup compares against the most recent row only.
    SnapshotRepo::append(&pool, "alice", counts(5, 0, 0), at(1, 0)).await.unwrap();
    SnapshotRepo::append(&pool, "alice", counts(6, 0, 0), at(1, 1)).await.unwrap();
    let outcome = SnapshotRepo::append(&pool, "alice", counts(5, 0, 0), at(1, 2))
        .await
        .unwrap();

    assert!(outcome.is_inserted());
    assert_eq!(SnapshotRepo::count_for_user(&pool, "alice").await.unwrap(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_order_timestamp_is_stale(pool: SqlitePool) {
    SnapshotRepo::append(&pool, "alice", counts(5, 0, 0), at(2, 0)).await.unwrap();

    let earlier = SnapshotRepo::append(&pool, "alice", counts(9, 0, 0), at(1, 0))
        .await
        .unwrap();
    assert_eq!(earlier, AppendOutcome::Stale);

    let same_instant = SnapshotRepo::append(&pool, "alice", counts(9, 0, 0), at(2, 0))
        .await
        .unwrap();
    assert_eq!(same_instant, AppendOutcome::Stale);

    assert_eq!(SnapshotRepo::count_for_user(&pool, "alice").await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dedup_is_per_user(pool: SqlitePool) {
    SnapshotRepo::append(&pool, "alice", counts(1, 1, 1), at(1, 0)).await.unwrap();
    let bob = SnapshotRepo::append(&pool, "bob", counts(1, 1, 1), at(1, 0))
        .await
        .unwrap();

    assert!(bob.is_inserted());
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn latest_at_or_before_respects_bound(pool: SqlitePool) {
    SnapshotRepo::append(&pool, "alice", counts(1, 0, 0), at(1, 0)).await.unwrap();
    SnapshotRepo::append(&pool, "alice", counts(2, 0, 0), at(3, 0)).await.unwrap();
    SnapshotRepo::append(&pool, "alice", counts(3, 0, 0), at(5, 0)).await.unwrap();

    let found = SnapshotRepo::latest_at_or_before(&pool, "alice", at(4, 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.easy, 2);

    let inclusive = SnapshotRepo::latest_at_or_before(&pool, "alice", at(5, 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(inclusive.easy, 3);

    let before_first = at(1, 0) - chrono::Duration::seconds(1);
    let none = SnapshotRepo::latest_at_or_before(&pool, "alice", before_first)
        .await
        .unwrap();
    assert!(none.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn earliest_lookups(pool: SqlitePool) {
    SnapshotRepo::append(&pool, "alice", counts(1, 0, 0), at(1, 0)).await.unwrap();
    SnapshotRepo::append(&pool, "alice", counts(2, 0, 0), at(3, 0)).await.unwrap();

    let after = SnapshotRepo::earliest_at_or_after(&pool, "alice", at(2, 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.easy, 2);

    let first = SnapshotRepo::earliest(&pool, "alice").await.unwrap().unwrap();
    assert_eq!(first.easy, 1);

    assert!(SnapshotRepo::earliest_at_or_after(&pool, "alice", at(4, 0))
        .await
        .unwrap()
        .is_none());
    assert!(SnapshotRepo::earliest(&pool, "nobody").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_stream_is_ordered_and_restartable(pool: SqlitePool) {
    for (i, day) in [1, 2, 3, 4].into_iter().enumerate() {
        SnapshotRepo::append(&pool, "alice", counts(i as i64, 0, 0), at(day, 0))
            .await
            .unwrap();
    }
    SnapshotRepo::append(&pool, "bob", counts(9, 9, 9), at(2, 12)).await.unwrap();

    let first: Vec<_> = SnapshotRepo::all_for_user(&pool, "alice")
        .try_collect()
        .await
        .unwrap();
    let second: Vec<_> = SnapshotRepo::all_for_user(&pool, "alice")
        .try_collect()
        .await
        .unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    assert!(first.iter().all(|s| s.user_id == "alice"));
    assert!(
        first.windows(2).all(|w| w[0].captured_at < w[1].captured_at),
        "captured_at must be strictly increasing"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_all_is_newest_first_across_users(pool: SqlitePool) {
    SnapshotRepo::append(&pool, "alice", counts(1, 0, 0), at(1, 0)).await.unwrap();
    SnapshotRepo::append(&pool, "bob", counts(2, 0, 0), at(3, 0)).await.unwrap();
    SnapshotRepo::append(&pool, "alice", counts(3, 0, 0), at(3, 0)).await.unwrap();

    let all = SnapshotRepo::list_all(&pool).await.unwrap();
    let order: Vec<_> = all
        .iter()
        .map(|s| (s.user_id.as_str(), s.captured_at))
        .collect();
    assert_eq!(
        order,
        vec![("alice", at(3, 0)), ("bob", at(3, 0)), ("alice", at(1, 0))]
    );
}
