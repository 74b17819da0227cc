//! Ranking of scored progress into an ordered leaderboard.

use serde::Serialize;

use crate::progress::Progress;
use crate::scoring::ScoringPolicy;
use crate::types::UserId;

/// One row of a computed leaderboard. Derived on every request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position in the ordering.
    pub rank: u32,
    pub user_id: UserId,
    pub display_name: String,
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
    pub score: i64,
}

/// Input row for [`rank_entries`]: a user and their progress for the period.
#[derive(Debug, Clone)]
pub struct UserProgress {
    pub user_id: UserId,
    pub display_name: String,
    pub progress: Progress,
}

/// Score every row and sort by score descending, then `user_id` ascending.
///
/// The secondary key makes equal scores order deterministically, so two
/// builds over unchanged data always produce the same sequence.
pub fn rank_entries(rows: Vec<UserProgress>, policy: &ScoringPolicy) -> Vec<LeaderboardEntry> {
    let mut scored: Vec<(i64, UserProgress)> = rows
        .into_iter()
        .map(|row| (policy.score(&row.progress), row))
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score
            .cmp(a_score)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, row))| LeaderboardEntry {
            rank: i as u32 + 1,
            user_id: row.user_id,
            display_name: row.display_name,
            easy: row.progress.easy,
            medium: row.progress.medium,
            hard: row.progress.hard,
            score,
        })
        .collect()
}

/// The first-place entry, if the leaderboard is non-empty.
pub fn leader(entries: &[LeaderboardEntry]) -> Option<&LeaderboardEntry> {
    entries.first()
}
