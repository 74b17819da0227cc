//! Point weights and score computation.

use serde::{Deserialize, Serialize};

use crate::progress::Progress;

/// Default points per easy problem.
pub const DEFAULT_WEIGHT_EASY: u32 = 1;

/// Default points per medium problem.
pub const DEFAULT_WEIGHT_MEDIUM: u32 = 3;

/// Default points per hard problem.
pub const DEFAULT_WEIGHT_HARD: u32 = 5;

/// Per-difficulty point weights.
///
/// Loaded once at startup and never mutated afterwards; changing weights
/// requires a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub weight_easy: u32,
    pub weight_medium: u32,
    pub weight_hard: u32,
}

impl ScoringPolicy {
    pub fn new(weight_easy: u32, weight_medium: u32, weight_hard: u32) -> Self {
        Self {
            weight_easy,
            weight_medium,
            weight_hard,
        }
    }

    /// Weighted sum of the progress deltas.
    pub fn score(&self, progress: &Progress) -> i64 {
        progress.easy * i64::from(self.weight_easy)
            + progress.medium * i64::from(self.weight_medium)
            + progress.hard * i64::from(self.weight_hard)
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT_EASY, DEFAULT_WEIGHT_MEDIUM, DEFAULT_WEIGHT_HARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights() {
        assert_eq!(ScoringPolicy::default(), ScoringPolicy::new(1, 3, 5));
    }

    #[test]
    fn alice_scores_eight() {
        let progress = Progress { easy: 3, medium: 0, hard: 1 };
        assert_eq!(ScoringPolicy::new(1, 3, 5).score(&progress), 8);
    }

    #[test]
    fn zero_progress_scores_zero() {
        assert_eq!(ScoringPolicy::default().score(&Progress::ZERO), 0);
    }

    #[test]
    fn score_is_linear_in_each_category() {
        let policy = ScoringPolicy::new(2, 7, 11);
        for easy in 0..5 {
            for medium in 0..5 {
                for hard in 0..5 {
                    let progress = Progress { easy, medium, hard };
                    assert_eq!(policy.score(&progress), easy * 2 + medium * 7 + hard * 11);
                }
            }
        }
    }

    #[test]
    fn zero_weight_ignores_category() {
        let policy = ScoringPolicy::new(0, 1, 0);
        let progress = Progress { easy: 40, medium: 2, hard: 9 };
        assert_eq!(policy.score(&progress), 2);
    }
}
