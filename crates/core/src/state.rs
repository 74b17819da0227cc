//! Background loop state machines.
//!
//! Both loops publish their current state so callers can observe them;
//! the transition tables here are the single source of truth for which
//! moves are legal.

use serde::Serialize;

/// Lifecycle of the snapshot poller.
///
/// `Idle -> Fetching -> Storing -> Idle` per user sweep, with `Stopped`
/// reachable from every state on cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollerState {
    Idle,
    Fetching,
    Storing,
    Stopped,
}

impl PollerState {
    /// Returns the set of states reachable from `self`.
    pub fn valid_transitions(self) -> &'static [PollerState] {
        use PollerState::*;
        match self {
            Idle => &[Fetching, Stopped],
            // A sweep alternates between fetching and storing per user and
            // returns to idle once every user has been visited.
            Fetching => &[Storing, Fetching, Idle, Stopped],
            Storing => &[Fetching, Idle, Stopped],
            Stopped => &[],
        }
    }

    pub fn can_transition(self, to: PollerState) -> bool {
        self.valid_transitions().contains(&to)
    }
}

/// Lifecycle of the period rollover loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RolloverState {
    Waiting,
    RotatingBaseline,
    Stopped,
}

impl RolloverState {
    pub fn valid_transitions(self) -> &'static [RolloverState] {
        use RolloverState::*;
        match self {
            Waiting => &[RotatingBaseline, Stopped],
            RotatingBaseline => &[Waiting, Stopped],
            Stopped => &[],
        }
    }

    pub fn can_transition(self, to: RolloverState) -> bool {
        self.valid_transitions().contains(&to)
    }
}
