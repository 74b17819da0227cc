//! Leaderboard engine: the service consumed by outer layers plus the
//! background poller and period rollover.
//!
//! Everything is wired through one [`EngineContext`](context::EngineContext)
//! built at startup; there is no global state.

pub mod background;
pub mod baseline;
pub mod config;
pub mod context;
pub mod error;
pub mod service;
