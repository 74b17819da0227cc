//! Pure domain logic for the leaderboard engine.
//!
//! Nothing in this crate touches the database or the network, so every
//! module can be unit tested in isolation and shared by the persistence,
//! client, and worker crates.

pub mod counts;
pub mod error;
pub mod fetch;
pub mod leaderboard;
pub mod metrics;
pub mod period;
pub mod progress;
pub mod scoring;
pub mod state;
pub mod types;
pub mod users;
