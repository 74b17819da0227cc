//! Background loops spawned by the worker binary.
//!
//! Both loops run until their [`CancellationToken`](tokio_util::sync::CancellationToken)
//! is cancelled and publish their current state on a `watch` channel.

pub mod poller;
pub mod rollover;

pub use poller::{PollSummary, Poller};
pub use rollover::{PeriodRollover, RolloverReport};
