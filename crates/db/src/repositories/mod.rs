//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument. Every method is a single
//! statement or a single transaction.

pub mod baseline_repo;
pub mod rotation_repo;
pub mod snapshot_repo;
pub mod user_repo;

pub use baseline_repo::BaselineRepo;
pub use rotation_repo::RotationRepo;
pub use snapshot_repo::SnapshotRepo;
pub use user_repo::UserRepo;
