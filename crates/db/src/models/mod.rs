//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table row, plus the DTOs and outcome enums its repository uses.

pub mod baseline;
pub mod rotation;
pub mod snapshot;
pub mod user;
