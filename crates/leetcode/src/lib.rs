//! LeetCode GraphQL implementation of [`SolvedCountSource`].

pub mod client;
pub mod payload;

pub use client::LeetCodeClient;

#[doc(no_inline)]
pub use leetboard_core::fetch::SolvedCountSource;
