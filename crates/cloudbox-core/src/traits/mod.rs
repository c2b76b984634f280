//! Core traits defined in `cloudbox-core` and implemented by other crates.

pub mod fetch;

pub use fetch::ContentFetcher;
