//! The folder tree cache and its background refresh.

pub mod cache;
pub mod poll;
pub mod store;

pub use cache::{FolderView, Listing, StaleScope};
pub use poll::PollHandle;
pub use store::TreeStore;
