//! Share domain entities.

pub mod link;

pub use link::{ShareKind, ShareLink, ShareTarget};
