//! # cloudbox-client
//!
//! The backend collaborator. [`FileApi`] describes every REST call the
//! client core issues; [`HttpFileApi`] speaks to a real deployment over
//! `reqwest`, and [`MemoryFileApi`] keeps an in-process drive for offline
//! runs and tests.

pub mod api;
pub mod http;
pub mod memory;
pub mod routes;

pub use api::{FileApi, UploadRequest};
pub use http::HttpFileApi;
pub use memory::{MemoryFileApi, RequestGate, ShareField};
