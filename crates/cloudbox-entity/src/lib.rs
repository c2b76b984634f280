//! # cloudbox-entity
//!
//! Domain entity models for Cloudbox. Every struct in this crate is a value
//! the backend hands out (files, nested folders, share links) or a piece of
//! client-side session state built from their ids (selections). All
//! entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod file;
pub mod folder;
pub mod selection;
pub mod share;

pub use file::{File, FileCategory, ListFilter};
pub use folder::{Folder, FolderNode, FolderTree};
pub use selection::Selection;
pub use share::{ShareKind, ShareLink, ShareTarget};
