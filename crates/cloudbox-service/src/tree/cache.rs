//! Cached listings and folder render states.

use serde::Serialize;

use cloudbox_core::types::FolderId;
use cloudbox_entity::file::File;

/// A fetched listing plus its freshness.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    /// The listing as last fetched, with acknowledged mutations applied.
    pub items: T,
    /// Set by invalidation; cleared by the next fetch.
    pub stale: bool,
}

impl<T> Listing<T> {
    pub fn fresh(items: T) -> Self {
        Self {
            items,
            stale: false,
        }
    }
}

/// A cache entry that can be marked stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaleScope {
    /// The nested folder listing.
    RootFolders,
    /// The all-files listing.
    RootFiles,
    /// One folder's file listing.
    Folder(FolderId),
}

/// How a folder row renders.
///
/// "Has been fetched" is kept apart from "fetched and empty": a folder that
/// is expanded but not yet fetched is `Loading`, never `Empty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "files", rename_all = "snake_case")]
pub enum FolderView {
    /// Not expanded; nothing extra is shown.
    Collapsed,
    /// Expanded, first fetch still running.
    Loading,
    /// Expanded and fetched, with no files.
    Empty,
    /// Expanded and fetched.
    Files(Vec<File>),
}
