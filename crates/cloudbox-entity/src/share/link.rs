//! Share link value objects.

use serde::{Deserialize, Serialize};

use cloudbox_core::types::{FileId, FolderId};

/// What kind of target a share link grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    /// A single file.
    File,
    /// A single folder.
    Folder,
    /// An arbitrary mix of files and folders.
    Multi,
}

impl std::fmt::Display for ShareKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Folder => write!(f, "folder"),
            Self::Multi => write!(f, "multi"),
        }
    }
}

/// The item(s) a share request is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    /// Share one file.
    File(FileId),
    /// Share one folder.
    Folder(FolderId),
    /// Share a batch selection.
    Multi {
        /// Selected folders.
        folder_ids: Vec<FolderId>,
        /// Selected files.
        file_ids: Vec<FileId>,
    },
}

impl ShareTarget {
    /// The kind of link this target produces.
    pub fn kind(&self) -> ShareKind {
        match self {
            Self::File(_) => ShareKind::File,
            Self::Folder(_) => ShareKind::Folder,
            Self::Multi { .. } => ShareKind::Multi,
        }
    }

    /// Every target id as a plain string, folders first.
    pub fn ids(&self) -> Vec<String> {
        match self {
            Self::File(id) => vec![id.to_string()],
            Self::Folder(id) => vec![id.to_string()],
            Self::Multi {
                folder_ids,
                file_ids,
            } => folder_ids
                .iter()
                .map(ToString::to_string)
                .chain(file_ids.iter().map(ToString::to_string))
                .collect(),
        }
    }

    /// Number of items covered by the target.
    pub fn item_count(&self) -> usize {
        match self {
            Self::File(_) | Self::Folder(_) => 1,
            Self::Multi {
                folder_ids,
                file_ids,
            } => folder_ids.len() + file_ids.len(),
        }
    }
}

/// A generated share link. Lives only as long as the dialog showing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    /// What was shared.
    pub target_kind: ShareKind,
    /// Ids of the shared items.
    pub target_ids: Vec<String>,
    /// The full URL for accessing the share.
    pub url: String,
}

impl ShareLink {
    /// Build a link for `target`.
    pub fn new(target: &ShareTarget, url: impl Into<String>) -> Self {
        Self {
            target_kind: target.kind(),
            target_ids: target.ids(),
            url: url.into(),
        }
    }
}
