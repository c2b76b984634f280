//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudbox_core::types::FolderId;

/// A folder in the drive hierarchy, with its sub-folders nested in order.
///
/// Ownership flows parent to child through `children`; `parent_folder_id`
/// is a back-reference used for lookups only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier, assigned by the backend.
    #[serde(alias = "_id")]
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (`None` for root folders).
    #[serde(default, alias = "parentFolder")]
    pub parent_folder_id: Option<FolderId>,
    /// Child folders, in backend order.
    #[serde(default)]
    pub children: Vec<Folder>,
    /// When the folder was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_folder_id.is_none()
    }

    /// Find `id` in this folder's subtree, including the folder itself.
    pub fn find(&self, id: &FolderId) -> Option<&Folder> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Mutable variant of [`Folder::find`].
    pub fn find_mut(&mut self, id: &FolderId) -> Option<&mut Folder> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Number of folders in this subtree, excluding the folder itself.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}
