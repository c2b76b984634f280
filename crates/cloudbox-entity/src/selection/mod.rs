//! Batch selection value object.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cloudbox_core::types::{FileId, FolderId};

use crate::share::ShareTarget;

/// The set of files and folders picked for a batch operation.
///
/// Independent of tree shape: it holds ids only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Selected file ids.
    pub file_ids: HashSet<FileId>,
    /// Selected folder ids.
    pub folder_ids: HashSet<FolderId>,
}

impl Selection {
    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.file_ids.is_empty() && self.folder_ids.is_empty()
    }

    /// Total number of selected items.
    pub fn len(&self) -> usize {
        self.file_ids.len() + self.folder_ids.len()
    }

    /// Convert into a multi-item share target with ids in a stable order.
    pub fn to_share_target(&self) -> ShareTarget {
        let mut folder_ids: Vec<FolderId> = self.folder_ids.iter().cloned().collect();
        let mut file_ids: Vec<FileId> = self.file_ids.iter().cloned().collect();
        folder_ids.sort();
        file_ids.sort();
        ShareTarget::Multi {
            folder_ids,
            file_ids,
        }
    }
}
