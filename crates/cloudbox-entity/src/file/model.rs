//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudbox_core::types::{FileId, FolderId};

use super::category::FileCategory;

/// A file stored in the user's cloud drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Unique file identifier, assigned by the backend.
    #[serde(alias = "_id")]
    pub id: FileId,
    /// The file name (including extension).
    pub name: String,
    /// MIME type as reported by the backend.
    #[serde(default)]
    pub mime_type: String,
    /// Absolute URL of the stored content.
    #[serde(default)]
    pub url: String,
    /// File size in bytes.
    #[serde(default)]
    pub size_bytes: u64,
    /// When the file was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// The folder containing this file; `None` for root-level files.
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Whether the file has been archived.
    #[serde(default)]
    pub archived: bool,
    /// Previously generated share link, if any.
    #[serde(default)]
    pub share_link: Option<String>,
}

impl File {
    /// Whether the file lives outside every folder.
    pub fn is_root_level(&self) -> bool {
        self.folder_id.is_none()
    }

    /// Whether the file belongs directly to `folder_id`.
    pub fn is_in(&self, folder_id: &FolderId) -> bool {
        self.folder_id.as_ref() == Some(folder_id)
    }

    /// The upload/listing category this file falls into, if any.
    pub fn category(&self) -> Option<FileCategory> {
        FileCategory::classify(&self.mime_type, &self.name)
    }
}
