//! The REST collaborator trait.

use async_trait::async_trait;
use bytes::Bytes;

use cloudbox_core::result::AppResult;
use cloudbox_core::traits::ContentFetcher;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::file::{File, FileCategory, ListFilter};
use cloudbox_entity::folder::Folder;
use cloudbox_entity::share::ShareTarget;

/// A single-file upload, already validated by the caller.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Destination folder; `None` uploads to the root.
    pub folder_id: Option<FolderId>,
    /// Category the user picked before choosing the file.
    pub category: FileCategory,
    /// File name sent with the multipart part.
    pub file_name: String,
    /// MIME type sent with the multipart part.
    pub mime_type: String,
    /// File content.
    pub data: Bytes,
}

/// Every backend call the client core makes.
///
/// Share and upload calls return the raw JSON body: their success criteria
/// (link field names, success markers) are interpreted by the services.
/// Each call is authenticated with the session's bearer token.
#[async_trait]
pub trait FileApi: ContentFetcher {
    /// List the user's files, optionally filtered by category or archive state.
    async fn list_files(&self, filter: ListFilter) -> AppResult<Vec<File>>;

    /// List root folders with their sub-folders nested.
    async fn list_folders(&self) -> AppResult<Vec<Folder>>;

    /// List the files directly inside a folder.
    async fn list_folder_files(
        &self,
        folder_id: &FolderId,
        category: Option<FileCategory>,
    ) -> AppResult<Vec<File>>;

    /// Create a folder. Returns the created folder when the backend echoes it.
    async fn create_folder(&self, name: &str, parent: Option<&FolderId>)
    -> AppResult<Option<Folder>>;

    /// Rename a file.
    async fn rename_file(&self, id: &FileId, new_name: &str) -> AppResult<()>;

    /// Rename a folder.
    async fn rename_folder(&self, id: &FolderId, new_name: &str) -> AppResult<()>;

    /// Delete a file.
    async fn delete_file(&self, id: &FileId) -> AppResult<()>;

    /// Delete a folder.
    async fn delete_folder(&self, id: &FolderId) -> AppResult<()>;

    /// Archive a file.
    async fn archive_file(&self, id: &FileId) -> AppResult<()>;

    /// Archive a folder.
    async fn archive_folder(&self, id: &FolderId) -> AppResult<()>;

    /// Move a file into another folder, or to the root with `None`.
    async fn move_file(&self, id: &FileId, target: Option<&FolderId>) -> AppResult<()>;

    /// Ask the backend for a share link.
    async fn request_share(&self, target: &ShareTarget) -> AppResult<serde_json::Value>;

    /// Upload one file as a multipart payload.
    async fn upload(&self, request: UploadRequest) -> AppResult<serde_json::Value>;
}
