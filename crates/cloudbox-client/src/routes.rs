//! Endpoint paths of the backend REST API, relative to the base URL.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::file::{FileCategory, ListFilter};
use cloudbox_entity::share::ShareKind;

/// Listing path for the user's files.
pub fn files(filter: ListFilter) -> String {
    match filter {
        ListFilter::All => "/files".to_string(),
        ListFilter::Archived => "/files/archived".to_string(),
        ListFilter::Category(category) => format!("/files/type/{category}"),
    }
}

/// All folders, nested.
pub fn folders() -> String {
    "/folders".to_string()
}

/// Files directly inside a folder.
pub fn folder_files(id: &FolderId, category: Option<FileCategory>) -> String {
    match category {
        Some(category) => format!("/folders/{}/files?type={category}", encode(id.as_str())),
        None => format!("/folders/{}/files", encode(id.as_str())),
    }
}

/// A single file resource.
pub fn file(id: &FileId) -> String {
    format!("/files/{}", encode(id.as_str()))
}

/// A single folder resource.
pub fn folder(id: &FolderId) -> String {
    format!("/folders/{}", encode(id.as_str()))
}

/// Rename endpoint of a file.
pub fn rename_file(id: &FileId) -> String {
    format!("{}/rename", file(id))
}

/// Rename endpoint of a folder.
pub fn rename_folder(id: &FolderId) -> String {
    format!("{}/rename", folder(id))
}

/// Archive endpoint of a file.
pub fn archive_file(id: &FileId) -> String {
    format!("{}/archive", file(id))
}

/// Archive endpoint of a folder.
pub fn archive_folder(id: &FolderId) -> String {
    format!("{}/archive", folder(id))
}

/// Move endpoint of a file.
pub fn move_file(id: &FileId) -> String {
    format!("{}/move", file(id))
}

/// Share endpoint for the given kind; `id` is ignored for multi shares.
pub fn share(kind: ShareKind, id: Option<&str>) -> String {
    match (kind, id) {
        (ShareKind::File, Some(id)) => format!("/files/{}/share", encode(id)),
        (ShareKind::Folder, Some(id)) => format!("/folders/{}/share", encode(id)),
        _ => "/share/multiple".to_string(),
    }
}

/// Upload endpoint, folder-scoped when a folder is given.
pub fn upload(folder: Option<&FolderId>) -> String {
    match folder {
        Some(id) => format!("{}/upload", self::folder(id)),
        None => "/files/upload".to_string(),
    }
}

/// Everything but RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encode a path segment.
fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
