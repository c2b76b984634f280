//! File categories used for listing filters and the upload gate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cloudbox_core::error::AppError;

/// The coarse content categories the drive groups files by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Raster and vector images.
    Image,
    /// Video clips.
    Video,
    /// PDFs, office documents, and plain text.
    Document,
    /// Compressed archives.
    Zip,
}

const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.oasis.opendocument.text",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.oasis.opendocument.presentation",
    "application/rtf",
    "text/plain",
    "text/csv",
];
const ZIP_MIME_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/x-7z-compressed",
    "application/x-tar",
    "application/gzip",
    "application/x-gzip",
    "application/x-gtar",
    "application/x-compressed",
    "application/x-compressed-tar",
];

impl FileCategory {
    /// All categories, in display order.
    pub const ALL: [FileCategory; 4] = [Self::Image, Self::Video, Self::Document, Self::Zip];

    /// Return the category as the backend's path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Document => "document",
            Self::Zip => "zip",
        }
    }

    /// Whether a file with this MIME type and name is acceptable for the category.
    ///
    /// See [`effective_mime`] for how generic types are resolved.
    pub fn accepts(&self, mime_type: &str, name: &str) -> bool {
        let mime = effective_mime(mime_type, name);
        match self {
            Self::Image => mime.starts_with("image/"),
            Self::Video => mime.starts_with("video/"),
            Self::Document => DOCUMENT_MIME_TYPES.contains(&mime.as_str()),
            Self::Zip => is_archive_mime(&mime),
        }
    }

    /// Determine the category of a file, if it belongs to one.
    pub fn classify(mime_type: &str, name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.accepts(mime_type, name))
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" | "images" => Ok(Self::Image),
            "video" | "videos" => Ok(Self::Video),
            "document" | "documents" | "doc" => Ok(Self::Document),
            "zip" | "archive" => Ok(Self::Zip),
            other => Err(AppError::validation(format!("Unknown file category '{other}'"))),
        }
    }
}

/// Which slice of the user's files a listing call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListFilter {
    /// Every non-archived file.
    #[default]
    All,
    /// Archived files only.
    Archived,
    /// Files of one category.
    Category(FileCategory),
}

/// Whether the MIME type says nothing useful about the content.
pub fn is_generic_mime(mime: &str) -> bool {
    mime.is_empty() || mime == "application/octet-stream" || mime == "binary/octet-stream"
}

/// Whether the MIME type names a compressed archive.
pub fn is_archive_mime(mime: &str) -> bool {
    ZIP_MIME_TYPES.contains(&mime)
}

/// Normalized MIME type of a file.
///
/// A specific type is kept as is. A generic or missing one is replaced by
/// the type registered for the name's extension, when there is one.
pub fn effective_mime(mime_type: &str, name: &str) -> String {
    let mime = mime_type.trim().to_ascii_lowercase();
    if !is_generic_mime(&mime) {
        return mime;
    }
    extension_of(name)
        .and_then(|ext| mime_guess::from_ext(&ext).first())
        .map(|guessed| guessed.essence_str().to_string())
        .unwrap_or(mime)
}

/// Lowercase extension of a file name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}
