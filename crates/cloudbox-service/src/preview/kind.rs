//! Preview classification.

use serde::{Deserialize, Serialize};

use cloudbox_entity::file::category::{effective_mime, is_archive_mime};

/// Office document families. Never rendered inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Word,
    Excel,
    PowerPoint,
    OpenDocument,
}

impl DocumentKind {
    /// Icon name shown next to the download action.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Word => "file-word",
            Self::Excel => "file-excel",
            Self::PowerPoint => "file-powerpoint",
            Self::OpenDocument => "file-odf",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Word)
            }
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Excel)
            }
            "application/vnd.ms-powerpoint"
            | "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                Some(Self::PowerPoint)
            }
            m if m.starts_with("application/vnd.oasis.opendocument.") => Some(Self::OpenDocument),
            _ => None,
        }
    }
}

/// How a file is presented when opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "document")]
pub enum PreviewKind {
    /// Rendered straight from its URL.
    Image,
    /// Played natively from its URL.
    Video,
    /// Fetched into a local blob and shown in an embedded viewer.
    Pdf,
    /// Icon plus a download action.
    Document(DocumentKind),
    /// Downloaded as soon as it is opened.
    Zip,
    /// Generic fallback with a download action.
    Unsupported,
}

impl PreviewKind {
    /// Classify a file once from its MIME type, resolving generic types
    /// through the name's extension.
    pub fn classify(mime_type: &str, name: &str) -> Self {
        let mime = effective_mime(mime_type, name);
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime == "application/pdf" {
            Self::Pdf
        } else if let Some(doc) = DocumentKind::from_mime(&mime) {
            Self::Document(doc)
        } else if is_archive_mime(&mime) {
            Self::Zip
        } else {
            Self::Unsupported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_mime() {
        assert_eq!(PreviewKind::classify("image/png", "a.png"), PreviewKind::Image);
        assert_eq!(PreviewKind::classify("video/mp4", "clip"), PreviewKind::Video);
        assert_eq!(PreviewKind::classify("application/pdf", "x"), PreviewKind::Pdf);
        assert_eq!(
            PreviewKind::classify(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "q.xlsx"
            ),
            PreviewKind::Document(DocumentKind::Excel)
        );
        assert_eq!(
            PreviewKind::classify("application/vnd.oasis.opendocument.text", "a.odt"),
            PreviewKind::Document(DocumentKind::OpenDocument)
        );
        assert_eq!(PreviewKind::classify("application/zip", "a.zip"), PreviewKind::Zip);
        assert_eq!(
            PreviewKind::classify("text/plain", "notes.txt"),
            PreviewKind::Unsupported
        );
    }

    #[test]
    fn test_specific_mime_beats_extension() {
        assert_eq!(PreviewKind::classify("image/jpeg", "report.pdf"), PreviewKind::Image);
    }

    #[test]
    fn test_generic_mime_uses_extension() {
        assert_eq!(
            PreviewKind::classify("application/octet-stream", "Report.PDF"),
            PreviewKind::Pdf
        );
        assert_eq!(
            PreviewKind::classify("", "slides.pptx"),
            PreviewKind::Document(DocumentKind::PowerPoint)
        );
        assert_eq!(PreviewKind::classify("", "README"), PreviewKind::Unsupported);
    }

    #[test]
    fn test_generic_mime_agrees_with_upload_category() {
        assert_eq!(PreviewKind::classify("", "holiday.avi"), PreviewKind::Video);
        assert_eq!(PreviewKind::classify("", "site.tgz"), PreviewKind::Zip);
        assert_eq!(
            PreviewKind::classify("application/x-compressed", "site.tgz"),
            PreviewKind::Zip
        );
    }
}
