//! Files picked from the local machine.

use std::path::Path;

use bytes::Bytes;

use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;

/// A file chosen for upload, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// File name sent with the upload.
    pub name: String,
    /// MIME type sent with the upload.
    pub mime_type: String,
    /// File content.
    pub data: Bytes,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::validation(format!("'{}' is not a file name", path.display()))
            })?
            .to_string();

        let data = tokio::fs::read(path).await.map_err(|e| {
            AppError::validation(format!("Cannot read '{}': {e}", path.display()))
        })?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, mime_type, Bytes::from(data)))
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let file = LocalFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "photo.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size(), 4);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzqx");
        std::fs::write(&path, b"?").unwrap();

        let file = LocalFile::from_path(&path).await.unwrap();
        assert_eq!(file.mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFile::from_path(dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
