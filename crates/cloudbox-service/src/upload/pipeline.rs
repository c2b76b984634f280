//! Single-file uploads and sequential batch copies.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use cloudbox_client::{FileApi, UploadRequest};
use cloudbox_core::config::UploadConfig;
use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::FolderId;
use cloudbox_entity::file::{File, FileCategory};

use super::batch::{BatchItem, BatchReport, CopySource, ItemStatus};
use super::local::LocalFile;

/// Parameters of a single upload.
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Category picked before the file.
    pub category: FileCategory,
    /// The chosen file; `None` when the user chose nothing.
    pub file: Option<LocalFile>,
    /// Destination folder; `None` uploads to the root.
    pub folder_id: Option<FolderId>,
}

/// A confirmed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// The stored file, when the backend echoes it.
    pub file: Option<File>,
    /// The backend's confirmation message, if any.
    pub message: Option<String>,
}

/// Validates and submits uploads.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    api: Arc<dyn FileApi>,
    config: UploadConfig,
}

impl UploadPipeline {
    /// Creates a new upload pipeline.
    pub fn new(api: Arc<dyn FileApi>, config: UploadConfig) -> Self {
        Self { api, config }
    }

    /// Client-side checks run before any request.
    pub fn validate<'a>(
        &self,
        category: FileCategory,
        file: Option<&'a LocalFile>,
    ) -> AppResult<&'a LocalFile> {
        let file = file.ok_or_else(|| AppError::validation("Please select a file to upload"))?;

        // Check size limit
        if file.size() > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        if !category.accepts(&file.mime_type, &file.name) {
            return Err(AppError::validation(format!(
                "'{}' is not a valid {category} file",
                file.name
            )));
        }
        Ok(file)
    }

    /// Validate and upload one file.
    ///
    /// A 2xx response only counts when it also carries a success marker.
    pub async fn upload(&self, params: UploadParams) -> AppResult<UploadReceipt> {
        let file = self.validate(params.category, params.file.as_ref())?;
        let request = UploadRequest {
            folder_id: params.folder_id.clone(),
            category: params.category,
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            data: file.data.clone(),
        };

        let body = self.api.upload(request).await?;
        let receipt = self.confirm(&body)?;
        info!(
            name = %file.name,
            size = file.size(),
            category = %params.category,
            folder_id = ?params.folder_id,
            "Upload completed"
        );
        Ok(receipt)
    }

    /// Interpret an upload response body.
    ///
    /// Accepts `{"success": true}` or a `message` listed in the configured
    /// success markers. Anything else is an application failure.
    pub fn confirm(&self, body: &Value) -> AppResult<UploadReceipt> {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        let flagged = body.get("success").and_then(Value::as_bool);
        let marked = message
            .as_deref()
            .is_some_and(|m| self.config.success_markers.iter().any(|s| s == m));

        match flagged {
            Some(true) => {}
            Some(false) => {
                return Err(AppError::application(
                    message.unwrap_or_else(|| "Upload failed".to_string()),
                ));
            }
            None if marked => {}
            None => {
                warn!(?message, "Upload response carried no success marker");
                return Err(AppError::application(
                    message.unwrap_or_else(|| "Upload was not confirmed by the server".to_string()),
                ));
            }
        }

        let file = body
            .get("file")
            .cloned()
            .and_then(|f| serde_json::from_value(f).ok());
        Ok(UploadReceipt { file, message })
    }

    /// Copy existing drive files into `target`, one after another.
    pub async fn copy_existing(
        &self,
        files: &[File],
        target: Option<&FolderId>,
    ) -> AppResult<BatchReport> {
        let sources: Vec<CopySource> = files.iter().cloned().map(CopySource::Loaded).collect();
        let (progress, _) = watch::channel(Vec::new());
        self.copy_sources(&sources, target, &progress).await
    }

    /// Copy a selection, publishing per-item status after every step.
    ///
    /// Missing sources count as failed items without any request.
    pub async fn copy_sources(
        &self,
        sources: &[CopySource],
        target: Option<&FolderId>,
        progress: &watch::Sender<Vec<ItemStatus>>,
    ) -> AppResult<BatchReport> {
        if sources.is_empty() {
            return Err(AppError::validation("Select at least one file to copy"));
        }

        let mut items: Vec<BatchItem> = sources.iter().map(BatchItem::queued).collect();
        publish(progress, &items);

        for (index, source) in sources.iter().enumerate() {
            let CopySource::Loaded(file) = source else {
                warn!(file_id = %source.file_id(), "Selected file is not loaded, skipping");
                continue;
            };
            let status = match self.copy_one(file, target).await {
                Ok(_) => ItemStatus::Success,
                Err(e) => {
                    warn!(file_id = %file.id, error = %e, "Copy failed");
                    ItemStatus::Error(e.user_message())
                }
            };
            debug!(index, file_id = %file.id, ?status, "Batch item finished");
            items[index].status = status;
            publish(progress, &items);
        }

        let report = BatchReport { items };
        info!(
            total = report.items.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch copy finished"
        );
        Ok(report)
    }

    async fn copy_one(&self, file: &File, target: Option<&FolderId>) -> AppResult<UploadReceipt> {
        let category = file.category().ok_or_else(|| {
            AppError::validation(format!("'{}' has no uploadable file type", file.name))
        })?;
        let data = self.api.fetch_bytes(&file.url).await?;
        self.upload(UploadParams {
            category,
            file: Some(LocalFile::new(file.name.clone(), file.mime_type.clone(), data)),
            folder_id: target.cloned(),
        })
        .await
    }
}

fn publish(progress: &watch::Sender<Vec<ItemStatus>>, items: &[BatchItem]) {
    progress.send_replace(items.iter().map(|i| i.status.clone()).collect());
}
