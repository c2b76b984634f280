//! Share link requests and response normalization.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use cloudbox_client::FileApi;
use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::selection::Selection;
use cloudbox_entity::share::{ShareLink, ShareTarget};

/// Field names a share response may carry the link under, in priority order.
pub const SHARE_URL_FIELDS: [&str; 2] = ["shareUrl", "shareLink"];

/// Pull the share URL out of a response body.
///
/// The first field in [`SHARE_URL_FIELDS`] holding a non-empty string wins.
pub fn extract_share_url(body: &Value) -> Option<String> {
    SHARE_URL_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

/// Requests share links from the backend.
#[derive(Debug, Clone)]
pub struct ShareService {
    api: Arc<dyn FileApi>,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(api: Arc<dyn FileApi>) -> Self {
        Self { api }
    }

    /// Share a single file.
    pub async fn share_file(&self, id: &FileId) -> AppResult<ShareLink> {
        self.share(ShareTarget::File(id.clone())).await
    }

    /// Share a single folder.
    pub async fn share_folder(&self, id: &FolderId) -> AppResult<ShareLink> {
        self.share(ShareTarget::Folder(id.clone())).await
    }

    /// Share several folders and files under one link.
    pub async fn share_many(
        &self,
        folder_ids: Vec<FolderId>,
        file_ids: Vec<FileId>,
    ) -> AppResult<ShareLink> {
        self.share(ShareTarget::Multi {
            folder_ids,
            file_ids,
        })
        .await
    }

    /// Share everything in a selection.
    pub async fn share_selection(&self, selection: &Selection) -> AppResult<ShareLink> {
        self.share(selection.to_share_target()).await
    }

    /// Issue the request for any target.
    ///
    /// On success the returned link always has a non-empty URL.
    pub async fn share(&self, target: ShareTarget) -> AppResult<ShareLink> {
        if target.item_count() == 0 {
            return Err(AppError::validation("Select at least one item to share"));
        }

        let body = self.api.request_share(&target).await?;
        let Some(url) = extract_share_url(&body) else {
            warn!(kind = %target.kind(), "Share response carried no link");
            return Err(AppError::application(
                "The server did not return a share link",
            ));
        };

        info!(
            kind = %target.kind(),
            items = target.item_count(),
            "Share link issued"
        );
        Ok(ShareLink::new(&target, url))
    }
}
