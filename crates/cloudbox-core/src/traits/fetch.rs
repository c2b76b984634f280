//! Binary content fetching.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Fetches the raw bytes behind a file URL.
///
/// Kept separate from the full REST collaborator so that the preview and
/// download paths depend only on what they use.
#[async_trait]
pub trait ContentFetcher: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the complete body at `url`.
    async fn fetch_bytes(&self, url: &str) -> AppResult<Bytes>;
}
