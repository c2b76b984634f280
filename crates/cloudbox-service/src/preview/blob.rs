//! Local object URLs for fetched binaries.

use std::fmt;

use bytes::Bytes;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// An opaque `blob:` URL handed out by a [`BlobRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct BlobEntry {
    data: Bytes,
    mime_type: String,
}

/// Holds blob contents until their URL is revoked.
#[derive(Debug, Default)]
pub struct BlobRegistry {
    entries: DashMap<BlobUrl, BlobEntry>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` and return a fresh URL for it.
    pub fn create(&self, data: Bytes, mime_type: &str) -> BlobUrl {
        let url = BlobUrl(format!("blob:cloudbox/{}", Uuid::new_v4()));
        debug!(url = %url, size = data.len(), "Blob URL created");
        self.entries.insert(
            url.clone(),
            BlobEntry {
                data,
                mime_type: mime_type.to_string(),
            },
        );
        url
    }

    /// Content and MIME type behind a live URL.
    pub fn resolve(&self, url: &BlobUrl) -> Option<(Bytes, String)> {
        self.entries
            .get(url)
            .map(|entry| (entry.data.clone(), entry.mime_type.clone()))
    }

    /// Release a URL. Returns `false` if it was already revoked.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        let removed = self.entries.remove(url).is_some();
        if removed {
            debug!(url = %url, "Blob URL revoked");
        }
        removed
    }

    /// Number of URLs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}
