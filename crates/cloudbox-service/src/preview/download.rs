//! Download actions that ignore repeated clicks.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashSet;
use tracing::{debug, info};

use cloudbox_core::result::AppResult;
use cloudbox_core::traits::ContentFetcher;

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Name to save the content under.
    pub file_name: String,
    /// The downloaded content.
    pub data: Bytes,
}

/// Fetches file content at most once per URL at a time.
#[derive(Debug)]
pub struct Downloader {
    fetcher: Arc<dyn ContentFetcher>,
    in_flight: DashSet<String>,
}

/// Removes its URL from the in-flight set when dropped.
struct InFlight<'a> {
    set: &'a DashSet<String>,
    url: String,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a DashSet<String>, url: &str) -> Option<Self> {
        set.insert(url.to_string()).then(|| Self {
            set,
            url: url.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.url);
    }
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            fetcher,
            in_flight: DashSet::new(),
        }
    }

    /// Download `url`.
    ///
    /// Returns `Ok(None)` without issuing a request when a download of the
    /// same URL is already running.
    pub async fn download(&self, url: &str, file_name: &str) -> AppResult<Option<Download>> {
        let Some(_guard) = InFlight::acquire(&self.in_flight, url) else {
            debug!(url, "Download already in flight, ignoring");
            return Ok(None);
        };

        let data = self.fetcher.fetch_bytes(url).await?;
        info!(file = file_name, size = data.len(), "Download complete");
        Ok(Some(Download {
            file_name: file_name.to_string(),
            data,
        }))
    }

    /// Whether a download of `url` is running.
    pub fn is_downloading(&self, url: &str) -> bool {
        self.in_flight.contains(url)
    }
}
