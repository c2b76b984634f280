//! The preview pane state machine.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use cloudbox_core::config::PreviewConfig;
use cloudbox_core::result::AppResult;
use cloudbox_core::traits::ContentFetcher;
use cloudbox_entity::file::File;

use super::blob::{BlobRegistry, BlobUrl};
use super::download::{Download, Downloader};
use super::kind::{DocumentKind, PreviewKind};

/// What the preview pane currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PreviewState {
    /// Nothing open.
    Closed,
    /// Zoomable image loaded from its URL.
    Image { url: String },
    /// Native player on its URL.
    Video { url: String },
    /// PDF bytes are being fetched.
    LoadingPdf { source_url: String },
    /// Embedded viewer on a local blob URL.
    Pdf { blob_url: BlobUrl, source_url: String },
    /// Type icon plus download action.
    Document {
        kind: DocumentKind,
        icon: String,
        download_url: String,
    },
    /// Archive; the download starts immediately.
    DownloadOnly { download_url: String },
    /// Inline preview failed; download instead.
    Unavailable { reason: String, download_url: String },
    /// No preview for this type.
    Unsupported {
        mime_type: String,
        download_url: String,
    },
}

impl PreviewState {
    /// URL of the download action offered in this state, if any.
    pub fn download_url(&self) -> Option<&str> {
        match self {
            Self::Closed | Self::Image { .. } | Self::Video { .. } | Self::LoadingPdf { .. } => {
                None
            }
            Self::Pdf { source_url, .. } => Some(source_url),
            Self::Document { download_url, .. }
            | Self::DownloadOnly { download_url }
            | Self::Unavailable { download_url, .. }
            | Self::Unsupported { download_url, .. } => Some(download_url),
        }
    }
}

#[derive(Debug)]
struct Pane {
    generation: u64,
    state: PreviewState,
    live_blob: Option<BlobUrl>,
}

/// One preview instance.
///
/// Holds at most one live blob URL. The blob is revoked when a later open
/// supersedes it, when the preview closes, and when the dispatcher drops.
/// Every open bumps a generation counter so a PDF fetch that resolves after
/// its preview was closed or replaced is discarded instead of applied.
#[derive(Debug)]
pub struct PreviewDispatcher {
    fetcher: Arc<dyn ContentFetcher>,
    blobs: Arc<BlobRegistry>,
    downloader: Downloader,
    pdf_timeout: Duration,
    pane: Mutex<Pane>,
}

impl PreviewDispatcher {
    /// Creates a dispatcher with its own blob registry.
    pub fn new(fetcher: Arc<dyn ContentFetcher>, config: &PreviewConfig) -> Self {
        Self::with_registry(fetcher, Arc::new(BlobRegistry::new()), config)
    }

    /// Creates a dispatcher sharing `blobs` with other previews.
    pub fn with_registry(
        fetcher: Arc<dyn ContentFetcher>,
        blobs: Arc<BlobRegistry>,
        config: &PreviewConfig,
    ) -> Self {
        Self {
            downloader: Downloader::new(fetcher.clone()),
            fetcher,
            blobs,
            pdf_timeout: Duration::from_secs(config.pdf_fetch_timeout_seconds),
            pane: Mutex::new(Pane {
                generation: 0,
                state: PreviewState::Closed,
                live_blob: None,
            }),
        }
    }

    fn pane(&self) -> MutexGuard<'_, Pane> {
        self.pane.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state.
    pub fn state(&self) -> PreviewState {
        self.pane().state.clone()
    }

    /// The blob URL currently held, if any.
    pub fn live_blob(&self) -> Option<BlobUrl> {
        self.pane().live_blob.clone()
    }

    /// The registry blob URLs are issued from.
    pub fn blobs(&self) -> &Arc<BlobRegistry> {
        &self.blobs
    }

    /// Replace the pane contents, revoking the previous blob. Returns the
    /// new generation.
    fn replace(&self, state: PreviewState) -> u64 {
        let mut pane = self.pane();
        pane.generation += 1;
        if let Some(blob) = pane.live_blob.take() {
            self.blobs.revoke(&blob);
        }
        pane.state = state;
        pane.generation
    }

    /// Open a file in the preview.
    pub async fn open(&self, file: &File) -> PreviewState {
        let kind = PreviewKind::classify(&file.mime_type, &file.name);
        debug!(file_id = %file.id, ?kind, "Opening preview");

        let state = match kind {
            PreviewKind::Image => PreviewState::Image {
                url: file.url.clone(),
            },
            PreviewKind::Video => PreviewState::Video {
                url: file.url.clone(),
            },
            PreviewKind::Document(kind) => PreviewState::Document {
                kind,
                icon: kind.icon().to_string(),
                download_url: file.url.clone(),
            },
            PreviewKind::Zip => PreviewState::DownloadOnly {
                download_url: file.url.clone(),
            },
            PreviewKind::Unsupported => PreviewState::Unsupported {
                mime_type: file.mime_type.clone(),
                download_url: file.url.clone(),
            },
            PreviewKind::Pdf => return self.open_pdf(file).await,
        };
        self.replace(state.clone());
        state
    }

    async fn open_pdf(&self, file: &File) -> PreviewState {
        let generation = self.replace(PreviewState::LoadingPdf {
            source_url: file.url.clone(),
        });

        let fetched =
            tokio::time::timeout(self.pdf_timeout, self.fetcher.fetch_bytes(&file.url)).await;

        let mut pane = self.pane();
        if pane.generation != generation {
            // Superseded while fetching: the bytes never become a blob.
            if let Ok(Ok(_)) = fetched {
                warn!(file_id = %file.id, "Discarding PDF fetched for a closed preview");
            }
            return pane.state.clone();
        }

        pane.state = match fetched {
            Ok(Ok(data)) => {
                let blob_url = self.blobs.create(data, "application/pdf");
                pane.live_blob = Some(blob_url.clone());
                info!(file_id = %file.id, "PDF preview ready");
                PreviewState::Pdf {
                    blob_url,
                    source_url: file.url.clone(),
                }
            }
            Ok(Err(e)) => {
                warn!(file_id = %file.id, error = %e, "PDF fetch failed");
                PreviewState::Unavailable {
                    reason: e.user_message(),
                    download_url: file.url.clone(),
                }
            }
            Err(_) => {
                warn!(
                    file_id = %file.id,
                    timeout_secs = self.pdf_timeout.as_secs(),
                    "PDF fetch timed out"
                );
                PreviewState::Unavailable {
                    reason: "Preview timed out".to_string(),
                    download_url: file.url.clone(),
                }
            }
        };
        pane.state.clone()
    }

    /// The embedded viewer failed to render the current PDF.
    pub fn report_render_error(&self) -> PreviewState {
        let mut pane = self.pane();
        if let PreviewState::Pdf { source_url, .. } = &pane.state {
            let download_url = source_url.clone();
            if let Some(blob) = pane.live_blob.take() {
                self.blobs.revoke(&blob);
            }
            warn!("PDF viewer failed, falling back to download");
            pane.state = PreviewState::Unavailable {
                reason: "Preview unavailable".to_string(),
                download_url,
            };
        }
        pane.state.clone()
    }

    /// Close the preview and release its blob.
    pub fn close(&self) {
        self.replace(PreviewState::Closed);
    }

    /// Run the download action of the current state.
    ///
    /// `Ok(None)` when the state offers no download or one is already running.
    pub async fn download_current(&self, file_name: &str) -> AppResult<Option<Download>> {
        let Some(url) = self.state().download_url().map(str::to_string) else {
            return Ok(None);
        };
        self.downloader.download(&url, file_name).await
    }

    /// Download any file through this preview's downloader.
    pub async fn download(&self, file: &File) -> AppResult<Option<Download>> {
        self.downloader.download(&file.url, &file.name).await
    }
}

impl Drop for PreviewDispatcher {
    fn drop(&mut self) {
        let pane = self.pane.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(blob) = pane.live_blob.take() {
            self.blobs.revoke(&blob);
        }
    }
}
