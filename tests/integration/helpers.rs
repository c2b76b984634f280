//! Shared test helpers for integration tests.

use std::sync::Arc;

use cloudbox_client::MemoryFileApi;
use cloudbox_core::config::AppConfig;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_service::{Intent, MemoryNotifier, Outcome, Workspace};

/// Test application context
pub struct TestApp {
    /// The drive backing the workspace
    pub api: Arc<MemoryFileApi>,
    /// Everything the workspace reported to the user
    pub notifier: Arc<MemoryNotifier>,
    /// The session under test
    pub ws: Arc<Workspace>,
}

impl TestApp {
    /// Create a workspace over an empty drive
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a workspace over an empty drive with custom settings
    pub fn with_config(config: AppConfig) -> Self {
        let api = Arc::new(MemoryFileApi::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let ws = Arc::new(Workspace::new(api.clone(), &config, notifier.clone()));
        Self { api, notifier, ws }
    }

    /// Dispatch an intent
    pub async fn dispatch(&self, intent: Intent) -> Outcome {
        self.ws.dispatch(intent).await
    }

    /// Message of the most recent notification
    pub fn last_message(&self) -> Option<String> {
        self.notifier.last().map(|n| n.message)
    }
}

/// Ids seeded by [`seed_docs`]
pub struct DocsDrive {
    pub docs: FolderId,
    pub reports: FolderId,
    pub budget: FileId,
    pub summary: FileId,
    pub loose: FileId,
}

/// A Docs folder holding two files and one sub-folder, plus a root-level file
pub fn seed_docs(api: &MemoryFileApi) -> DocsDrive {
    let docs = api.add_folder("Docs", None);
    let reports = api.add_folder("Reports", Some(&docs));
    let budget = api.add_file("budget.pdf", "application/pdf", Some(&docs), &b"%PDF-1.7"[..]);
    let summary = api.add_file("summary.png", "image/png", Some(&docs), &b"\x89PNG"[..]);
    let loose = api.add_file("notes.zip", "application/zip", None, &b"PK"[..]);
    DocsDrive {
        docs,
        reports,
        budget,
        summary,
        loose,
    }
}
