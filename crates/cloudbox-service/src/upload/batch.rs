//! Per-item tracking for batch copies.

use serde::Serialize;

use cloudbox_core::types::FileId;
use cloudbox_entity::file::File;

/// Progress of one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Success,
    Error(String),
}

/// How a finished batch went overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    AllSucceeded,
    Partial,
    AllFailed,
}

/// A selected file queued for copying.
#[derive(Debug, Clone, PartialEq)]
pub enum CopySource {
    /// Known to the tree cache.
    Loaded(File),
    /// Selected but absent from every cached listing.
    Missing(FileId),
}

impl CopySource {
    pub fn file_id(&self) -> &FileId {
        match self {
            Self::Loaded(file) => &file.id,
            Self::Missing(id) => id,
        }
    }

    fn name(&self) -> String {
        match self {
            Self::Loaded(file) => file.name.clone(),
            Self::Missing(id) => id.to_string(),
        }
    }
}

/// One item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub file_id: FileId,
    pub name: String,
    pub status: ItemStatus,
}

impl BatchItem {
    /// Initial entry for a source; missing files fail up front.
    pub(crate) fn queued(source: &CopySource) -> Self {
        let status = match source {
            CopySource::Loaded(_) => ItemStatus::Pending,
            CopySource::Missing(_) => ItemStatus::Error("File is not loaded".to_string()),
        };
        Self {
            file_id: source.file_id().clone(),
            name: source.name(),
            status,
        }
    }
}

/// Result of a finished batch, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Success)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::Error(_)))
            .count()
    }

    pub fn outcome(&self) -> BatchOutcome {
        match (self.succeeded(), self.failed()) {
            (_, 0) => BatchOutcome::AllSucceeded,
            (0, _) => BatchOutcome::AllFailed,
            _ => BatchOutcome::Partial,
        }
    }

    /// Summary shown to the user; each outcome reads differently.
    pub fn message(&self) -> String {
        let total = self.items.len();
        match self.outcome() {
            BatchOutcome::AllSucceeded => format!("All {total} files copied successfully"),
            BatchOutcome::Partial => format!(
                "{} of {total} files copied, {} failed",
                self.succeeded(),
                self.failed()
            ),
            BatchOutcome::AllFailed => format!("Could not copy any of the {total} files"),
        }
    }
}
