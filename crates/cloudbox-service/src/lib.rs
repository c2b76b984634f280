//! # cloudbox-service
//!
//! Client-side state and services for Cloudbox. Each store owns one slice
//! of session state (tree cache, selection, preview pane) and talks to the
//! backend only through the [`FileApi`](cloudbox_client::FileApi) trait.
//!
//! Services follow constructor injection: dependencies are provided at
//! construction time via `Arc` references. The [`Workspace`] wires them
//! together and routes user intents.

pub mod notify;
pub mod preview;
pub mod selection;
pub mod share;
pub mod tree;
pub mod upload;
pub mod workspace;

pub use notify::{MemoryNotifier, Notification, NotificationLevel, Notifier};
pub use preview::{BlobRegistry, Download, Downloader, PreviewDispatcher, PreviewKind, PreviewState};
pub use selection::SelectionModel;
pub use share::ShareService;
pub use tree::{FolderView, PollHandle, StaleScope, TreeStore};
pub use upload::{
    BatchOutcome, BatchReport, CopySource, ItemStatus, LocalFile, UploadParams, UploadPipeline,
};
pub use workspace::{Intent, ItemRef, Outcome, Workspace};
