//! File previews: classification, the preview pane, blob URLs and downloads.

pub mod blob;
pub mod dispatcher;
pub mod download;
pub mod kind;

pub use blob::{BlobRegistry, BlobUrl};
pub use dispatcher::{PreviewDispatcher, PreviewState};
pub use download::{Download, Downloader};
pub use kind::{DocumentKind, PreviewKind};
