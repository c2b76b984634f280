//! Uploads from disk and copies of existing drive files.

pub mod batch;
pub mod local;
pub mod pipeline;

pub use batch::{BatchItem, BatchOutcome, BatchReport, CopySource, ItemStatus};
pub use local::LocalFile;
pub use pipeline::{UploadParams, UploadPipeline, UploadReceipt};
