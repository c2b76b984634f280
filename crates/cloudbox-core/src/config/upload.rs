//! Upload pipeline configuration.

use serde::{Deserialize, Serialize};

/// Upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum upload size in bytes (default 100 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Message strings the backend uses to acknowledge a stored upload.
    /// A boolean `success: true` in the body is accepted as well.
    #[serde(default = "default_success_markers")]
    pub success_markers: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: default_max_upload(),
            success_markers: default_success_markers(),
        }
    }
}

fn default_max_upload() -> u64 {
    100 * 1024 * 1024
}

fn default_success_markers() -> Vec<String> {
    vec!["File uploaded successfully".to_string()]
}
