//! Preview dispatcher configuration.

use serde::{Deserialize, Serialize};

/// Preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Upper bound on the PDF binary fetch before falling back to download-only.
    #[serde(default = "default_pdf_timeout")]
    pub pdf_fetch_timeout_seconds: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            pdf_fetch_timeout_seconds: default_pdf_timeout(),
        }
    }
}

fn default_pdf_timeout() -> u64 {
    10
}
