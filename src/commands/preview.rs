//! Preview and download commands.

use std::path::{Path, PathBuf};

use clap::Args;

use cloudbox_core::error::AppError;
use cloudbox_core::types::FileId;
use cloudbox_service::{Download, Intent, Outcome, PreviewState, Workspace};

use super::run;
use crate::output::{self, OutputFormat};

/// Arguments for `preview`
#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// File ID
    pub file_id: String,
    /// Where to save the file when the preview falls back to a download
    #[arg(short, long, default_value = ".")]
    pub dest: PathBuf,
}

/// Arguments for `download`
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File ID
    pub file_id: String,
    /// Destination file or directory
    #[arg(default_value = ".")]
    pub dest: PathBuf,
}

/// Open a file in the preview pane and show the resulting state
pub async fn preview(ws: &Workspace, args: &PreviewArgs, format: OutputFormat) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    let Outcome::Preview { state, download } =
        run(ws, Intent::Open(FileId::from(args.file_id.as_str()))).await?
    else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => output::print_json(&state),
        OutputFormat::Table => print_state(&state),
    }

    if let Some(download) = download {
        save(&download, &args.dest).await?;
    }
    run(ws, Intent::ClosePreview).await?;
    Ok(())
}

/// Download a file to disk
pub async fn download(ws: &Workspace, args: &DownloadArgs) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    let id = FileId::from(args.file_id.as_str());
    let file = ws
        .tree()
        .find_file(&id)
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

    match ws.preview().download(&file).await? {
        Some(download) => save(&download, &args.dest).await,
        None => {
            output::print_warning("Download already in progress");
            Ok(())
        }
    }
}

fn print_state(state: &PreviewState) {
    let kind;
    let fields: Vec<(&str, &str)> = match state {
        PreviewState::Closed => vec![("Preview", "closed")],
        PreviewState::Image { url } => vec![("Preview", "image"), ("URL", url.as_str())],
        PreviewState::Video { url } => vec![("Preview", "video"), ("URL", url.as_str())],
        PreviewState::LoadingPdf { source_url } => {
            vec![("Preview", "pdf (loading)"), ("Source", source_url.as_str())]
        }
        PreviewState::Pdf {
            blob_url,
            source_url,
        } => vec![
            ("Preview", "pdf"),
            ("Blob", blob_url.as_str()),
            ("Source", source_url.as_str()),
        ],
        PreviewState::Document {
            kind: document,
            icon,
            download_url,
        } => {
            kind = format!("{document:?} document");
            vec![("Preview", kind.as_str()), ("Icon", icon.as_str()), ("Download", download_url.as_str())]
        }
        PreviewState::DownloadOnly { download_url } => {
            vec![("Preview", "archive (download only)"), ("Download", download_url.as_str())]
        }
        PreviewState::Unavailable {
            reason,
            download_url,
        } => vec![
            ("Preview", "unavailable"),
            ("Reason", reason.as_str()),
            ("Download", download_url.as_str()),
        ],
        PreviewState::Unsupported {
            mime_type,
            download_url,
        } => vec![
            ("Preview", "not supported"),
            ("Type", mime_type.as_str()),
            ("Download", download_url.as_str()),
        ],
    };
    output::print_fields(&fields);
}

async fn save(download: &Download, dest: &Path) -> Result<(), AppError> {
    let path = if dest.is_dir() {
        dest.join(&download.file_name)
    } else {
        dest.to_path_buf()
    };

    tokio::fs::write(&path, &download.data)
        .await
        .map_err(|e| AppError::internal(format!("Cannot write '{}': {e}", path.display())))?;
    output::print_success(&format!(
        "Saved {} ({})",
        path.display(),
        output::human_size(download.data.len() as u64)
    ));
    Ok(())
}
