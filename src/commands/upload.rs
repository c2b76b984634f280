//! Upload and batch copy commands.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use cloudbox_core::error::AppError;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::file::FileCategory;
use cloudbox_service::{Intent, ItemRef, ItemStatus, LocalFile, Outcome, UploadParams, Workspace};

use super::run;
use crate::output::{self, OutputFormat};

/// Arguments for `upload`
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local file path
    pub path: PathBuf,
    /// Category the file must belong to (image, video, document, zip)
    #[arg(short, long)]
    pub category: String,
    /// Destination folder ID (root if omitted)
    #[arg(long)]
    pub folder: Option<String>,
}

/// Arguments for `copy`
#[derive(Debug, Args)]
pub struct CopyArgs {
    /// Target folder ID (root if omitted)
    #[arg(short, long)]
    pub into: Option<String>,
    /// File IDs to copy, in order
    #[arg(required = true)]
    pub file_ids: Vec<String>,
}

/// Batch item display row
#[derive(Debug, Serialize, Tabled)]
struct CopyRow {
    /// File ID
    id: String,
    /// Name
    name: String,
    /// Result
    status: String,
}

/// Upload a local file
pub async fn upload(ws: &Workspace, args: &UploadArgs, format: OutputFormat) -> Result<(), AppError> {
    let category: FileCategory = args.category.parse()?;
    let file = LocalFile::from_path(&args.path).await?;

    let outcome = run(
        ws,
        Intent::Upload(UploadParams {
            category,
            file: Some(file),
            folder_id: args.folder.as_deref().map(FolderId::from),
        }),
    )
    .await?;

    if let Outcome::Uploaded { receipt } = outcome
        && let Some(stored) = receipt.file
    {
        match format {
            OutputFormat::Json => output::print_json(&stored),
            OutputFormat::Table => output::print_fields(&[("ID", stored.id.as_str())]),
        }
    }
    Ok(())
}

/// Copy existing files into a folder, one after another
pub async fn copy(ws: &Workspace, args: &CopyArgs, format: OutputFormat) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    run(ws, Intent::EnterSelectionMode).await?;
    for id in &args.file_ids {
        run(ws, Intent::Select(ItemRef::File(FileId::from(id.as_str())))).await?;
    }

    let outcome = run(
        ws,
        Intent::CopySelection {
            target: args.into.as_deref().map(FolderId::from),
        },
    )
    .await?;

    let Outcome::Copied { report } = outcome else {
        return Ok(());
    };
    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            let rows: Vec<CopyRow> = report
                .items
                .iter()
                .map(|item| CopyRow {
                    id: item.file_id.to_string(),
                    name: item.name.clone(),
                    status: match &item.status {
                        ItemStatus::Pending => "pending".to_string(),
                        ItemStatus::Success => "copied".to_string(),
                        ItemStatus::Error(e) => format!("failed: {e}"),
                    },
                })
                .collect();
            output::print_list(&rows, format, "Nothing was copied.");
        }
    }
    Ok(())
}
