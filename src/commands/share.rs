//! Share link commands.

use clap::{Args, Subcommand};

use cloudbox_core::error::AppError;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_service::{Intent, ItemRef, Outcome, Workspace};

use super::run;
use crate::output::{self, OutputFormat};

/// Arguments for `share`
#[derive(Debug, Args)]
pub struct ShareArgs {
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// What to share
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Share a single file
    File {
        /// File ID
        id: String,
    },
    /// Share a single folder
    Folder {
        /// Folder ID
        id: String,
    },
    /// Share several files and folders under one link
    Many {
        /// Folder IDs
        #[arg(long = "folder", value_delimiter = ',')]
        folders: Vec<String>,
        /// File IDs
        #[arg(long = "file", value_delimiter = ',')]
        files: Vec<String>,
    },
}

/// Create a share link
pub async fn execute(ws: &Workspace, args: &ShareArgs, format: OutputFormat) -> Result<(), AppError> {
    let outcome = match &args.command {
        ShareCommand::File { id } => {
            run(ws, Intent::Share(ItemRef::File(FileId::from(id.as_str())))).await?
        }
        ShareCommand::Folder { id } => {
            run(ws, Intent::Share(ItemRef::Folder(FolderId::from(id.as_str())))).await?
        }
        ShareCommand::Many { folders, files } => {
            run(ws, Intent::EnterSelectionMode).await?;
            for id in folders {
                run(ws, Intent::Select(ItemRef::Folder(FolderId::from(id.as_str())))).await?;
            }
            for id in files {
                run(ws, Intent::Select(ItemRef::File(FileId::from(id.as_str())))).await?;
            }
            run(ws, Intent::ShareSelection).await?
        }
    };

    if let Outcome::Shared { link } = outcome {
        match format {
            OutputFormat::Json => output::print_json(&link),
            OutputFormat::Table => {
                let kind = link.target_kind.to_string();
                let items = link.target_ids.join(", ");
                output::print_fields(&[
                    ("Kind", kind.as_str()),
                    ("Items", items.as_str()),
                    ("URL", link.url.as_str()),
                ]);
            }
        }
    }
    Ok(())
}
