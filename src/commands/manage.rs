//! Folder and file management commands.

use clap::Args;

use cloudbox_core::error::AppError;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_service::{Intent, Outcome, Workspace};

use super::{ItemKind, run};
use crate::output::{self, OutputFormat};

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder name
    pub name: String,
    /// Parent folder ID (root if omitted)
    #[arg(short, long)]
    pub parent: Option<String>,
}

/// Arguments for `rename`
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Item type
    #[arg(value_enum)]
    pub kind: ItemKind,
    /// Item ID
    pub id: String,
    /// New name
    pub name: String,
}

/// Arguments for `archive` and `delete`
#[derive(Debug, Args)]
pub struct ItemArgs {
    /// Item type
    #[arg(value_enum)]
    pub kind: ItemKind,
    /// Item ID
    pub id: String,
}

/// Arguments for `move`
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// File ID
    pub file_id: String,
    /// Target folder ID (root if omitted)
    #[arg(short, long)]
    pub to: Option<String>,
}

/// Create a folder
pub async fn mkdir(ws: &Workspace, args: &MkdirArgs, format: OutputFormat) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    let outcome = run(
        ws,
        Intent::CreateFolder {
            name: args.name.clone(),
            parent: args.parent.as_deref().map(FolderId::from),
        },
    )
    .await?;

    if let Outcome::FolderCreated {
        folder: Some(folder),
    } = outcome
    {
        match format {
            OutputFormat::Json => output::print_json(&folder),
            OutputFormat::Table => output::print_fields(&[("ID", folder.id.as_str())]),
        }
    }
    Ok(())
}

/// Rename a file or folder
pub async fn rename(ws: &Workspace, args: &RenameArgs) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    run(
        ws,
        Intent::Rename {
            item: args.kind.item(&args.id),
            new_name: args.name.clone(),
        },
    )
    .await?;
    Ok(())
}

/// Archive a file or folder
pub async fn archive(ws: &Workspace, args: &ItemArgs) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    run(ws, Intent::Archive(args.kind.item(&args.id))).await?;
    Ok(())
}

/// Delete a file or folder
pub async fn delete(ws: &Workspace, args: &ItemArgs) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    run(ws, Intent::Delete(args.kind.item(&args.id))).await?;
    Ok(())
}

/// Move a file
pub async fn move_file(ws: &Workspace, args: &MoveArgs) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    run(
        ws,
        Intent::Move {
            file_id: FileId::from(args.file_id.as_str()),
            target: args.to.as_deref().map(FolderId::from),
        },
    )
    .await?;
    Ok(())
}
