//! Read-only browsing commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use cloudbox_core::error::AppError;
use cloudbox_core::types::FolderId;
use cloudbox_entity::file::{File, FileCategory, ListFilter};
use cloudbox_service::{Intent, Outcome, Workspace};

use crate::output::{self, OutputFormat};

/// Arguments for `files`
#[derive(Debug, Args)]
pub struct FilesArgs {
    /// Only files of this category (image, video, document, zip)
    #[arg(short, long, conflicts_with = "archived")]
    pub category: Option<String>,
    /// Only archived files
    #[arg(short, long)]
    pub archived: bool,
    /// Only files outside every folder
    #[arg(short, long, conflicts_with_all = ["category", "archived"])]
    pub root_only: bool,
}

/// Arguments for `expand`
#[derive(Debug, Args)]
pub struct ExpandArgs {
    /// Folder ID
    pub folder_id: String,
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name, indented by depth
    name: String,
    /// Number of sub-folders
    folders: usize,
}

/// File display row
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    /// File ID
    pub id: String,
    /// Name
    pub name: String,
    /// MIME type
    #[tabled(rename = "type")]
    pub mime_type: String,
    /// Size
    pub size: String,
    /// Containing folder
    pub folder: String,
    /// Created at
    pub created_at: String,
}

impl From<&File> for FileRow {
    fn from(f: &File) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            mime_type: f.mime_type.clone(),
            size: output::human_size(f.size_bytes),
            folder: f
                .folder_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string()),
            created_at: f
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Print files in the selected format
pub fn print_files(files: &[File], format: OutputFormat) {
    let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
    output::print_list(&rows, format, "No files found.");
}

/// Show the folder tree
pub async fn folders(ws: &Workspace, format: OutputFormat) -> Result<(), AppError> {
    ws.tree().load_root_folders().await?;
    let tree = ws.tree().folder_tree().unwrap_or_default();

    match format {
        OutputFormat::Json => output::print_json(&tree.roots),
        OutputFormat::Table => {
            let rows: Vec<FolderRow> = tree
                .flatten()
                .into_iter()
                .map(|node| FolderRow {
                    id: node.id.to_string(),
                    name: format!("{}{}", "  ".repeat(node.depth), node.name),
                    folders: node.child_count,
                })
                .collect();
            output::print_list(&rows, format, "No folders yet.");
        }
    }
    Ok(())
}

/// List files
pub async fn files(ws: &Workspace, args: &FilesArgs, format: OutputFormat) -> Result<(), AppError> {
    let files = if args.root_only {
        ws.tree().load_root_files().await?;
        ws.tree().root_level_files()
    } else if args.archived {
        ws.tree().list_files(ListFilter::Archived).await?
    } else if let Some(category) = &args.category {
        let category: FileCategory = category.parse()?;
        ws.tree().list_files(ListFilter::Category(category)).await?
    } else {
        ws.tree().load_root_files().await?
    };

    print_files(&files, format);
    Ok(())
}

/// List the files directly inside a folder
pub async fn expand(ws: &Workspace, args: &ExpandArgs, format: OutputFormat) -> Result<(), AppError> {
    let folder_id = FolderId::from(args.folder_id.as_str());
    let Outcome::Files { files } = super::run(ws, Intent::Expand(folder_id.clone())).await? else {
        return Ok(());
    };

    if files.is_empty() && format == OutputFormat::Table {
        println!("(empty folder)");
        return Ok(());
    }
    print_files(&files, format);
    Ok(())
}
