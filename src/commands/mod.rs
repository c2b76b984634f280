//! CLI command definitions and dispatch.

pub mod browse;
pub mod manage;
pub mod preview;
pub mod share;
pub mod upload;
pub mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use cloudbox_client::{FileApi, HttpFileApi};
use cloudbox_core::config::AppConfig;
use cloudbox_core::error::AppError;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_service::{Intent, ItemRef, Outcome, Workspace};

use crate::output::{ConsoleNotifier, OutputFormat};

/// Cloudbox: browse, share, preview and upload files in your cloud drive
#[derive(Debug, Parser)]
#[command(name = "cloudbox", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (overlay file `config/<env>.toml`)
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Use a built-in sample drive instead of the backend
    #[arg(long, global = true)]
    pub offline: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the folder tree
    Folders,
    /// List files
    Files(browse::FilesArgs),
    /// List the files directly inside a folder
    Expand(browse::ExpandArgs),
    /// Create a folder
    Mkdir(manage::MkdirArgs),
    /// Rename a file or folder
    Rename(manage::RenameArgs),
    /// Archive a file or folder
    Archive(manage::ItemArgs),
    /// Delete a file or folder
    Delete(manage::ItemArgs),
    /// Move a file into a folder, or to the root
    Move(manage::MoveArgs),
    /// Create a share link
    Share(share::ShareArgs),
    /// Show how a file would be previewed
    Preview(preview::PreviewArgs),
    /// Download a file
    Download(preview::DownloadArgs),
    /// Upload a local file
    Upload(upload::UploadArgs),
    /// Copy existing files into a folder
    Copy(upload::CopyArgs),
    /// Keep the tree fresh by polling until interrupted
    Watch(watch::WatchArgs),
}

/// Whether an id names a file or a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ItemKind {
    /// A file
    File,
    /// A folder
    Folder,
}

impl ItemKind {
    /// Pair the kind with an id.
    pub fn item(self, id: &str) -> ItemRef {
        match self {
            Self::File => ItemRef::File(FileId::from(id)),
            Self::Folder => ItemRef::Folder(FolderId::from(id)),
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let ws = self.workspace(config)?;
        let format = self.format;

        match &self.command {
            Commands::Folders => browse::folders(&ws, format).await,
            Commands::Files(args) => browse::files(&ws, args, format).await,
            Commands::Expand(args) => browse::expand(&ws, args, format).await,
            Commands::Mkdir(args) => manage::mkdir(&ws, args, format).await,
            Commands::Rename(args) => manage::rename(&ws, args).await,
            Commands::Archive(args) => manage::archive(&ws, args).await,
            Commands::Delete(args) => manage::delete(&ws, args).await,
            Commands::Move(args) => manage::move_file(&ws, args).await,
            Commands::Share(args) => share::execute(&ws, args, format).await,
            Commands::Preview(args) => preview::preview(&ws, args, format).await,
            Commands::Download(args) => preview::download(&ws, args).await,
            Commands::Upload(args) => upload::upload(&ws, args, format).await,
            Commands::Copy(args) => upload::copy(&ws, args, format).await,
            Commands::Watch(args) => watch::execute(&ws, args, format).await,
        }
    }

    fn workspace(&self, config: &AppConfig) -> Result<Workspace, AppError> {
        let api: Arc<dyn FileApi> = if self.offline {
            tracing::info!("Using the offline sample drive");
            Arc::new(crate::demo::sample_drive())
        } else {
            tracing::debug!(base_url = %config.api.base_url, "Using the drive backend");
            Arc::new(HttpFileApi::new(&config.api)?)
        };
        Ok(Workspace::new(api, config, Arc::new(ConsoleNotifier)))
    }
}

/// Helper: dispatch an intent and turn a failed outcome back into an error
pub async fn run(ws: &Workspace, intent: Intent) -> Result<Outcome, AppError> {
    match ws.dispatch(intent).await {
        Outcome::Failed { error, .. } => Err(error),
        outcome => Ok(outcome),
    }
}
