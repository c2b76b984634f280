//! Keep the tree cache fresh until interrupted.

use std::time::Duration;

use clap::Args;
use serde::Serialize;

use cloudbox_core::error::AppError;
use cloudbox_core::types::FolderId;
use cloudbox_service::{Intent, Workspace};

use super::run;
use crate::output::{self, OutputFormat};

/// Arguments for `watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (configured value if omitted)
    #[arg(short, long)]
    pub interval: Option<u64>,
    /// Folders to keep expanded while watching
    #[arg(long = "expand", value_delimiter = ',')]
    pub expand: Vec<String>,
}

/// One line of watch output
#[derive(Debug, Serialize)]
struct Summary {
    folders: usize,
    files: usize,
    expanded: Vec<String>,
}

/// Poll until Ctrl-C
pub async fn execute(ws: &Workspace, args: &WatchArgs, format: OutputFormat) -> Result<(), AppError> {
    run(ws, Intent::Load).await?;
    for id in &args.expand {
        run(ws, Intent::Expand(FolderId::from(id.as_str()))).await?;
    }

    let poller = match args.interval {
        Some(secs) => ws.watch_every(Duration::from_secs(secs.max(1))),
        None => ws.watch(),
    };
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.unwrap_or(5).max(1)));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => print_summary(ws, format),
        }
    }

    poller.join().await;
    output::print_success("Stopped watching");
    Ok(())
}

fn print_summary(ws: &Workspace, format: OutputFormat) {
    let tree = ws.tree();
    let summary = Summary {
        folders: tree.folder_tree().map(|t| t.total_folders()).unwrap_or(0),
        files: tree.root_files().map(|f| f.len()).unwrap_or(0),
        expanded: tree
            .expanded_folders()
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&summary).unwrap_or_default());
        }
        OutputFormat::Table => println!(
            "{} folders, {} files, expanded: [{}]",
            summary.folders,
            summary.files,
            summary.expanded.join(", ")
        ),
    }
}
