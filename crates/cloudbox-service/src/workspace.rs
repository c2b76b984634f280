//! The session that owns every store and routes user intents to them.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use cloudbox_client::FileApi;
use cloudbox_core::config::AppConfig;
use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::file::File;
use cloudbox_entity::folder::Folder;
use cloudbox_entity::selection::Selection;
use cloudbox_entity::share::ShareLink;

use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::preview::{Download, PreviewDispatcher, PreviewState};
use crate::selection::SelectionModel;
use crate::share::ShareService;
use crate::tree::{PollHandle, TreeStore};
use crate::upload::{
    BatchOutcome, BatchReport, CopySource, UploadParams, UploadPipeline, UploadReceipt,
};

/// A file or folder the user acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    File(FileId),
    Folder(FolderId),
}

/// Something the user asked for.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Fetch the folder tree and the all-files listing.
    Load,
    /// Refetch whatever was invalidated.
    Refresh,
    Expand(FolderId),
    Collapse(FolderId),
    /// Toggle an item in the selection.
    Select(ItemRef),
    EnterSelectionMode,
    ExitSelectionMode,
    /// Open a cached file in the preview.
    Open(FileId),
    ClosePreview,
    Share(ItemRef),
    /// Share everything selected under one link.
    ShareSelection,
    CreateFolder {
        name: String,
        parent: Option<FolderId>,
    },
    Rename {
        item: ItemRef,
        new_name: String,
    },
    Archive(ItemRef),
    Delete(ItemRef),
    Move {
        file_id: FileId,
        target: Option<FolderId>,
    },
    Upload(UploadParams),
    /// Copy the selected files into a folder.
    CopySelection {
        target: Option<FolderId>,
    },
}

/// What handling an intent produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Loaded {
        folders: usize,
        files: usize,
    },
    Refreshed {
        scopes: usize,
    },
    Files {
        files: Vec<File>,
    },
    Selected {
        selected: bool,
        count: usize,
    },
    Preview {
        state: PreviewState,
        #[serde(skip)]
        download: Option<Download>,
    },
    Shared {
        link: ShareLink,
    },
    FolderCreated {
        folder: Option<Folder>,
    },
    Uploaded {
        #[serde(skip)]
        receipt: UploadReceipt,
    },
    Copied {
        report: BatchReport,
    },
    /// The intent failed; the user has already been notified.
    Failed {
        message: String,
        #[serde(skip)]
        error: AppError,
    },
}

/// One user session: tree cache, selection, preview pane and services.
///
/// Failures never escape [`Workspace::dispatch`]; they are reported through
/// the notifier and returned as [`Outcome::Failed`].
#[derive(Debug)]
pub struct Workspace {
    tree: Arc<TreeStore>,
    selection: Arc<Mutex<SelectionModel>>,
    shares: ShareService,
    preview: PreviewDispatcher,
    uploads: UploadPipeline,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
}

impl Workspace {
    /// Wire every store to `api`.
    pub fn new(api: Arc<dyn FileApi>, config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            tree: Arc::new(TreeStore::new(api.clone())),
            selection: Arc::new(Mutex::new(SelectionModel::new())),
            shares: ShareService::new(api.clone()),
            preview: PreviewDispatcher::new(api.clone(), &config.preview),
            uploads: UploadPipeline::new(api, config.upload.clone()),
            notifier,
            poll_interval: Duration::from_secs(config.tree.poll_interval_seconds),
        }
    }

    pub fn tree(&self) -> &Arc<TreeStore> {
        &self.tree
    }

    pub fn preview(&self) -> &PreviewDispatcher {
        &self.preview
    }

    fn selection_model(&self) -> MutexGuard<'_, SelectionModel> {
        lock(&self.selection)
    }

    /// Copy of the current selection.
    pub fn selection(&self) -> Selection {
        self.selection_model().snapshot()
    }

    pub fn selection_active(&self) -> bool {
        self.selection_model().is_active()
    }

    /// Start background polling at the configured interval.
    ///
    /// Every applied poll prunes the selection like [`Intent::Refresh`].
    pub fn watch(&self) -> PollHandle {
        self.watch_every(self.poll_interval)
    }

    /// Start background polling at a custom interval.
    pub fn watch_every(&self, interval: Duration) -> PollHandle {
        let selection = Arc::clone(&self.selection);
        self.tree
            .watch_with(interval, move |tree| prune_selection(tree, &selection))
    }

    /// Handle an intent, turning any failure into a notification.
    pub async fn dispatch(&self, intent: Intent) -> Outcome {
        debug!(?intent, "Dispatching intent");
        match self.handle(intent).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(kind = %error.kind, error = %error, "Intent failed");
                self.notifier.notify(Notification::from_error(&error));
                Outcome::Failed {
                    message: error.user_message(),
                    error,
                }
            }
        }
    }

    fn success(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::success(message));
    }

    async fn handle(&self, intent: Intent) -> AppResult<Outcome> {
        match intent {
            Intent::Load => {
                let folders = self.tree.load_root_folders().await?;
                let files = self.tree.load_root_files().await?;
                self.prune_selection();
                Ok(Outcome::Loaded {
                    folders: folders.len(),
                    files: files.len(),
                })
            }
            Intent::Refresh => {
                let scopes = self.tree.refresh_stale().await?;
                self.prune_selection();
                Ok(Outcome::Refreshed { scopes })
            }
            Intent::Expand(id) => {
                let files = self.tree.expand_folder(&id).await?;
                Ok(Outcome::Files { files })
            }
            Intent::Collapse(id) => {
                self.tree.collapse_folder(&id);
                Ok(Outcome::Done)
            }
            Intent::Select(item) => {
                let mut model = self.selection_model();
                let selected = match &item {
                    ItemRef::File(id) => model.toggle_file(id),
                    ItemRef::Folder(id) => model.toggle_folder(id),
                };
                Ok(Outcome::Selected {
                    selected,
                    count: model.len(),
                })
            }
            Intent::EnterSelectionMode => {
                self.selection_model().enter_selection_mode();
                Ok(Outcome::Done)
            }
            Intent::ExitSelectionMode => {
                self.selection_model().exit_selection_mode();
                Ok(Outcome::Done)
            }
            Intent::Open(id) => self.open(&id).await,
            Intent::ClosePreview => {
                self.preview.close();
                Ok(Outcome::Done)
            }
            Intent::Share(item) => {
                let link = match &item {
                    ItemRef::File(id) => {
                        let link = self.shares.share_file(id).await?;
                        self.tree.record_share_link(id, &link.url);
                        link
                    }
                    ItemRef::Folder(id) => self.shares.share_folder(id).await?,
                };
                self.success("Share link created");
                Ok(Outcome::Shared { link })
            }
            Intent::ShareSelection => {
                let selection = self.selection();
                let link = self.shares.share_selection(&selection).await?;
                self.selection_model().clear();
                self.success(format!("Share link created for {} items", selection.len()));
                Ok(Outcome::Shared { link })
            }
            Intent::CreateFolder { name, parent } => {
                let folder = self.tree.create_folder(&name, parent.as_ref()).await?;
                self.success(format!("Folder '{name}' created"));
                Ok(Outcome::FolderCreated { folder })
            }
            Intent::Rename { item, new_name } => {
                match &item {
                    ItemRef::File(id) => self.tree.rename_file(id, &new_name).await?,
                    ItemRef::Folder(id) => self.tree.rename_folder(id, &new_name).await?,
                }
                self.success(format!("Renamed to '{new_name}'"));
                Ok(Outcome::Done)
            }
            Intent::Archive(item) => {
                match &item {
                    ItemRef::File(id) => self.tree.archive_file(id).await?,
                    ItemRef::Folder(id) => self.tree.archive_folder(id).await?,
                }
                self.success("Moved to archive");
                Ok(Outcome::Done)
            }
            Intent::Delete(item) => {
                match &item {
                    ItemRef::File(id) => self.tree.delete_file(id).await?,
                    ItemRef::Folder(id) => self.tree.delete_folder(id).await?,
                }
                self.success("Deleted");
                Ok(Outcome::Done)
            }
            Intent::Move { file_id, target } => {
                self.tree.move_file(&file_id, target.as_ref()).await?;
                self.success("File moved");
                Ok(Outcome::Done)
            }
            Intent::Upload(params) => {
                let target = params.folder_id.clone();
                let receipt = self.uploads.upload(params).await?;
                self.tree.invalidate(target.as_ref());
                self.success(
                    receipt
                        .message
                        .clone()
                        .unwrap_or_else(|| "File uploaded".to_string()),
                );
                Ok(Outcome::Uploaded { receipt })
            }
            Intent::CopySelection { target } => self.copy_selection(target).await,
        }
    }

    async fn open(&self, id: &FileId) -> AppResult<Outcome> {
        let file = self
            .tree
            .find_file(id)
            .ok_or_else(|| AppError::not_found(format!("File {id} is not loaded")))?;

        let state = self.preview.open(&file).await;
        let download = match &state {
            PreviewState::DownloadOnly { .. } => self.preview.download(&file).await?,
            PreviewState::Unavailable { reason, .. } => {
                self.notifier
                    .notify(Notification::warning(format!("{reason}, download instead")));
                None
            }
            _ => None,
        };
        Ok(Outcome::Preview { state, download })
    }

    async fn copy_selection(&self, target: Option<FolderId>) -> AppResult<Outcome> {
        let mut ids: Vec<FileId> = self.selection().file_ids.into_iter().collect();
        ids.sort();

        let sources: Vec<CopySource> = ids
            .into_iter()
            .map(|id| match self.tree.find_file(&id) {
                Some(file) => CopySource::Loaded(file),
                None => CopySource::Missing(id),
            })
            .collect();

        let (progress, _) = watch::channel(Vec::new());
        let report = self
            .uploads
            .copy_sources(&sources, target.as_ref(), &progress)
            .await?;
        self.tree.invalidate(target.as_ref());

        let level = match report.outcome() {
            BatchOutcome::AllSucceeded => {
                self.selection_model().clear();
                NotificationLevel::Success
            }
            BatchOutcome::Partial => NotificationLevel::Warning,
            BatchOutcome::AllFailed => NotificationLevel::Error,
        };
        self.notifier
            .notify(Notification::new(level, report.message()));
        Ok(Outcome::Copied { report })
    }

    fn prune_selection(&self) {
        prune_selection(&self.tree, &self.selection);
    }
}

fn lock(selection: &Mutex<SelectionModel>) -> MutexGuard<'_, SelectionModel> {
    selection.lock().unwrap_or_else(|e| e.into_inner())
}

/// Drop selected ids the refreshed listings no longer contain.
fn prune_selection(tree: &TreeStore, selection: &Mutex<SelectionModel>) {
    if let Some((files, folders)) = tree.known_ids() {
        lock(selection).retain_existing(&files, &folders);
    }
}

#[cfg(test)]
mod tests {
    use cloudbox_client::MemoryFileApi;

    use super::*;
    use crate::notify::MemoryNotifier;

    fn workspace() -> (Arc<MemoryFileApi>, Arc<MemoryNotifier>, Workspace) {
        let api = Arc::new(MemoryFileApi::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let ws = Workspace::new(api.clone(), &AppConfig::default(), notifier.clone());
        (api, notifier, ws)
    }

    #[tokio::test]
    async fn test_failure_becomes_notification() {
        let (_, notifier, ws) = workspace();
        let outcome = ws.dispatch(Intent::ShareSelection).await;

        assert!(matches!(outcome, Outcome::Failed { ref error, .. } if error.is_validation()));
        let last = notifier.last().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert_eq!(last.message, "Select at least one item to share");
    }

    #[tokio::test]
    async fn test_batch_share_clears_selection() {
        let (api, _, ws) = workspace();
        let file = api.add_file("a.png", "image/png", None, &b"png"[..]);
        ws.dispatch(Intent::Select(ItemRef::File(file))).await;

        let outcome = ws.dispatch(Intent::ShareSelection).await;
        assert!(matches!(outcome, Outcome::Shared { .. }));
        assert!(ws.selection().is_empty());
        assert!(ws.selection_active());
    }

    #[tokio::test]
    async fn test_toggle_makes_no_request() {
        let (api, _, ws) = workspace();
        ws.dispatch(Intent::Select(ItemRef::Folder("9".into()))).await;
        ws.dispatch(Intent::Select(ItemRef::File("42".into()))).await;
        assert_eq!(ws.selection().len(), 2);
        assert_eq!(api.request_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_prunes_deleted_ids() {
        let (api, _, ws) = workspace();
        let keep = api.add_file("a.png", "image/png", None, &b"png"[..]);
        let gone = api.add_file("b.png", "image/png", None, &b"png"[..]);
        ws.dispatch(Intent::Load).await;
        ws.dispatch(Intent::Select(ItemRef::File(keep.clone()))).await;
        ws.dispatch(Intent::Select(ItemRef::File(gone.clone()))).await;

        ws.dispatch(Intent::Delete(ItemRef::File(gone.clone()))).await;
        let outcome = ws.dispatch(Intent::Refresh).await;

        assert!(matches!(outcome, Outcome::Refreshed { .. }));
        let selection = ws.selection();
        assert!(selection.file_ids.contains(&keep));
        assert!(!selection.file_ids.contains(&gone));
    }

    #[tokio::test]
    async fn test_open_zip_downloads_immediately() {
        let (api, _, ws) = workspace();
        let zip = api.add_file("a.zip", "application/zip", None, &b"PK"[..]);
        ws.dispatch(Intent::Load).await;

        let Outcome::Preview { state, download } = ws.dispatch(Intent::Open(zip)).await else {
            panic!("expected a preview outcome");
        };
        assert!(matches!(state, PreviewState::DownloadOnly { .. }));
        assert_eq!(download.map(|d| d.file_name), Some("a.zip".to_string()));
    }

    #[tokio::test]
    async fn test_open_unknown_file_fails_softly() {
        let (_, notifier, ws) = workspace();
        let outcome = ws.dispatch(Intent::Open("missing".into())).await;
        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(notifier.entries().len(), 1);
    }
}
