//! In-process drive backend.
//!
//! Behaves like the REST backend closely enough to drive every service:
//! ids are assigned here, folder listings come back nested, share and
//! upload responses carry the same JSON shapes. Read calls can be held at
//! a [`RequestGate`] so callers can control completion order.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::sync::{Notify, oneshot};
use tracing::debug;

use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::traits::ContentFetcher;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::file::{File, FileCategory, ListFilter};
use cloudbox_entity::folder::Folder;
use cloudbox_entity::share::ShareTarget;

use crate::api::{FileApi, UploadRequest};

/// Which field name share responses carry the link under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareField {
    /// `{"shareUrl": ...}`
    #[default]
    ShareUrl,
    /// `{"shareLink": ...}`
    ShareLink,
    /// A 2xx body without any link.
    Missing,
}

/// Holds read requests until released, in issue order.
#[derive(Debug, Default)]
pub struct RequestGate {
    pending: Mutex<Vec<Option<oneshot::Sender<()>>>>,
    arrived: Notify,
    open: AtomicBool,
}

impl RequestGate {
    /// Create a closed gate.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn slots(&self) -> MutexGuard<'_, Vec<Option<oneshot::Sender<()>>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Called by the backend before answering; waits for release.
    async fn enter(&self) {
        let rx = {
            let mut slots = self.slots();
            if self.open.load(Ordering::SeqCst) {
                return;
            }
            let (tx, rx) = oneshot::channel();
            slots.push(Some(tx));
            rx
        };
        self.arrived.notify_waiters();
        let _ = rx.await;
    }

    /// Number of requests that have reached the gate so far.
    pub fn arrivals(&self) -> usize {
        self.slots().len()
    }

    /// Wait until at least `count` requests have reached the gate.
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.arrived.notified();
            if self.arrivals() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Let the `index`-th arrived request (0-based) complete.
    pub fn release(&self, index: usize) -> bool {
        let sender = self.slots().get_mut(index).and_then(Option::take);
        match sender {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Release everything waiting and let future requests through.
    pub fn open(&self) {
        let mut slots = self.slots();
        self.open.store(true, Ordering::SeqCst);
        for slot in slots.iter_mut() {
            if let Some(tx) = slot.take() {
                let _ = tx.send(());
            }
        }
    }
}

#[derive(Debug, Clone)]
struct StoredFolder {
    id: FolderId,
    name: String,
    parent: Option<FolderId>,
    created_at: DateTime<Utc>,
    archived: bool,
}

#[derive(Debug, Default)]
struct DriveState {
    next_id: u64,
    folders: Vec<StoredFolder>,
    files: Vec<File>,
    contents: HashMap<String, Bytes>,
    share_field: ShareField,
    upload_marker: Option<String>,
    failing_uploads: HashSet<String>,
    failing_urls: HashSet<String>,
}

impl DriveState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn folder_exists(&self, id: &FolderId) -> bool {
        self.folders.iter().any(|f| &f.id == id && !f.archived)
    }

    /// Rebuild the nested folder forest from the flat store.
    fn nested(&self, parent: Option<&FolderId>) -> Vec<Folder> {
        self.folders
            .iter()
            .filter(|f| !f.archived && f.parent.as_ref() == parent)
            .map(|f| Folder {
                id: f.id.clone(),
                name: f.name.clone(),
                parent_folder_id: f.parent.clone(),
                children: self.nested(Some(&f.id)),
                created_at: Some(f.created_at),
            })
            .collect()
    }

    /// Ids of `root` and every folder below it.
    fn subtree(&self, root: &FolderId) -> HashSet<FolderId> {
        let mut ids = HashSet::from([root.clone()]);
        loop {
            let before = ids.len();
            for folder in &self.folders {
                if folder.parent.as_ref().is_some_and(|p| ids.contains(p)) {
                    ids.insert(folder.id.clone());
                }
            }
            if ids.len() == before {
                return ids;
            }
        }
    }

    fn file_mut(&mut self, id: &FileId) -> AppResult<&mut File> {
        self.files
            .iter_mut()
            .find(|f| &f.id == id)
            .ok_or_else(|| AppError::http_status(404, "File not found"))
    }

    fn folder_mut(&mut self, id: &FolderId) -> AppResult<&mut StoredFolder> {
        self.folders
            .iter_mut()
            .find(|f| &f.id == id && !f.archived)
            .ok_or_else(|| AppError::http_status(404, "Folder not found"))
    }
}

/// An in-memory drive implementing [`FileApi`].
#[derive(Debug)]
pub struct MemoryFileApi {
    state: Mutex<DriveState>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<RequestGate>>>,
}

impl Default for MemoryFileApi {
    fn default() -> Self {
        Self {
            state: Mutex::new(DriveState {
                upload_marker: Some("File uploaded successfully".to_string()),
                ..DriveState::default()
            }),
            calls: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }
}

impl MemoryFileApi {
    /// Create an empty drive.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, DriveState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(gate) = gate {
            gate.enter().await;
        }
    }

    /// Number of API calls served so far.
    pub fn request_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Hold read calls (listings and content fetches) at `gate`.
    pub fn set_gate(&self, gate: Option<Arc<RequestGate>>) {
        *self.gate.lock().unwrap_or_else(|e| e.into_inner()) = gate;
    }

    /// Choose the field name share responses use.
    pub fn set_share_field(&self, field: ShareField) {
        self.state().share_field = field;
    }

    /// Message returned on successful upload; `None` omits it.
    pub fn set_upload_marker(&self, marker: Option<&str>) {
        self.state().upload_marker = marker.map(str::to_string);
    }

    /// Make uploads of files with this name fail with a 500.
    pub fn fail_uploads_named(&self, name: &str) {
        self.state().failing_uploads.insert(name.to_string());
    }

    /// Make content fetches of `url` fail with a 502.
    pub fn fail_fetches_of(&self, url: &str) {
        self.state().failing_urls.insert(url.to_string());
    }

    /// Seed a folder.
    pub fn add_folder(&self, name: &str, parent: Option<&FolderId>) -> FolderId {
        let mut state = self.state();
        let id = FolderId::new(state.allocate_id());
        state.folders.push(StoredFolder {
            id: id.clone(),
            name: name.to_string(),
            parent: parent.cloned(),
            created_at: Utc::now(),
            archived: false,
        });
        id
    }

    /// Seed a file with content.
    pub fn add_file(
        &self,
        name: &str,
        mime_type: &str,
        folder: Option<&FolderId>,
        content: impl Into<Bytes>,
    ) -> FileId {
        let id = {
            let mut state = self.state();
            FileId::new(state.allocate_id())
        };
        self.insert_file(id.clone(), name, mime_type, folder, content.into());
        id
    }

    /// Seed a file under a caller-chosen id.
    pub fn add_file_with_id(
        &self,
        id: &str,
        name: &str,
        mime_type: &str,
        folder: Option<&FolderId>,
        content: impl Into<Bytes>,
    ) -> FileId {
        let id = FileId::new(id);
        self.insert_file(id.clone(), name, mime_type, folder, content.into());
        id
    }

    fn insert_file(
        &self,
        id: FileId,
        name: &str,
        mime_type: &str,
        folder: Option<&FolderId>,
        content: Bytes,
    ) {
        let url = format!("memory://files/{id}/{name}");
        let mut state = self.state();
        state.files.push(File {
            id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            url: url.clone(),
            size_bytes: content.len() as u64,
            created_at: Some(Utc::now()),
            folder_id: folder.cloned(),
            archived: false,
            share_link: None,
        });
        state.contents.insert(url, content);
    }

    /// Snapshot of a stored file, archived or not.
    pub fn file(&self, id: &FileId) -> Option<File> {
        self.state().files.iter().find(|f| &f.id == id).cloned()
    }

    /// Snapshot of every stored file.
    pub fn all_files(&self) -> Vec<File> {
        self.state().files.clone()
    }
}

#[async_trait]
impl ContentFetcher for MemoryFileApi {
    async fn fetch_bytes(&self, url: &str) -> AppResult<Bytes> {
        self.record_call();
        let result = {
            let state = self.state();
            if state.failing_urls.contains(url) {
                Err(AppError::http_status(502, "Upstream content unavailable"))
            } else {
                state
                    .contents
                    .get(url)
                    .cloned()
                    .ok_or_else(|| AppError::http_status(404, format!("No content at {url}")))
            }
        };
        self.pass_gate().await;
        result
    }
}

#[async_trait]
impl FileApi for MemoryFileApi {
    async fn list_files(&self, filter: ListFilter) -> AppResult<Vec<File>> {
        self.record_call();
        let files: Vec<File> = self
            .state()
            .files
            .iter()
            .filter(|f| match filter {
                ListFilter::All => !f.archived,
                ListFilter::Archived => f.archived,
                ListFilter::Category(c) => !f.archived && c.accepts(&f.mime_type, &f.name),
            })
            .cloned()
            .collect();
        self.pass_gate().await;
        Ok(files)
    }

    async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        self.record_call();
        let folders = self.state().nested(None);
        self.pass_gate().await;
        Ok(folders)
    }

    async fn list_folder_files(
        &self,
        folder_id: &FolderId,
        category: Option<FileCategory>,
    ) -> AppResult<Vec<File>> {
        self.record_call();
        let result = {
            let state = self.state();
            if state.folder_exists(folder_id) {
                Ok(state
                    .files
                    .iter()
                    .filter(|f| !f.archived && f.is_in(folder_id))
                    .filter(|f| category.is_none_or(|c| c.accepts(&f.mime_type, &f.name)))
                    .cloned()
                    .collect())
            } else {
                Err(AppError::http_status(404, "Folder not found"))
            }
        };
        self.pass_gate().await;
        result
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&FolderId>,
    ) -> AppResult<Option<Folder>> {
        self.record_call();
        if name.trim().is_empty() {
            return Err(AppError::http_status(400, "Folder name is required"));
        }
        if let Some(parent) = parent {
            if !self.state().folder_exists(parent) {
                return Err(AppError::http_status(404, "Parent folder not found"));
            }
        }
        let id = self.add_folder(name, parent);
        debug!(folder_id = %id, "Memory backend created folder");
        Ok(Some(Folder {
            id,
            name: name.to_string(),
            parent_folder_id: parent.cloned(),
            children: Vec::new(),
            created_at: Some(Utc::now()),
        }))
    }

    async fn rename_file(&self, id: &FileId, new_name: &str) -> AppResult<()> {
        self.record_call();
        self.state().file_mut(id)?.name = new_name.to_string();
        Ok(())
    }

    async fn rename_folder(&self, id: &FolderId, new_name: &str) -> AppResult<()> {
        self.record_call();
        self.state().folder_mut(id)?.name = new_name.to_string();
        Ok(())
    }

    async fn delete_file(&self, id: &FileId) -> AppResult<()> {
        self.record_call();
        let mut state = self.state();
        let before = state.files.len();
        state.files.retain(|f| &f.id != id);
        if state.files.len() == before {
            return Err(AppError::http_status(404, "File not found"));
        }
        Ok(())
    }

    async fn delete_folder(&self, id: &FolderId) -> AppResult<()> {
        self.record_call();
        let mut state = self.state();
        if !state.folder_exists(id) {
            return Err(AppError::http_status(404, "Folder not found"));
        }
        let doomed = state.subtree(id);
        state.folders.retain(|f| !doomed.contains(&f.id));
        state
            .files
            .retain(|f| f.folder_id.as_ref().is_none_or(|fid| !doomed.contains(fid)));
        Ok(())
    }

    async fn archive_file(&self, id: &FileId) -> AppResult<()> {
        self.record_call();
        self.state().file_mut(id)?.archived = true;
        Ok(())
    }

    async fn archive_folder(&self, id: &FolderId) -> AppResult<()> {
        self.record_call();
        let mut state = self.state();
        if !state.folder_exists(id) {
            return Err(AppError::http_status(404, "Folder not found"));
        }
        let archived = state.subtree(id);
        for folder in state.folders.iter_mut() {
            if archived.contains(&folder.id) {
                folder.archived = true;
            }
        }
        for file in state.files.iter_mut() {
            if file.folder_id.as_ref().is_some_and(|fid| archived.contains(fid)) {
                file.archived = true;
            }
        }
        Ok(())
    }

    async fn move_file(&self, id: &FileId, target: Option<&FolderId>) -> AppResult<()> {
        self.record_call();
        let mut state = self.state();
        if let Some(target) = target {
            if !state.folder_exists(target) {
                return Err(AppError::http_status(404, "Target folder not found"));
            }
        }
        state.file_mut(id)?.folder_id = target.cloned();
        Ok(())
    }

    async fn request_share(&self, target: &ShareTarget) -> AppResult<Value> {
        self.record_call();
        let mut state = self.state();
        let token = state.allocate_id();
        let url = format!("https://share.cloudbox.local/s/{}-{token}", target.kind());

        match target {
            ShareTarget::File(id) => state.file_mut(id)?.share_link = Some(url.clone()),
            ShareTarget::Folder(id) => {
                state.folder_mut(id)?;
            }
            ShareTarget::Multi { .. } => {}
        }

        Ok(match state.share_field {
            ShareField::ShareUrl => json!({ "shareUrl": url }),
            ShareField::ShareLink => json!({ "shareLink": url }),
            ShareField::Missing => json!({ "message": "Share created" }),
        })
    }

    async fn upload(&self, request: UploadRequest) -> AppResult<Value> {
        self.record_call();
        {
            let state = self.state();
            if state.failing_uploads.contains(&request.file_name) {
                return Err(AppError::http_status(500, "Upload failed"));
            }
            if let Some(folder) = &request.folder_id {
                if !state.folder_exists(folder) {
                    return Err(AppError::http_status(404, "Folder not found"));
                }
            }
        }

        let id = self.add_file(
            &request.file_name,
            &request.mime_type,
            request.folder_id.as_ref(),
            request.data,
        );
        let file = self.file(&id);
        let marker = self.state().upload_marker.clone();
        Ok(match marker {
            Some(message) => json!({ "message": message, "file": file }),
            None => json!({ "file": file }),
        })
    }
}
