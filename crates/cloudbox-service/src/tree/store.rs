//! Folder tree and file listing cache with lazy folder expansion.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::{DashMap, DashSet};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cloudbox_client::FileApi;
use cloudbox_core::error::ErrorKind;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::file::{File, ListFilter};
use cloudbox_entity::folder::{Folder, FolderNode, FolderTree};

use super::cache::{FolderView, Listing, StaleScope};

#[derive(Debug, Default)]
struct RootCache {
    folders: Option<Listing<FolderTree>>,
    files: Option<Listing<Vec<File>>>,
}

/// Result of fetching one scope.
enum Fetched {
    RootFolders(Vec<Folder>),
    RootFiles(Vec<File>),
    Folder(FolderId, Vec<File>),
}

/// Client-side cache of the folder tree, the all-files listing and the
/// per-folder file listings.
///
/// Folder contents are fetched lazily on expansion. Mutations go to the
/// backend first; cached copies change only after acknowledgement, and the
/// affected folder, its parent and the root listings are then marked stale.
#[derive(Debug)]
pub struct TreeStore {
    api: Arc<dyn FileApi>,
    roots: Mutex<RootCache>,
    folder_files: DashMap<FolderId, Listing<Vec<File>>>,
    expanded: DashSet<FolderId>,
}

impl TreeStore {
    /// Creates an empty store.
    pub fn new(api: Arc<dyn FileApi>) -> Self {
        Self {
            api,
            roots: Mutex::new(RootCache::default()),
            folder_files: DashMap::new(),
            expanded: DashSet::new(),
        }
    }

    fn roots(&self) -> MutexGuard<'_, RootCache> {
        self.roots.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Fetch the root folders, with sub-folders nested.
    pub async fn load_root_folders(&self) -> AppResult<Vec<Folder>> {
        let folders = self.api.list_folders().await?;
        self.apply(Fetched::RootFolders(folders.clone()));
        Ok(folders)
    }

    /// Fetch every file of the user. See [`TreeStore::root_level_files`].
    pub async fn load_root_files(&self) -> AppResult<Vec<File>> {
        let files = self.api.list_files(ListFilter::All).await?;
        self.apply(Fetched::RootFiles(files.clone()));
        Ok(files)
    }

    /// Category or archive listing. Not cached.
    pub async fn list_files(&self, filter: ListFilter) -> AppResult<Vec<File>> {
        let files = self.api.list_files(filter).await?;
        debug!(?filter, count = files.len(), "Listed files");
        Ok(files)
    }

    /// Fetch a folder's own files and mark it expanded.
    ///
    /// Always refetches. When two expansions of the same folder overlap, the
    /// one that completes last wins.
    pub async fn expand_folder(&self, id: &FolderId) -> AppResult<Vec<File>> {
        self.expanded.insert(id.clone());
        match self.api.list_folder_files(id, None).await {
            Ok(files) => {
                self.apply(Fetched::Folder(id.clone(), files.clone()));
                Ok(files)
            }
            Err(e) => {
                if !self.folder_files.contains_key(id) {
                    self.expanded.remove(id);
                }
                Err(e)
            }
        }
    }

    /// Clear the expansion flag. Cached files stay.
    pub fn collapse_folder(&self, id: &FolderId) {
        self.expanded.remove(id);
    }

    fn apply(&self, fetched: Fetched) {
        match fetched {
            Fetched::RootFolders(folders) => {
                debug!(count = folders.len(), "Root folders cached");
                self.roots().folders = Some(Listing::fresh(FolderTree::new(folders)));
            }
            Fetched::RootFiles(files) => {
                debug!(count = files.len(), "Root files cached");
                self.roots().files = Some(Listing::fresh(files));
            }
            Fetched::Folder(id, files) => {
                debug!(folder_id = %id, count = files.len(), "Folder files cached");
                self.folder_files.insert(id, Listing::fresh(files));
            }
        }
    }

    // ── Reading ──────────────────────────────────────────────────

    /// Cached folder tree, if loaded.
    pub fn folder_tree(&self) -> Option<FolderTree> {
        self.roots().folders.as_ref().map(|l| l.items.clone())
    }

    /// Cached all-files listing, if loaded.
    pub fn root_files(&self) -> Option<Vec<File>> {
        self.roots().files.as_ref().map(|l| l.items.clone())
    }

    /// Files outside every folder, from the cached all-files listing.
    pub fn root_level_files(&self) -> Vec<File> {
        self.roots()
            .files
            .as_ref()
            .map(|l| {
                l.items
                    .iter()
                    .filter(|f| f.is_root_level())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cached files of a folder, fetched or not.
    pub fn cached_files(&self, id: &FolderId) -> Option<Vec<File>> {
        self.folder_files.get(id).map(|l| l.items.clone())
    }

    pub fn is_expanded(&self, id: &FolderId) -> bool {
        self.expanded.contains(id)
    }

    /// Currently expanded folders, sorted.
    pub fn expanded_folders(&self) -> Vec<FolderId> {
        let mut ids: Vec<FolderId> = self.expanded.iter().map(|id| id.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Render state of a folder row.
    pub fn folder_view(&self, id: &FolderId) -> FolderView {
        if !self.is_expanded(id) {
            return FolderView::Collapsed;
        }
        match self.folder_files.get(id) {
            None => FolderView::Loading,
            Some(listing) if listing.items.is_empty() => FolderView::Empty,
            Some(listing) => FolderView::Files(listing.items.clone()),
        }
    }

    /// Look a file up in every cached listing.
    pub fn find_file(&self, id: &FileId) -> Option<File> {
        let from_roots = self
            .roots()
            .files
            .as_ref()
            .and_then(|l| l.items.iter().find(|f| &f.id == id).cloned());
        from_roots.or_else(|| {
            self.folder_files
                .iter()
                .find_map(|entry| entry.items.iter().find(|f| &f.id == id).cloned())
        })
    }

    /// Path from a root folder down to `id`, one node per level.
    pub fn breadcrumbs(&self, id: &FolderId) -> Vec<FolderNode> {
        let roots = self.roots();
        let Some(tree) = roots.folders.as_ref() else {
            return Vec::new();
        };
        tree.items
            .breadcrumbs(id)
            .into_iter()
            .enumerate()
            .map(|(depth, folder)| FolderNode {
                id: folder.id.clone(),
                name: folder.name.clone(),
                depth,
                child_count: folder.children.len(),
            })
            .collect()
    }

    /// Ids of every known file and folder, once both root listings are loaded.
    pub fn known_ids(&self) -> Option<(HashSet<FileId>, HashSet<FolderId>)> {
        let roots = self.roots();
        let (Some(folders), Some(files)) = (roots.folders.as_ref(), roots.files.as_ref()) else {
            return None;
        };
        let mut file_ids: HashSet<FileId> = files.items.iter().map(|f| f.id.clone()).collect();
        let folder_ids: HashSet<FolderId> = folders.items.ids().into_iter().collect();
        drop(roots);

        for entry in self.folder_files.iter() {
            file_ids.extend(entry.items.iter().map(|f| f.id.clone()));
        }
        Some((file_ids, folder_ids))
    }

    // ── Staleness ────────────────────────────────────────────────

    /// Whether a cached scope was invalidated since it was fetched.
    ///
    /// Scopes never fetched are not stale.
    pub fn is_stale(&self, scope: &StaleScope) -> bool {
        match scope {
            StaleScope::RootFolders => self.roots().folders.as_ref().is_some_and(|l| l.stale),
            StaleScope::RootFiles => self.roots().files.as_ref().is_some_and(|l| l.stale),
            StaleScope::Folder(id) => self.folder_files.get(id).is_some_and(|l| l.stale),
        }
    }

    /// Mark `folder`, its parent and the root listings stale.
    ///
    /// `None` stands for the root level, which only touches the root listings.
    pub fn invalidate(&self, folder: Option<&FolderId>) {
        if let Some(id) = folder {
            let parent = self.parent_id(id);
            for target in std::iter::once(id).chain(parent.as_ref()) {
                if let Some(mut listing) = self.folder_files.get_mut(target) {
                    listing.stale = true;
                }
            }
        }
        let mut roots = self.roots();
        if let Some(listing) = roots.folders.as_mut() {
            listing.stale = true;
        }
        if let Some(listing) = roots.files.as_mut() {
            listing.stale = true;
        }
        debug!(folder_id = ?folder, "Cache invalidated");
    }

    /// Refetch stale root listings and every stale folder that is expanded.
    ///
    /// Returns how many scopes were refreshed.
    pub async fn refresh_stale(&self) -> AppResult<usize> {
        let scopes: Vec<StaleScope> = self
            .all_scopes()
            .into_iter()
            .filter(|scope| self.is_stale(scope))
            .collect();
        if scopes.is_empty() {
            return Ok(0);
        }
        self.refresh_scopes(&scopes, &CancellationToken::new()).await
    }

    /// Refetch the root listings and every expanded folder.
    ///
    /// Results that arrive after `live` is cancelled are discarded.
    pub(crate) async fn refresh_all(&self, live: &CancellationToken) -> AppResult<usize> {
        self.refresh_scopes(&self.all_scopes(), live).await
    }

    fn all_scopes(&self) -> Vec<StaleScope> {
        let mut scopes = vec![StaleScope::RootFolders, StaleScope::RootFiles];
        scopes.extend(self.expanded_folders().into_iter().map(StaleScope::Folder));
        scopes
    }

    async fn fetch(&self, scope: &StaleScope) -> AppResult<Fetched> {
        Ok(match scope {
            StaleScope::RootFolders => Fetched::RootFolders(self.api.list_folders().await?),
            StaleScope::RootFiles => Fetched::RootFiles(self.api.list_files(ListFilter::All).await?),
            StaleScope::Folder(id) => {
                Fetched::Folder(id.clone(), self.api.list_folder_files(id, None).await?)
            }
        })
    }

    async fn refresh_scopes(
        &self,
        scopes: &[StaleScope],
        live: &CancellationToken,
    ) -> AppResult<usize> {
        let results = join_all(scopes.iter().map(|scope| self.fetch(scope))).await;
        if live.is_cancelled() {
            warn!(scopes = scopes.len(), "Discarding refresh for an unmounted view");
            return Ok(0);
        }

        let mut applied = 0;
        let mut first_error = None;
        for (scope, result) in scopes.iter().zip(results) {
            match result {
                Ok(fetched) => {
                    self.apply(fetched);
                    applied += 1;
                }
                Err(e) if e.kind == ErrorKind::NotFound => {
                    if let StaleScope::Folder(id) = scope {
                        debug!(folder_id = %id, "Expanded folder no longer exists");
                        self.forget_folder(id);
                    }
                }
                Err(e) => {
                    warn!(?scope, error = %e, "Refresh failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(applied),
        }
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Create a folder under `parent`, or at the root.
    pub async fn create_folder(
        &self,
        name: &str,
        parent: Option<&FolderId>,
    ) -> AppResult<Option<Folder>> {
        let created = self.api.create_folder(name, parent).await?;
        if let Some(folder) = &created {
            let mut roots = self.roots();
            if let Some(tree) = roots.folders.as_mut() {
                match parent {
                    Some(parent_id) => {
                        if let Some(parent) =
                            tree.items.roots.iter_mut().find_map(|r| r.find_mut(parent_id))
                        {
                            parent.children.push(folder.clone());
                        }
                    }
                    None => tree.items.roots.push(folder.clone()),
                }
            }
        }
        self.invalidate(parent);
        info!(name, parent = ?parent, "Folder created");
        Ok(created)
    }

    pub async fn rename_file(&self, id: &FileId, new_name: &str) -> AppResult<()> {
        self.api.rename_file(id, new_name).await?;
        let folder = self.update_file(id, |file| file.name = new_name.to_string());
        self.invalidate(folder.flatten().as_ref());
        info!(file_id = %id, new_name, "File renamed");
        Ok(())
    }

    pub async fn rename_folder(&self, id: &FolderId, new_name: &str) -> AppResult<()> {
        self.api.rename_folder(id, new_name).await?;
        if let Some(tree) = self.roots().folders.as_mut() {
            if let Some(folder) = tree.items.roots.iter_mut().find_map(|r| r.find_mut(id)) {
                folder.name = new_name.to_string();
            }
        }
        self.invalidate(Some(id));
        info!(folder_id = %id, new_name, "Folder renamed");
        Ok(())
    }

    pub async fn delete_file(&self, id: &FileId) -> AppResult<()> {
        self.api.delete_file(id).await?;
        let folder = self.remove_file(id);
        self.invalidate(folder.flatten().as_ref());
        info!(file_id = %id, "File deleted");
        Ok(())
    }

    /// Delete a folder and everything below it.
    pub async fn delete_folder(&self, id: &FolderId) -> AppResult<()> {
        self.api.delete_folder(id).await?;
        self.invalidate(Some(id));
        self.forget_folder(id);
        info!(folder_id = %id, "Folder deleted");
        Ok(())
    }

    /// Archive a file; it leaves the normal listings.
    pub async fn archive_file(&self, id: &FileId) -> AppResult<()> {
        self.api.archive_file(id).await?;
        let folder = self.remove_file(id);
        self.invalidate(folder.flatten().as_ref());
        info!(file_id = %id, "File archived");
        Ok(())
    }

    /// Archive a folder and everything below it.
    pub async fn archive_folder(&self, id: &FolderId) -> AppResult<()> {
        self.api.archive_folder(id).await?;
        self.invalidate(Some(id));
        self.forget_folder(id);
        info!(folder_id = %id, "Folder archived");
        Ok(())
    }

    /// Move a file into `target`, or to the root with `None`.
    pub async fn move_file(&self, id: &FileId, target: Option<&FolderId>) -> AppResult<()> {
        self.api.move_file(id, target).await?;

        let moved = self.find_file(id);
        let source = moved.as_ref().and_then(|f| f.folder_id.clone());
        for mut listing in self.folder_files.iter_mut() {
            listing.items.retain(|f| &f.id != id);
        }
        self.update_file(id, |file| file.folder_id = target.cloned());
        if let (Some(mut file), Some(target_id)) = (moved, target) {
            if let Some(mut listing) = self.folder_files.get_mut(target_id) {
                file.folder_id = Some(target_id.clone());
                listing.items.push(file);
            }
        }

        self.invalidate(source.as_ref());
        self.invalidate(target);
        info!(file_id = %id, target = ?target, "File moved");
        Ok(())
    }

    /// Remember a share link the backend issued for a file.
    pub fn record_share_link(&self, id: &FileId, url: &str) {
        self.update_file(id, |file| file.share_link = Some(url.to_string()));
    }

    // ── Cache surgery ────────────────────────────────────────────

    /// Apply `change` to every cached copy of a file.
    ///
    /// Returns the file's folder before the change: `None` when the file is
    /// not cached, `Some(None)` for a root-level file.
    fn update_file(&self, id: &FileId, change: impl Fn(&mut File)) -> Option<Option<FolderId>> {
        let mut folder = None;
        if let Some(listing) = self.roots().files.as_mut() {
            for file in listing.items.iter_mut().filter(|f| &f.id == id) {
                folder.get_or_insert(file.folder_id.clone());
                change(file);
            }
        }
        for mut listing in self.folder_files.iter_mut() {
            let owner = listing.key().clone();
            for file in listing.items.iter_mut().filter(|f| &f.id == id) {
                folder.get_or_insert(Some(owner.clone()));
                change(file);
            }
        }
        folder
    }

    /// Drop every cached copy of a file. Returns its folder as
    /// [`TreeStore::update_file`] does.
    fn remove_file(&self, id: &FileId) -> Option<Option<FolderId>> {
        let folder = self.update_file(id, |_| {});
        if let Some(listing) = self.roots().files.as_mut() {
            listing.items.retain(|f| &f.id != id);
        }
        for mut listing in self.folder_files.iter_mut() {
            listing.items.retain(|f| &f.id != id);
        }
        folder
    }

    /// Drop a folder subtree from the tree, the folder caches, the expansion
    /// flags and the all-files listing.
    fn forget_folder(&self, id: &FolderId) {
        let mut doomed: HashSet<FolderId> = HashSet::from([id.clone()]);
        {
            let mut roots = self.roots();
            if let Some(tree) = roots.folders.as_mut() {
                if let Some(folder) = tree.items.find(id) {
                    doomed.extend(FolderTree::new(vec![folder.clone()]).ids());
                }
                remove_subtree(&mut tree.items.roots, id);
            }
            if let Some(files) = roots.files.as_mut() {
                files
                    .items
                    .retain(|f| f.folder_id.as_ref().is_none_or(|fid| !doomed.contains(fid)));
            }
        }
        for folder_id in &doomed {
            self.folder_files.remove(folder_id);
            self.expanded.remove(folder_id);
        }
    }

    fn parent_id(&self, id: &FolderId) -> Option<FolderId> {
        let roots = self.roots();
        let tree = roots.folders.as_ref()?;
        tree.items
            .parent_of(id)
            .map(|p| p.id.clone())
            .or_else(|| tree.items.find(id).and_then(|f| f.parent_folder_id.clone()))
    }
}

fn remove_subtree(folders: &mut Vec<Folder>, id: &FolderId) -> bool {
    if let Some(pos) = folders.iter().position(|f| &f.id == id) {
        folders.remove(pos);
        return true;
    }
    folders
        .iter_mut()
        .any(|folder| remove_subtree(&mut folder.children, id))
}
