//! Multi-select state for batch operations.

use std::collections::HashSet;

use tracing::debug;

use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::selection::Selection;

/// Selection mode flag plus the selected id sets.
///
/// Pure in-memory state: nothing here talks to the backend or touches the
/// tree cache.
#[derive(Debug, Default, Clone)]
pub struct SelectionModel {
    active: bool,
    selection: Selection,
}

impl SelectionModel {
    /// Create an inactive, empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether selection mode is on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Turn selection mode on. Existing ids are kept.
    pub fn enter_selection_mode(&mut self) {
        self.active = true;
    }

    /// Turn selection mode off and forget every selected id.
    pub fn exit_selection_mode(&mut self) {
        self.active = false;
        self.selection = Selection::default();
    }

    /// Add the file if absent, remove it if present.
    ///
    /// Returns whether the file is selected afterwards. Toggling outside
    /// selection mode enters it.
    pub fn toggle_file(&mut self, id: &FileId) -> bool {
        self.active = true;
        if self.selection.file_ids.remove(id) {
            false
        } else {
            self.selection.file_ids.insert(id.clone());
            true
        }
    }

    /// Folder counterpart of [`SelectionModel::toggle_file`].
    pub fn toggle_folder(&mut self, id: &FolderId) -> bool {
        self.active = true;
        if self.selection.folder_ids.remove(id) {
            false
        } else {
            self.selection.folder_ids.insert(id.clone());
            true
        }
    }

    /// Toggle an item given as a raw id plus an `is_folder` flag.
    pub fn toggle(&mut self, id: &str, is_folder: bool) -> bool {
        if is_folder {
            self.toggle_folder(&FolderId::from(id))
        } else {
            self.toggle_file(&FileId::from(id))
        }
    }

    /// Empty both sets without leaving selection mode.
    pub fn clear(&mut self) {
        self.selection = Selection::default();
    }

    pub fn contains_file(&self, id: &FileId) -> bool {
        self.selection.file_ids.contains(id)
    }

    pub fn contains_folder(&self, id: &FolderId) -> bool {
        self.selection.folder_ids.contains(id)
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Copy of the current selection.
    pub fn snapshot(&self) -> Selection {
        self.selection.clone()
    }

    /// Drop ids that no longer exist after a refresh.
    ///
    /// Returns how many ids were dropped.
    pub fn retain_existing(
        &mut self,
        files: &HashSet<FileId>,
        folders: &HashSet<FolderId>,
    ) -> usize {
        let before = self.selection.len();
        self.selection.file_ids.retain(|id| files.contains(id));
        self.selection.folder_ids.retain(|id| folders.contains(id));
        let dropped = before - self.selection.len();
        if dropped > 0 {
            debug!(dropped, "Dropped stale ids from selection");
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_toggle_restores_selection() {
        let mut model = SelectionModel::new();
        model.toggle("1", false);
        let before = model.snapshot();

        assert!(model.toggle("42", false));
        assert!(!model.toggle("42", false));
        assert_eq!(model.snapshot(), before);
    }

    #[test]
    fn test_files_and_folders_are_separate() {
        let mut model = SelectionModel::new();
        model.toggle("7", true);
        assert!(model.contains_folder(&"7".into()));
        assert!(!model.contains_file(&"7".into()));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_toggle_enters_mode_and_exit_clears() {
        let mut model = SelectionModel::new();
        assert!(!model.is_active());
        model.toggle("1", false);
        model.toggle("2", true);
        assert!(model.is_active());

        model.exit_selection_mode();
        assert!(!model.is_active());
        assert!(model.is_empty());
    }

    #[test]
    fn test_clear_keeps_mode() {
        let mut model = SelectionModel::new();
        model.enter_selection_mode();
        model.toggle("1", false);
        model.clear();
        assert!(model.is_active());
        assert!(model.is_empty());
    }

    #[test]
    fn test_retain_existing_drops_stale_ids() {
        let mut model = SelectionModel::new();
        model.toggle("1", false);
        model.toggle("2", false);
        model.toggle("9", true);

        let files = HashSet::from([FileId::from("1")]);
        let folders = HashSet::new();
        assert_eq!(model.retain_existing(&files, &folders), 2);
        assert!(model.contains_file(&"1".into()));
        assert_eq!(model.len(), 1);
    }
}
