//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use cloudbox_core::types::FolderId;

use super::model::Folder;

/// A flattened row of a folder tree, ready for indented display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Depth level (0 for root folders).
    pub depth: usize,
    /// Number of direct child folders.
    pub child_count: usize,
}

/// The user's folder forest as returned by the backend in one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderTree {
    /// The root folders, each with its nested children.
    pub roots: Vec<Folder>,
}

impl FolderTree {
    /// Create an empty folder tree.
    pub fn empty() -> Self {
        Self { roots: Vec::new() }
    }

    /// Wrap the root folders returned by the backend.
    pub fn new(roots: Vec<Folder>) -> Self {
        Self { roots }
    }

    /// Total number of folders in the tree.
    pub fn total_folders(&self) -> usize {
        self.roots.iter().map(|r| 1 + r.descendant_count()).sum()
    }

    /// Find a folder anywhere in the tree.
    pub fn find(&self, id: &FolderId) -> Option<&Folder> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// Whether the tree contains `id`.
    pub fn contains(&self, id: &FolderId) -> bool {
        self.find(id).is_some()
    }

    /// The parent of `id`, resolved structurally.
    ///
    /// Returns `None` both for root folders and for unknown ids.
    pub fn parent_of(&self, id: &FolderId) -> Option<&Folder> {
        fn search<'a>(folder: &'a Folder, id: &FolderId) -> Option<&'a Folder> {
            if folder.children.iter().any(|c| &c.id == id) {
                return Some(folder);
            }
            folder.children.iter().find_map(|c| search(c, id))
        }
        self.roots.iter().find_map(|root| search(root, id))
    }

    /// The trail of folders from a root down to `id`, inclusive.
    ///
    /// Empty when `id` is not in the tree.
    pub fn breadcrumbs(&self, id: &FolderId) -> Vec<&Folder> {
        fn walk<'a>(folder: &'a Folder, id: &FolderId, trail: &mut Vec<&'a Folder>) -> bool {
            trail.push(folder);
            if &folder.id == id || folder.children.iter().any(|c| walk(c, id, trail)) {
                return true;
            }
            trail.pop();
            false
        }

        let mut trail = Vec::new();
        for root in &self.roots {
            if walk(root, id, &mut trail) {
                break;
            }
        }
        trail
    }

    /// Every folder id in the tree.
    pub fn ids(&self) -> Vec<FolderId> {
        self.flatten().into_iter().map(|node| node.id).collect()
    }

    /// Depth-first, pre-order flattening of the tree.
    pub fn flatten(&self) -> Vec<FolderNode> {
        fn visit(folder: &Folder, depth: usize, out: &mut Vec<FolderNode>) {
            out.push(FolderNode {
                id: folder.id.clone(),
                name: folder.name.clone(),
                depth,
                child_count: folder.children.len(),
            });
            for child in &folder.children {
                visit(child, depth + 1, out);
            }
        }

        let mut out = Vec::with_capacity(self.total_folders());
        for root in &self.roots {
            visit(root, 0, &mut out);
        }
        out
    }
}
