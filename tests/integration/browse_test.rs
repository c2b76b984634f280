//! Integration tests for tree loading, lazy expansion and mutations.

use cloudbox_service::{FolderView, Intent, ItemRef, Outcome};

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_load_then_expand_lazily() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);

    let outcome = app.dispatch(Intent::Load).await;
    assert!(matches!(outcome, Outcome::Loaded { folders: 1, files: 3 }));

    let tree = app.ws.tree();
    let folders = tree.folder_tree().unwrap();
    assert_eq!(folders.roots[0].name, "Docs");
    assert_eq!(folders.roots[0].children[0].id, drive.reports);

    let root_level = tree.root_level_files();
    assert_eq!(root_level.len(), 1);
    assert_eq!(root_level[0].id, drive.loose);

    // Nothing inside Docs is known as folder contents until it is expanded.
    assert_eq!(tree.folder_view(&drive.docs), FolderView::Collapsed);
    assert!(tree.cached_files(&drive.docs).is_none());

    let Outcome::Files { files } = app.dispatch(Intent::Expand(drive.docs.clone())).await else {
        panic!("expected files");
    };
    let mut names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["budget.pdf", "summary.png"]);

    app.dispatch(Intent::Expand(drive.reports.clone())).await;
    assert_eq!(tree.folder_view(&drive.reports), FolderView::Empty);

    let crumbs = tree.breadcrumbs(&drive.reports);
    let path: Vec<&str> = crumbs.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(path, ["Docs", "Reports"]);
}

#[tokio::test]
async fn test_collapse_then_expand_refetches() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Expand(drive.docs.clone())).await;
    app.dispatch(Intent::Collapse(drive.docs.clone())).await;

    app.api
        .add_file("late.png", "image/png", Some(&drive.docs), &b"\x89PNG"[..]);
    let before = app.api.request_count();
    let Outcome::Files { files } = app.dispatch(Intent::Expand(drive.docs.clone())).await else {
        panic!("expected files");
    };

    assert_eq!(app.api.request_count(), before + 1);
    assert_eq!(files.len(), 3);
}

#[tokio::test]
async fn test_rename_keeps_selection() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    let file = app
        .api
        .add_file_with_id("42", "old.pdf", "application/pdf", Some(&drive.docs), &b"%PDF"[..]);

    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Expand(drive.docs.clone())).await;
    app.dispatch(Intent::Select(ItemRef::File(file.clone()))).await;

    let outcome = app
        .dispatch(Intent::Rename {
            item: ItemRef::File(file.clone()),
            new_name: "new.pdf".to_string(),
        })
        .await;
    assert!(matches!(outcome, Outcome::Done));
    assert_eq!(app.last_message().as_deref(), Some("Renamed to 'new.pdf'"));

    app.dispatch(Intent::Refresh).await;
    assert!(app.ws.selection().file_ids.contains(&file));
    assert_eq!(app.ws.tree().find_file(&file).unwrap().name, "new.pdf");
    assert_eq!(app.api.file(&file).unwrap().name, "new.pdf");
}

#[tokio::test]
async fn test_deleted_folder_leaves_selection_after_refresh() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Select(ItemRef::Folder(drive.reports.clone())))
        .await;
    app.dispatch(Intent::Select(ItemRef::Folder(drive.docs.clone())))
        .await;

    app.dispatch(Intent::Delete(ItemRef::Folder(drive.reports.clone())))
        .await;
    app.dispatch(Intent::Refresh).await;

    let selection = app.ws.selection();
    assert!(!selection.folder_ids.contains(&drive.reports));
    assert!(selection.folder_ids.contains(&drive.docs));
    assert!(app.ws.tree().folder_tree().unwrap().find(&drive.reports).is_none());
}

#[tokio::test]
async fn test_move_file_to_root() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Expand(drive.docs.clone())).await;

    app.dispatch(Intent::Move {
        file_id: drive.budget.clone(),
        target: None,
    })
    .await;
    app.dispatch(Intent::Refresh).await;

    let tree = app.ws.tree();
    assert!(tree.root_level_files().iter().any(|f| f.id == drive.budget));
    assert!(
        !tree
            .cached_files(&drive.docs)
            .unwrap()
            .iter()
            .any(|f| f.id == drive.budget)
    );
}

#[tokio::test]
async fn test_create_folder_under_parent() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;

    let outcome = app
        .dispatch(Intent::CreateFolder {
            name: "Drafts".to_string(),
            parent: Some(drive.docs.clone()),
        })
        .await;
    let Outcome::FolderCreated {
        folder: Some(folder),
    } = outcome
    else {
        panic!("expected a created folder, got {outcome:?}");
    };

    let tree = app.ws.tree().folder_tree().unwrap();
    assert_eq!(tree.parent_of(&folder.id).map(|f| f.id.clone()), Some(drive.docs));
    assert_eq!(app.last_message().as_deref(), Some("Folder 'Drafts' created"));
}
