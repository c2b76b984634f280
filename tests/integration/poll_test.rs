//! Integration tests for background polling.

use std::time::Duration;

use cloudbox_client::{FileApi, RequestGate};
use cloudbox_core::config::AppConfig;
use cloudbox_service::{FolderView, Intent, ItemRef};

use crate::helpers::{self, TestApp};

fn slow_poll_app() -> TestApp {
    let mut config = AppConfig::default();
    config.tree.poll_interval_seconds = 3600;
    TestApp::with_config(config)
}

#[tokio::test]
async fn test_poll_finishing_after_unmount_is_discarded() {
    let app = slow_poll_app();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Expand(drive.docs.clone())).await;

    app.api
        .add_file("late.png", "image/png", Some(&drive.docs), &b"\x89PNG"[..]);
    let gate = RequestGate::new();
    app.api.set_gate(Some(gate.clone()));

    let poller = app.ws.watch();
    // Root folders, root files and the expanded Docs folder.
    gate.wait_for(3).await;
    drop(poller);
    gate.open();
    // Let the abandoned poll run to completion.
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }

    let FolderView::Files(files) = app.ws.tree().folder_view(&drive.docs) else {
        panic!("expected cached files");
    };
    assert_eq!(files.len(), 2);
}

#[tokio::test]
async fn test_poll_picks_up_new_files_while_mounted() {
    let app = slow_poll_app();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Expand(drive.docs.clone())).await;

    app.api
        .add_file("late.png", "image/png", Some(&drive.docs), &b"\x89PNG"[..]);
    let poller = app.ws.watch();
    while app
        .ws
        .tree()
        .cached_files(&drive.docs)
        .is_none_or(|files| files.len() < 3)
    {
        tokio::task::yield_now().await;
    }
    poller.join().await;

    assert!(app.ws.tree().find_file(&drive.budget).is_some());
}

#[tokio::test]
async fn test_poll_drops_deleted_ids_from_selection() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Select(ItemRef::File(drive.loose.clone())))
        .await;
    app.dispatch(Intent::Select(ItemRef::File(drive.budget.clone())))
        .await;

    // Removed by another client; this session only learns of it by polling.
    app.api.delete_file(&drive.loose).await.unwrap();

    let poller = app.ws.watch_every(Duration::from_millis(10));
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.ws.selection().file_ids.contains(&drive.loose) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("poll never pruned the selection");
    poller.join().await;

    let selection = app.ws.selection();
    assert!(!selection.file_ids.contains(&drive.loose));
    assert!(selection.file_ids.contains(&drive.budget));
    assert!(app.ws.tree().find_file(&drive.loose).is_none());
}
