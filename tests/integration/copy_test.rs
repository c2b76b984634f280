//! Integration tests for uploads and batch copies.

use bytes::Bytes;

use cloudbox_core::config::AppConfig;
use cloudbox_entity::file::FileCategory;
use cloudbox_service::{
    BatchOutcome, Intent, ItemRef, ItemStatus, LocalFile, NotificationLevel, Outcome, UploadParams,
};

use crate::helpers::{self, TestApp};

fn png(name: &str) -> LocalFile {
    LocalFile::new(name, "image/png", Bytes::from_static(b"\x89PNG"))
}

#[tokio::test]
async fn test_upload_wrong_category_sends_nothing() {
    let app = TestApp::new();

    let outcome = app
        .dispatch(Intent::Upload(UploadParams {
            category: FileCategory::Document,
            file: Some(png("photo.png")),
            folder_id: None,
        }))
        .await;

    assert!(matches!(outcome, Outcome::Failed { ref error, .. } if error.is_validation()));
    assert_eq!(app.api.request_count(), 0);
}

#[tokio::test]
async fn test_upload_into_expanded_folder_refreshes_it() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Expand(drive.docs.clone())).await;

    let outcome = app
        .dispatch(Intent::Upload(UploadParams {
            category: FileCategory::Image,
            file: Some(png("new.png")),
            folder_id: Some(drive.docs.clone()),
        }))
        .await;
    assert!(matches!(outcome, Outcome::Uploaded { .. }));
    assert_eq!(app.last_message().as_deref(), Some("File uploaded successfully"));

    app.dispatch(Intent::Refresh).await;
    let files = app.ws.tree().cached_files(&drive.docs).unwrap();
    assert!(files.iter().any(|f| f.name == "new.png"));
}

#[tokio::test]
async fn test_upload_without_marker_fails() {
    let app = TestApp::new();
    app.api.set_upload_marker(None);

    let outcome = app
        .dispatch(Intent::Upload(UploadParams {
            category: FileCategory::Image,
            file: Some(png("new.png")),
            folder_id: None,
        }))
        .await;

    assert!(matches!(outcome, Outcome::Failed { ref error, .. } if !error.is_validation()));
    assert_eq!(app.notifier.last().unwrap().level, NotificationLevel::Error);
}

#[tokio::test]
async fn test_upload_size_limit_from_config() {
    let mut config = AppConfig::default();
    config.upload.max_upload_size_bytes = 3;
    let app = TestApp::with_config(config);

    let outcome = app
        .dispatch(Intent::Upload(UploadParams {
            category: FileCategory::Image,
            file: Some(png("big.png")),
            folder_id: None,
        }))
        .await;

    assert!(matches!(outcome, Outcome::Failed { ref error, .. } if error.is_validation()));
    assert_eq!(app.api.request_count(), 0);
}

#[tokio::test]
async fn test_partial_batch_copy_keeps_selection() {
    let app = TestApp::new();
    let target = app.api.add_folder("Target", None);
    let ids = ["1.png", "2.png", "3.png"]
        .map(|name| app.api.add_file(name, "image/png", None, &b"\x89PNG"[..]));
    app.api.fail_uploads_named("2.png");
    app.dispatch(Intent::Load).await;
    for id in &ids {
        app.dispatch(Intent::Select(ItemRef::File(id.clone()))).await;
    }

    let Outcome::Copied { report } = app
        .dispatch(Intent::CopySelection {
            target: Some(target.clone()),
        })
        .await
    else {
        panic!("expected a batch report");
    };

    assert_eq!(report.outcome(), BatchOutcome::Partial);
    assert_eq!(report.succeeded(), 2);
    let last = app.notifier.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Warning);
    assert_eq!(last.message, "2 of 3 files copied, 1 failed");
    assert_eq!(app.ws.selection().len(), 3);
}

#[tokio::test]
async fn test_full_batch_copy_clears_selection() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    let target = app.api.add_folder("Target", None);
    app.dispatch(Intent::Load).await;
    app.dispatch(Intent::Select(ItemRef::File(drive.budget.clone())))
        .await;
    app.dispatch(Intent::Select(ItemRef::File(drive.loose.clone())))
        .await;

    let outcome = app
        .dispatch(Intent::CopySelection {
            target: Some(target.clone()),
        })
        .await;

    assert!(matches!(outcome, Outcome::Copied { ref report } if report.outcome() == BatchOutcome::AllSucceeded));
    assert_eq!(app.last_message().as_deref(), Some("All 2 files copied successfully"));
    assert!(app.ws.selection().is_empty());

    let Outcome::Files { files } = app.dispatch(Intent::Expand(target)).await else {
        panic!("expected files");
    };
    assert_eq!(files.len(), 2);
}

#[tokio::test]
async fn test_copy_with_nothing_selected_fails() {
    let app = TestApp::new();
    let outcome = app.dispatch(Intent::CopySelection { target: None }).await;
    assert!(matches!(outcome, Outcome::Failed { ref error, .. } if error.is_validation()));
    assert_eq!(app.api.request_count(), 0);
}

#[tokio::test]
async fn test_upload_from_disk_guesses_type() {
    let app = TestApp::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pdf");
    std::fs::write(&path, b"%PDF-1.7").unwrap();

    let file = LocalFile::from_path(&path).await.unwrap();
    assert_eq!(file.mime_type, "application/pdf");

    let outcome = app
        .dispatch(Intent::Upload(UploadParams {
            category: FileCategory::Document,
            file: Some(file),
            folder_id: None,
        }))
        .await;
    assert!(matches!(outcome, Outcome::Uploaded { .. }));
    assert!(app.api.all_files().iter().any(|f| f.name == "scan.pdf"));
}

#[tokio::test]
async fn test_tarball_passes_zip_gate() {
    let app = TestApp::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.tgz");
    std::fs::write(&path, b"\x1f\x8b\x08\x00").unwrap();

    let file = LocalFile::from_path(&path).await.unwrap();
    let outcome = app
        .dispatch(Intent::Upload(UploadParams {
            category: FileCategory::Zip,
            file: Some(file),
            folder_id: None,
        }))
        .await;

    assert!(matches!(outcome, Outcome::Uploaded { .. }), "{outcome:?}");
    assert!(app.api.all_files().iter().any(|f| f.name == "site.tgz"));
}

#[tokio::test]
async fn test_unloaded_selection_counts_as_failed() {
    let app = TestApp::new();
    let target = app.api.add_folder("Target", None);
    let loaded = ["1.png", "2.png"]
        .map(|name| app.api.add_file(name, "image/png", None, &b"\x89PNG"[..]));
    app.dispatch(Intent::Load).await;
    for id in &loaded {
        app.dispatch(Intent::Select(ItemRef::File(id.clone()))).await;
    }
    // Selected by id but never part of any cached listing.
    app.dispatch(Intent::Select(ItemRef::File("999".into())))
        .await;

    let Outcome::Copied { report } = app
        .dispatch(Intent::CopySelection {
            target: Some(target),
        })
        .await
    else {
        panic!("expected a batch report");
    };

    assert_eq!(report.items.len(), 3);
    assert_eq!(report.outcome(), BatchOutcome::Partial);
    assert_eq!(report.message(), "2 of 3 files copied, 1 failed");
    assert!(report.items.iter().any(|item| {
        item.file_id.as_str() == "999"
            && item.status == ItemStatus::Error("File is not loaded".to_string())
    }));
    assert_eq!(app.ws.selection().len(), 3);
}
