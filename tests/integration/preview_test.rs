//! Integration tests for the preview pane and downloads.

use std::sync::Arc;

use cloudbox_client::RequestGate;
use cloudbox_service::{Intent, NotificationLevel, Outcome, PreviewState};

use crate::helpers::{self, TestApp};

async fn open(app: &TestApp, id: &cloudbox_core::types::FileId) -> PreviewState {
    match app.dispatch(Intent::Open(id.clone())).await {
        Outcome::Preview { state, .. } => state,
        other => panic!("expected a preview, got {other:?}"),
    }
}

#[tokio::test]
async fn test_close_pdf_then_open_image_frees_blob() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    let blobs = Arc::clone(app.ws.preview().blobs());

    let pdf = open(&app, &drive.budget).await;
    assert!(matches!(pdf, PreviewState::Pdf { .. }));
    assert_eq!(blobs.live_count(), 1);

    app.dispatch(Intent::ClosePreview).await;
    let image = open(&app, &drive.summary).await;

    assert!(matches!(image, PreviewState::Image { .. }));
    assert_eq!(blobs.live_count(), 0);
    assert!(app.ws.preview().live_blob().is_none());
}

#[tokio::test]
async fn test_pdf_finishing_after_image_opened_is_dropped() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    let gate = RequestGate::new();
    app.api.set_gate(Some(gate.clone()));

    let pending = tokio::spawn({
        let ws = app.ws.clone();
        let id = drive.budget.clone();
        async move { ws.dispatch(Intent::Open(id)).await }
    });
    gate.wait_for(1).await;
    assert!(matches!(app.ws.preview().state(), PreviewState::LoadingPdf { .. }));

    let image = open(&app, &drive.summary).await;
    gate.open();
    pending.await.unwrap();

    assert_eq!(app.ws.preview().state(), image);
    assert_eq!(app.ws.preview().blobs().live_count(), 0);
}

#[tokio::test]
async fn test_failed_pdf_offers_download() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    let url = app.api.file(&drive.budget).unwrap().url;
    app.api.fail_fetches_of(&url);

    let state = open(&app, &drive.budget).await;

    let PreviewState::Unavailable { download_url, .. } = state else {
        panic!("expected unavailable, got {state:?}");
    };
    assert_eq!(download_url, url);
    assert_eq!(app.notifier.last().unwrap().level, NotificationLevel::Warning);
    assert_eq!(app.ws.preview().blobs().live_count(), 0);
}

#[tokio::test]
async fn test_office_document_shows_icon() {
    let app = TestApp::new();
    let sheet = app.api.add_file(
        "budget.xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        None,
        &b"PK"[..],
    );
    app.dispatch(Intent::Load).await;

    let state = open(&app, &sheet).await;
    assert!(matches!(state, PreviewState::Document { ref icon, .. } if icon == "file-excel"));
}

#[tokio::test]
async fn test_zip_opens_as_download() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;

    let Outcome::Preview { state, download } = app.dispatch(Intent::Open(drive.loose)).await else {
        panic!("expected a preview");
    };
    assert!(matches!(state, PreviewState::DownloadOnly { .. }));
    let download = download.unwrap();
    assert_eq!(download.file_name, "notes.zip");
    assert_eq!(&download.data[..], b"PK");
}

#[tokio::test]
async fn test_second_download_click_is_ignored() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Load).await;
    let file = app.ws.tree().find_file(&drive.budget).unwrap();
    let gate = RequestGate::new();
    app.api.set_gate(Some(gate.clone()));
    let before = app.api.request_count();

    let first = tokio::spawn({
        let ws = app.ws.clone();
        let file = file.clone();
        async move { ws.preview().download(&file).await }
    });
    gate.wait_for(1).await;
    let second = app.ws.preview().download(&file).await.unwrap();
    gate.open();

    assert!(second.is_none());
    assert!(first.await.unwrap().unwrap().is_some());
    assert_eq!(app.api.request_count(), before + 1);
}
