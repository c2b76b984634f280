//! Integration tests for share links.

use cloudbox_client::ShareField;
use cloudbox_core::error::ErrorKind;
use cloudbox_entity::share::ShareKind;
use cloudbox_service::{Intent, ItemRef, NotificationLevel, Outcome};

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_empty_batch_share_makes_no_request() {
    let app = TestApp::new();
    app.dispatch(Intent::EnterSelectionMode).await;

    let outcome = app.dispatch(Intent::ShareSelection).await;

    let Outcome::Failed { error, message } = outcome else {
        panic!("expected failure");
    };
    assert!(error.is_validation());
    assert_eq!(message, "Select at least one item to share");
    assert_eq!(app.api.request_count(), 0);
    assert_eq!(app.notifier.last().unwrap().level, NotificationLevel::Error);
}

#[tokio::test]
async fn test_share_link_field_is_accepted() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.api.set_share_field(ShareField::ShareLink);
    app.dispatch(Intent::Load).await;

    let Outcome::Shared { link } = app
        .dispatch(Intent::Share(ItemRef::File(drive.budget.clone())))
        .await
    else {
        panic!("expected a share link");
    };

    assert_eq!(link.target_kind, ShareKind::File);
    assert!(link.url.starts_with("https://"));
    let cached = app.ws.tree().find_file(&drive.budget).unwrap();
    assert_eq!(cached.share_link.as_deref(), Some(link.url.as_str()));
}

#[tokio::test]
async fn test_mixed_selection_shares_under_one_link() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.dispatch(Intent::Select(ItemRef::Folder(drive.reports.clone())))
        .await;
    app.dispatch(Intent::Select(ItemRef::File(drive.loose.clone())))
        .await;

    let Outcome::Shared { link } = app.dispatch(Intent::ShareSelection).await else {
        panic!("expected a share link");
    };

    assert_eq!(link.target_kind, ShareKind::Multi);
    assert_eq!(
        link.target_ids,
        vec![drive.reports.to_string(), drive.loose.to_string()]
    );
    assert_eq!(app.api.request_count(), 1);
    assert!(app.ws.selection().is_empty());
}

#[tokio::test]
async fn test_missing_link_keeps_selection() {
    let app = TestApp::new();
    let drive = helpers::seed_docs(&app.api);
    app.api.set_share_field(ShareField::Missing);
    app.dispatch(Intent::Select(ItemRef::File(drive.summary.clone())))
        .await;

    let outcome = app.dispatch(Intent::ShareSelection).await;

    assert!(matches!(
        outcome,
        Outcome::Failed { ref error, .. } if error.kind == ErrorKind::Application
    ));
    assert_eq!(app.ws.selection().len(), 1);
}
