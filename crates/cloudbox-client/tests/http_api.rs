//! `HttpFileApi` against a mock backend served by axum on an ephemeral port.

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::{Value, json};

use cloudbox_client::{FileApi, HttpFileApi, UploadRequest};
use cloudbox_core::config::ApiConfig;
use cloudbox_core::error::ErrorKind;
use cloudbox_core::traits::ContentFetcher;
use cloudbox_entity::file::{FileCategory, ListFilter};
use cloudbox_entity::share::ShareTarget;

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn folders(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "folders": [
            { "_id": "f1", "name": "Docs", "parentFolderId": null, "children": [
                { "_id": "f2", "name": "Reports", "parentFolderId": "f1", "children": [] }
            ]}
        ]
    })))
}

async fn images() -> Json<Value> {
    Json(json!({
        "files": [
            { "_id": 42, "name": "a.png", "mimeType": "image/png",
              "url": "https://cdn.example.com/a.png", "sizeBytes": 10, "folderId": null }
        ]
    }))
}

async fn folder_files(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if id == "missing" {
        return Err((StatusCode::NOT_FOUND, Json(json!({ "message": "Folder not found" }))));
    }
    Ok(Json(json!([])))
}

async fn rename(
    State(rec): State<Recorded>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.bodies.lock().unwrap().push(body);
    Json(json!({ "message": "renamed" }))
}

async fn share_many(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.bodies.lock().unwrap().push(body);
    Json(json!({ "shareLink": "https://x/y" }))
}

async fn upload(
    State(rec): State<Recorded>,
    Path(folder): Path<String>,
    mut multipart: Multipart,
) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.unwrap();
            rec.uploads.lock().unwrap().push((folder.clone(), name, data.len()));
        }
    }
    Json(json!({ "message": "File uploaded successfully" }))
}

async fn content() -> Bytes {
    Bytes::from_static(b"%PDF-1.7")
}

async fn spawn_backend() -> (HttpFileApi, Recorded, String) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/folders", get(folders))
        .route("/api/files/type/image", get(images))
        .route("/api/folders/{id}/files", get(folder_files))
        .route("/api/files/{id}/rename", patch(rename))
        .route("/api/share/multiple", post(share_many))
        .route("/api/folders/{id}/upload", post(upload))
        .route("/api/content/doc.pdf", get(content))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = format!("http://{addr}/api");
    let config = ApiConfig {
        base_url: base.clone(),
        token: TOKEN.to_string(),
        ..ApiConfig::default()
    };
    (HttpFileApi::new(&config).unwrap(), recorded, base)
}

#[tokio::test]
async fn test_list_folders_nested() {
    let (api, _, _) = spawn_backend().await;
    let folders = api.list_folders().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, "Docs");
    assert_eq!(folders[0].children[0].id.as_str(), "f2");
}

#[tokio::test]
async fn test_missing_token_is_authentication_error() {
    let (_, _, base) = spawn_backend().await;
    let anonymous = HttpFileApi::new(&ApiConfig {
        base_url: base,
        ..ApiConfig::default()
    })
    .unwrap();

    let err = anonymous.list_folders().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.status, Some(401));
}

#[tokio::test]
async fn test_category_listing_normalizes_numeric_ids() {
    let (api, _, _) = spawn_backend().await;
    let files = api
        .list_files(ListFilter::Category(FileCategory::Image))
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id.as_str(), "42");
    assert!(files[0].is_root_level());
}

#[tokio::test]
async fn test_bare_array_and_error_message() {
    let (api, _, _) = spawn_backend().await;
    assert!(api.list_folder_files(&"f1".into(), None).await.unwrap().is_empty());

    let err = api
        .list_folder_files(&"missing".into(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Folder not found");
}

#[tokio::test]
async fn test_rename_sends_new_file_name() {
    let (api, recorded, _) = spawn_backend().await;
    api.rename_file(&"42".into(), "new.pdf").await.unwrap();
    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(bodies[0], json!({ "newFileName": "new.pdf" }));
}

#[tokio::test]
async fn test_share_many_returns_raw_body() {
    let (api, recorded, _) = spawn_backend().await;
    let target = ShareTarget::Multi {
        folder_ids: vec!["f1".into()],
        file_ids: vec!["42".into()],
    };
    let body = api.request_share(&target).await.unwrap();
    assert_eq!(body["shareLink"], "https://x/y");
    assert_eq!(
        recorded.bodies.lock().unwrap()[0],
        json!({ "folderIds": ["f1"], "fileIds": ["42"] })
    );
}

#[tokio::test]
async fn test_folder_scoped_multipart_upload() {
    let (api, recorded, _) = spawn_backend().await;
    let body = api
        .upload(UploadRequest {
            folder_id: Some("f1".into()),
            category: FileCategory::Document,
            file_name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            data: Bytes::from_static(b"hello"),
        })
        .await
        .unwrap();
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(
        recorded.uploads.lock().unwrap()[0],
        ("f1".to_string(), "notes.txt".to_string(), 5)
    );
}

#[tokio::test]
async fn test_fetch_bytes() {
    let (api, _, base) = spawn_backend().await;
    let bytes = api
        .fetch_bytes(&format!("{base}/content/doc.pdf"))
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7");
}
