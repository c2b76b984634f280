//! `reqwest`-backed implementation of the REST collaborator.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use cloudbox_core::config::ApiConfig;
use cloudbox_core::error::{AppError, ErrorKind};
use cloudbox_core::result::AppResult;
use cloudbox_core::traits::ContentFetcher;
use cloudbox_core::types::{FileId, FolderId};
use cloudbox_entity::file::{File, FileCategory, ListFilter};
use cloudbox_entity::folder::Folder;
use cloudbox_entity::share::ShareTarget;

use crate::api::{FileApi, UploadRequest};
use crate::routes;

/// `{files: [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum FilesBody {
    Wrapped { files: Vec<File> },
    Bare(Vec<File>),
}

/// `{folders: [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum FoldersBody {
    Wrapped { folders: Vec<Folder> },
    Bare(Vec<Folder>),
}

/// HTTP client for the drive backend.
#[derive(Clone)]
pub struct HttpFileApi {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpFileApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFileApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpFileApi {
    /// Build a client from the API configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to create HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// The base URL all endpoint paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.authorize(self.client.request(method, url))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    /// Send a request and turn transport errors and non-2xx statuses into `AppError`.
    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Backend responded");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::http_status(
            status.as_u16(),
            error_message(&body).unwrap_or_else(|| format!("Request failed with status {status}")),
        ))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Unexpected response body: {e}"),
                e,
            )
        })
    }

    /// Like `send_json` but tolerates an empty 2xx body.
    async fn send_value(&self, builder: RequestBuilder) -> AppResult<Value> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn list(&self, path: &str) -> AppResult<Vec<File>> {
        let body: FilesBody = self.send_json(self.request(Method::GET, path)).await?;
        Ok(match body {
            FilesBody::Wrapped { files } | FilesBody::Bare(files) => files,
        })
    }
}

#[async_trait]
impl ContentFetcher for HttpFileApi {
    async fn fetch_bytes(&self, url: &str) -> AppResult<Bytes> {
        let builder = self.client.get(url);
        // Only our own backend gets the token; content URLs may point at a CDN.
        let builder = if url.starts_with(&self.base_url) {
            self.authorize(builder)
        } else {
            builder
        };
        let response = self.send(builder).await?;
        response.bytes().await.map_err(map_transport_error)
    }
}

#[async_trait]
impl FileApi for HttpFileApi {
    async fn list_files(&self, filter: ListFilter) -> AppResult<Vec<File>> {
        self.list(&routes::files(filter)).await
    }

    async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        let body: FoldersBody = self
            .send_json(self.request(Method::GET, &routes::folders()))
            .await?;
        Ok(match body {
            FoldersBody::Wrapped { folders } | FoldersBody::Bare(folders) => folders,
        })
    }

    async fn list_folder_files(
        &self,
        folder_id: &FolderId,
        category: Option<FileCategory>,
    ) -> AppResult<Vec<File>> {
        self.list(&routes::folder_files(folder_id, category)).await
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&FolderId>,
    ) -> AppResult<Option<Folder>> {
        let mut body = json!({ "name": name });
        if let Some(parent) = parent {
            body["parentFolderId"] = json!(parent);
        }
        let value = self
            .send_value(self.request(Method::POST, &routes::folders()).json(&body))
            .await?;
        let folder = value.get("folder").cloned().unwrap_or(value);
        Ok(serde_json::from_value(folder).ok())
    }

    async fn rename_file(&self, id: &FileId, new_name: &str) -> AppResult<()> {
        let body = json!({ "newFileName": new_name });
        self.send(self.request(Method::PATCH, &routes::rename_file(id)).json(&body))
            .await?;
        Ok(())
    }

    async fn rename_folder(&self, id: &FolderId, new_name: &str) -> AppResult<()> {
        let body = json!({ "newFolderName": new_name });
        self.send(self.request(Method::PATCH, &routes::rename_folder(id)).json(&body))
            .await?;
        Ok(())
    }

    async fn delete_file(&self, id: &FileId) -> AppResult<()> {
        self.send(self.request(Method::DELETE, &routes::file(id)))
            .await?;
        Ok(())
    }

    async fn delete_folder(&self, id: &FolderId) -> AppResult<()> {
        self.send(self.request(Method::DELETE, &routes::folder(id)))
            .await?;
        Ok(())
    }

    async fn archive_file(&self, id: &FileId) -> AppResult<()> {
        self.send(self.request(Method::PATCH, &routes::archive_file(id)))
            .await?;
        Ok(())
    }

    async fn archive_folder(&self, id: &FolderId) -> AppResult<()> {
        self.send(self.request(Method::PATCH, &routes::archive_folder(id)))
            .await?;
        Ok(())
    }

    async fn move_file(&self, id: &FileId, target: Option<&FolderId>) -> AppResult<()> {
        let body = json!({ "folderId": target });
        self.send(self.request(Method::PATCH, &routes::move_file(id)).json(&body))
            .await?;
        Ok(())
    }

    async fn request_share(&self, target: &ShareTarget) -> AppResult<Value> {
        let builder = match target {
            ShareTarget::File(id) => self.request(
                Method::POST,
                &routes::share(target.kind(), Some(id.as_str())),
            ),
            ShareTarget::Folder(id) => self.request(
                Method::POST,
                &routes::share(target.kind(), Some(id.as_str())),
            ),
            ShareTarget::Multi {
                folder_ids,
                file_ids,
            } => self
                .request(Method::POST, &routes::share(target.kind(), None))
                .json(&json!({ "folderIds": folder_ids, "fileIds": file_ids })),
        };
        self.send_value(builder).await
    }

    async fn upload(&self, request: UploadRequest) -> AppResult<Value> {
        let part = reqwest::multipart::Part::bytes(request.data.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Validation,
                    format!("Invalid MIME type '{}': {e}", request.mime_type),
                    e,
                )
            })?;
        let form = reqwest::multipart::Form::new()
            .text("category", request.category.as_str())
            .part("file", part);

        let path = routes::upload(request.folder_id.as_ref());
        self.send_value(self.request(Method::POST, &path).multipart(form))
            .await
    }
}

fn map_transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::with_source(ErrorKind::Timeout, format!("Request timed out: {err}"), err)
    } else {
        AppError::with_source(ErrorKind::Network, format!("Request failed: {err}"), err)
    }
}

/// Pull a human-readable message out of an error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}
