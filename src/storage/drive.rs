//! Google Drive v3 backend.
//!
//! State files live in a single folder in the user's Drive. Files are found
//! by exact name inside that folder and updated in place, so a folder never
//! holds two copies of the same state file.
//!
//! Access tokens are minted from a long lived refresh token and cached until
//! shortly before they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tokio::sync::Mutex;

use super::RemoteStorage;
use crate::{
    config::DriveConfig,
    error::StorageError,
    types::{DriveFile, DriveFileList, DriveFileMetadata, GoogleTokenResponse},
};

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const MULTIPART_BOUNDARY: &str = "radarcli-state-boundary";

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct DriveStorage {
    client: Client,
    config: DriveConfig,
    token: Mutex<Option<CachedToken>>,
}

impl DriveStorage {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            token: Mutex::new(None),
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn upload(&self, path: &str) -> String {
        format!("{}{}", self.config.upload_url.trim_end_matches('/'), path)
    }

    async fn access_token(&self) -> Result<String, StorageError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Auth(body));
        }

        let body: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;

        // renew a minute early
        let ttl = body.expires_in.unwrap_or(3600).saturating_sub(60);
        *cached = Some(CachedToken {
            access_token: body.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(ttl),
        });

        Ok(body.access_token)
    }

    async fn list(&self, query: &str) -> Result<Vec<DriveFile>, StorageError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.api("/files"))
            .bearer_auth(token)
            .query(&[
                ("q", query),
                ("fields", "files(id,name)"),
                ("spaces", "drive"),
                ("orderBy", "createdTime"),
            ])
            .send()
            .await?;

        let list: DriveFileList = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;

        Ok(list.files)
    }

    async fn find_folder(&self, name: &str) -> Result<Option<String>, StorageError> {
        let query = format!(
            "name = '{}' and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false",
            escape_query(name)
        );
        Ok(self.list(&query).await?.into_iter().next().map(|f| f.id))
    }

    async fn create_folder(&self, name: &str) -> Result<String, StorageError> {
        let token = self.access_token().await?;
        let metadata = DriveFileMetadata {
            name: name.to_string(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            parents: Vec::new(),
        };

        let response = self
            .client
            .post(self.api("/files"))
            .bearer_auth(token)
            .query(&[("fields", "id,name")])
            .json(&metadata)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        let folder: DriveFile = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        Ok(folder.id)
    }

    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let metadata = DriveFileMetadata {
            name: name.to_string(),
            mime_type: None,
            parents: vec![folder_id.to_string()],
        };
        let metadata =
            serde_json::to_vec(&metadata).map_err(|e| StorageError::Decode(e.to_string()))?;

        let response = self
            .client
            .post(self.upload("/files"))
            .bearer_auth(token)
            .query(&[("uploadType", "multipart")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(multipart_related(&metadata, content))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn update_file(&self, file_id: &str, content: &[u8]) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .patch(self.upload(&format!("/files/{file_id}")))
            .bearer_auth(token)
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(content.to_vec())
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStorage for DriveStorage {
    fn backend_name(&self) -> &str {
        "google-drive"
    }

    async fn find_or_create_folder(&self, name: &str) -> Result<String, StorageError> {
        if let Some(id) = self.find_folder(name).await? {
            return Ok(id);
        }

        match self.create_folder(name).await {
            // Drive allows duplicate names, so a concurrent creator may have
            // won the race; the oldest folder is the one everybody uses.
            Ok(created) => Ok(self.find_folder(name).await?.unwrap_or(created)),
            Err(StorageError::AlreadyExists(_)) => self
                .find_folder(name)
                .await?
                .ok_or_else(|| StorageError::Decode(format!("folder '{name}' vanished"))),
            Err(e) => Err(e),
        }
    }

    async fn find_file(&self, folder_id: &str, name: &str) -> Result<Option<String>, StorageError> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query(name),
            escape_query(folder_id)
        );
        Ok(self.list(&query).await?.into_iter().next().map(|f| f.id))
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.api(&format!("/files/{file_id}")))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn upload_or_update(
        &self,
        folder_id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<(), StorageError> {
        match self.find_file(folder_id, name).await? {
            Some(file_id) => self.update_file(&file_id, content).await,
            None => self.create_file(folder_id, name, content).await,
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Status { status, body })
}

/// Escapes a value for use inside a single quoted Drive query string.
pub fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Body of a `multipart/related` upload: JSON metadata, then the content.
pub fn multipart_related(metadata: &[u8], content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(
        format!("--{MULTIPART_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(metadata);
    body.extend_from_slice(
        format!("\r\n--{MULTIPART_BOUNDARY}\r\nContent-Type: text/plain\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--").as_bytes());
    body
}
