use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};
use serde::Deserialize;
use tracing::info;

use crate::entities::media::{MediaFile, ResourceType, UploadedMedia};
use crate::repositories::media::{MediaUploader, UploadError};
use crate::settings::AppConfig;

#[derive(Debug, Deserialize)]
struct StorageResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    error: Option<StorageErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct StorageErrorMessage {
    message: String,
}

/// Unsigned upload to an object-storage endpoint using an upload preset.
#[derive(Clone)]
pub struct HttpMediaUploader {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl HttpMediaUploader {
    pub fn new(upload_url: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
        }
    }

    /// `None` unless both the upload URL and the preset are configured.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let url = config.media_upload_url.as_deref().filter(|u| !u.trim().is_empty())?;
        let preset = config.media_upload_preset.as_deref().filter(|p| !p.trim().is_empty())?;
        Some(Self::new(url, preset))
    }
}

#[async_trait]
impl MediaUploader for HttpMediaUploader {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
        let size = file.bytes.len();
        let resource_type = ResourceType::sniff(&file.bytes);

        let mut part = multipart::Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| UploadError::Failed(e.to_string()))?;
        }

        let form = multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", file.folder.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(UploadError::InvalidCredentials);
        }
        if !status.is_success() {
            let message = response
                .json::<StorageErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .map(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(UploadError::Failed(message));
        }

        let stored: StorageResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        info!(public_id = %stored.public_id, bytes = size, "Media uploaded");

        Ok(UploadedMedia {
            url: stored.secure_url,
            public_id: stored.public_id,
            resource_type,
            bytes: size,
        })
    }
}
