use std::sync::Arc;

use async_trait::async_trait;
use derive_more::Display;

use crate::entities::media::{MediaFile, UploadedMedia};

#[derive(Debug, Display)]
pub enum UploadError {
    #[display("Invalid media storage credentials")]
    InvalidCredentials,

    #[display("Media upload failed: {_0}")]
    Failed(String),
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError>;
}

#[async_trait]
impl<T: MediaUploader + ?Sized> MediaUploader for Arc<T> {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
        (**self).upload(file).await
    }
}
