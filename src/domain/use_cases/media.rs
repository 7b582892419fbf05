use tracing::{info, warn};

use crate::entities::media::{MediaFile, UploadedMedia};
use crate::errors::AppError;
use crate::repositories::media::{MediaUploader, UploadError};

pub struct MediaHandler<U>
where
    U: MediaUploader,
{
    pub uploader: Option<U>,
    pub default_folder: String,
    pub max_upload_bytes: usize,
}

impl<U> MediaHandler<U>
where
    U: MediaUploader,
{
    pub fn new(uploader: Option<U>, default_folder: String, max_upload_bytes: usize) -> Self {
        MediaHandler { uploader, default_folder, max_upload_bytes }
    }

    /// Forwards a file to object storage and returns its public URL.
    ///
    /// Only the size is checked; content type and reachability are the
    /// caller's concern.
    pub async fn upload(&self, mut file: MediaFile) -> Result<UploadedMedia, AppError> {
        let Some(uploader) = &self.uploader else {
            return Err(AppError::ServiceUnavailable("Media storage is not configured".into()));
        };

        if file.bytes.is_empty() {
            return Err(AppError::BadRequest("No file provided".into()));
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(AppError::BadRequest(format!(
                "File size exceeds {}MB limit",
                self.max_upload_bytes / (1024 * 1024)
            )));
        }
        if file.folder.trim().is_empty() {
            file.folder = self.default_folder.clone();
        }

        info!(file_name = %file.file_name, bytes = file.bytes.len(), "Uploading media");

        uploader.upload(file).await.map_err(|e| match e {
            UploadError::InvalidCredentials => {
                warn!("Media storage rejected credentials");
                AppError::ServiceUnavailable("Invalid media storage credentials".into())
            }
            UploadError::Failed(msg) => AppError::InternalError(format!("Upload failed: {}", msg)),
        })
    }
}
