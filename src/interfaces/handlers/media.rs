use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::media::{MediaFile, MediaUploadForm},
    errors::AppError,
    use_cases::extractors::AdminClaims,
    AppState,
};

#[instrument(skip(_claims, state, form))]
pub async fn upload_media(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<MediaUploadForm>,
) -> Result<impl Responder, AppError> {
    let bytes = tokio::fs::read(form.file.file.path())
        .await
        .map_err(|e| AppError::InternalError(format!("Could not read upload: {}", e)))?;

    let file = MediaFile {
        file_name: form.file.file_name.clone().unwrap_or_else(|| "upload".to_string()),
        content_type: form.file.content_type.as_ref().map(|mime| mime.to_string()),
        bytes,
        folder: form.folder.map(|folder| folder.into_inner()).unwrap_or_default(),
    };

    let uploaded = state.media_handler.upload(file).await?;
    Ok(HttpResponse::Ok().json(uploaded))
}
