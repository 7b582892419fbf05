use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::entities::admin::LoginRequest;
use crate::errors::AuthError;
use crate::AppState;

#[instrument(skip(state, credentials))]
pub async fn login(
    state: web::Data<AppState>,
    credentials: web::Json<LoginRequest>
) -> Result<impl Responder, AuthError> {
    let auth_response = state.auth_handler.login(credentials.into_inner()).await?;
    Ok(HttpResponse::Ok().json(auth_response))
}
