use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use tracing::{instrument, warn};

use crate::{
    entities::contact_me::ContactForm,
    errors::AppError,
    handlers::json_error::json_error,
    utils::get_client_ip::get_client_ip,
    AppState,
};

#[instrument(skip(req, state, form))]
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> Result<impl Responder, AppError> {
    let client_ip = get_client_ip(&req, state.trust_forwarded_for);
    let decision = state.contact_limiter.check(&format!("contact:{client_ip}"));

    if !decision.allowed {
        warn!(%client_ip, "Contact form rate limit exceeded");
        let mut response = json_error(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many contact requests. Please try again later.",
        );
        if let Some(retry_after) = decision.retry_after_secs {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert(actix_web::http::header::RETRY_AFTER, value);
            }
        }
        return Ok(response);
    }

    let reply = state.contact_handler.submit(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reply))
}
