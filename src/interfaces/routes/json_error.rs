use actix_web::{
    web,
    http::StatusCode,
    ResponseError,
    HttpResponse,
    error::{JsonPayloadError, PathError, QueryPayloadError},
};
use serde_json::json;

/// Extractor failures answer with the same `{error}` body as handler errors.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        RequestShapeError::from(err).into()
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        RequestShapeError::from(err).into()
    }));
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        RequestShapeError::from(err).into()
    }));
}

#[derive(Debug)]
pub struct RequestShapeError {
    message: String,
    status: StatusCode
}

impl std::fmt::Display for RequestShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for RequestShapeError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status).json(json!({ "error": self.message }))
    }
}

impl From<JsonPayloadError> for RequestShapeError {
    fn from(err: JsonPayloadError) -> Self {
        let status = match err {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            _ => StatusCode::BAD_REQUEST,
        };
        RequestShapeError {
            message: format!("JSON payload error: {}", err),
            status,
        }
    }
}

impl From<QueryPayloadError> for RequestShapeError {
    fn from(err: QueryPayloadError) -> Self {
        RequestShapeError {
            message: format!("Invalid query string: {}", err),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<PathError> for RequestShapeError {
    fn from(err: PathError) -> Self {
        RequestShapeError {
            message: format!("Invalid path parameter: {}", err),
            status: StatusCode::BAD_REQUEST,
        }
    }
}
