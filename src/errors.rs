use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use jsonwebtoken::errors::{ErrorKind, Error as JwtError};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(e) if e.code().as_deref() == Some("23505") => {
                AppError::Conflict("Database conflict occurred".into())
            }
            _ => AppError::InternalError(format!("Database error: {}", err))
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum AuthError {
    #[display("Invalid token")]
    InvalidToken,

    #[display("Wrong credentials")]
    WrongCredentials,

    #[display("Token creation error")]
    TokenCreation,

    #[display("Token expired")]
    TokenExpired,

    #[display("Missing credentials")]
    MissingCredentials,

    #[display("Missing JWT service")]
    MissingJwtService,

    #[display("Forbidden: {_0}")]
    Forbidden(String),
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let error_message = match self {
            AuthError::TokenExpired => "Token has expired".to_string(),
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({"error": error_message}))
    }
    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
            AuthError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::MissingJwtService => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(_: ValidationErrors) -> Self {
        AuthError::WrongCredentials
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password parameters: {_0}")]
    InvalidParameters(String),

    #[display("Password hashing failed: {_0}")]
    HashingError(String),

    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

impl std::error::Error for PasswordError {}

/// Failures of the client-side catalog core.
///
/// None of these are fatal: the reconciler turns them into a fallback
/// or a [`SyncNotice`](crate::catalog::SyncNotice).
#[derive(Debug, Clone, PartialEq, Display)]
pub enum CatalogError {
    #[display("Transport error: {_0}")]
    Transport(String),

    #[display("Remote catalog returned {status}: {message}")]
    Status { status: u16, message: String },

    #[display("Could not decode catalog payload: {_0}")]
    Decode(String),

    #[display("Invalid project record: {_0}")]
    InvalidRecord(String),

    #[display("Local store error: {_0}")]
    Storage(String),

    #[display("Mutation queue is closed")]
    QueueClosed,
}

impl std::error::Error for CatalogError {}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            CatalogError::Status { status: status.as_u16(), message: err.to_string() }
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
