use serde::{Deserialize, Serialize};
use validator::Validate;

/// The single configured administrator of the catalog.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}
