use serde::{Serialize, Deserialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    pub fn new(access_token: String, expires_in: i64) -> Self {
        AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub admin: bool,
    pub exp: usize,
    pub iat: usize,
}
