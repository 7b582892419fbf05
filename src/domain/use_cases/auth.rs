use validator::Validate;

use crate::auth::password::verify_password;
use crate::entities::admin::{AdminIdentity, LoginRequest};
use crate::entities::token::AuthResponse;
use crate::errors::AuthError;
use crate::repositories::token::TokenServiceRepository;

pub struct AuthHandler<T>
where
    T: TokenServiceRepository,
{
    pub admin: AdminIdentity,
    pub token_service: T,
}

impl<T> AuthHandler<T>
where
    T: TokenServiceRepository,
{
    pub fn new(admin: AdminIdentity, token_service: T) -> Self {
        AuthHandler { admin, token_service }
    }

    /// Verifies the administrator's credentials and issues an access token
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        // Hash is checked before the email so both failures cost the same.
        let is_password_valid = verify_password(&request.password, &self.admin.password_hash)
            .map_err(|e| {
                tracing::error!("Admin password hash is unusable: {}", e);
                AuthError::WrongCredentials
            })?;
        let is_admin_email = request.email.trim().eq_ignore_ascii_case(self.admin.email.trim());

        if !(is_password_valid && is_admin_email) {
            tracing::warn!("Rejected admin login attempt");
            return Err(AuthError::WrongCredentials);
        }

        let response = self.create_auth_response()?;

        tracing::info!("Admin logged in successfully");
        Ok(response)
    }

    pub fn create_auth_response(&self) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(&self.admin)
            .map_err(|e| {
                tracing::warn!("Failed to create JWT: {}", e);
                AuthError::TokenCreation
            })?;

        Ok(AuthResponse::new(access_token, self.token_service.expires_in()))
    }
}
