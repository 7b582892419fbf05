use jsonwebtoken::TokenData;

use crate::{entities::{admin::AdminIdentity, token::Claims}, errors::AuthError};

pub trait TokenServiceRepository: Send + Sync {
    /// Creates a new access JWT for the administrator
    fn create_jwt(&self, admin: &AdminIdentity) -> Result<String, AuthError>;

    /// Decodes a JWT and returns the claims
    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;

    /// Lifetime of issued access tokens, in seconds
    fn expires_in(&self) -> i64;
}
