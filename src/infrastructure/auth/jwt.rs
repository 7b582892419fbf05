use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};

use crate::entities::admin::AdminIdentity;
use crate::entities::token::Claims;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            access_expiration: Duration::minutes(config.jwt_expiration_minutes),
        }
    }

    pub fn create_jwt(&self, admin: &AdminIdentity) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.access_expiration).timestamp() as usize;

        let claims = Claims {
            sub: admin.email.clone(),
            email: admin.email.clone(),
            admin: true,
            exp,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(AuthError::from)
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.keys.decoding, &validation).map_err(AuthError::from)
    }
}

impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, admin: &AdminIdentity) -> Result<String, AuthError> {
        self.create_jwt(admin)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        self.decode_jwt(token)
    }

    fn expires_in(&self) -> i64 {
        self.access_expiration.num_seconds()
    }
}
