use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::{env, fmt, path::PathBuf, str::FromStr};
use zeroize::Zeroizing;

use crate::constants::LOCAL_CACHE_KEY;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_minutes: i64,

    #[serde(default)]
    pub admin_email: String,

    /// Argon2id PHC string, see `catalog hash-password`.
    #[serde(default)]
    pub admin_password_hash: String,

    #[serde(default)]
    pub owner_email: String,

    #[serde(default)]
    pub mail_relay_url: Option<String>,

    #[serde(default)]
    pub mail_relay_token: Option<String>,

    #[serde(default)]
    pub media_upload_url: Option<String>,

    #[serde(default)]
    pub media_upload_preset: Option<String>,

    #[serde(default = "default_media_folder")]
    pub media_folder: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_contact_limit")]
    pub contact_limit_per_hour: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Catalog".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_jwt_expiration() -> i64 {
    60
}
fn default_media_folder() -> String {
    "portfolio".to_string()
}
fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}
fn default_contact_limit() -> u64 {
    5
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty");
        }
        if self.jwt_secret.len() < 32 {
            errors.push("JWT_SECRET must be at least 32 characters");
        }
        if self.admin_email.trim().is_empty() {
            errors.push("ADMIN_EMAIL cannot be empty");
        }
        if !self.admin_password_hash.starts_with("$argon2") {
            errors.push("ADMIN_PASSWORD_HASH must be an Argon2 PHC string");
        }
        if self.owner_email.trim().is_empty() {
            errors.push("OWNER_EMAIL cannot be empty");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else if self.len() < 32 {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &self.jwt_secret.redact())
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("admin_email", &self.admin_email)
            .field("admin_password_hash", &self.admin_password_hash.redact())
            .field("owner_email", &self.owner_email)
            .field("mail_relay_url", &self.mail_relay_url)
            .field("mail_relay_token", &self.mail_relay_token.as_ref().map(|t| t.redact()))
            .field("media_upload_url", &self.media_upload_url)
            .field("media_folder", &self.media_folder)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("contact_limit_per_hour", &self.contact_limit_per_hour)
            .finish()
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl From<&AppConfig> for JwtKeys {
    fn from(config: &AppConfig) -> Self {
        let jwt_secret = Zeroizing::new(config.jwt_secret.clone());

        JwtKeys {
            encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("encoding", &"[REDACTED]")
            .field("decoding", &"[REDACTED]")
            .finish()
    }
}

/// Settings for the `catalog` admin client.
#[derive(Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_cache_key")]
    pub cache_key: String,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080/api/v1".to_string()
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from(".portfolio")
}
fn default_cache_key() -> String {
    LOCAL_CACHE_KEY.to_string()
}
fn default_request_timeout() -> u64 {
    30
}

impl ClientConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let config: Self = Config::builder()
            .add_source(File::with_name("config/client").required(false))
            .add_source(Environment::with_prefix("CATALOG").try_parsing(true).ignore_empty(true))
            .build()?
            .try_deserialize()?;

        if config.cache_key.trim().is_empty() {
            return Err(ConfigError::Message("CACHE_KEY cannot be empty".into()));
        }
        if url::Url::parse(&config.api_base_url).is_err() {
            return Err(ConfigError::Message(format!(
                "Invalid API base URL: {}",
                config.api_base_url
            )));
        }

        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("cache_dir", &self.cache_dir)
            .field("cache_key", &self.cache_key)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
