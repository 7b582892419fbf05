use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod catalog;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, limiter, mail, media, utils};

use auth::jwt::JwtService;
use entities::admin::AdminIdentity;
use limiter::rate_limiter::RateLimiterStore;
use mail::relay::HttpMailRelay;
use media::uploader::HttpMediaUploader;
use repositories::{
    mail::MailRelay, media::MediaUploader, project::ProjectRepository, sqlx_repo::SqlxProjectRepo,
};
use use_cases::{auth::AuthHandler, contact::ContactHandler, media::MediaHandler, projects::ProjectHandler};

pub struct AppState {
    pub project_handler: AppProjectHandler,
    pub auth_handler: AppAuthHandler,
    pub contact_handler: AppContactHandler,
    pub media_handler: AppMediaHandler,
    pub contact_limiter: RateLimiterStore,
    /// Honour `X-Forwarded-For` when keying per-client limits.
    pub trust_forwarded_for: bool,
}

pub type AppProjectHandler = ProjectHandler<Arc<dyn ProjectRepository>>;
pub type AppAuthHandler = AuthHandler<JwtService>;
pub type AppContactHandler = ContactHandler<Arc<dyn MailRelay>>;
pub type AppMediaHandler = MediaHandler<Arc<dyn MediaUploader>>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let project_repo: Arc<dyn ProjectRepository> = Arc::new(SqlxProjectRepo::new(pool));

        let relay = HttpMailRelay::from_config(config).map(|r| Arc::new(r) as Arc<dyn MailRelay>);
        if relay.is_none() {
            tracing::warn!("Mail relay not configured; contact form will answer with mailto links");
        }

        let uploader = HttpMediaUploader::from_config(config).map(|u| Arc::new(u) as Arc<dyn MediaUploader>);
        if uploader.is_none() {
            tracing::warn!("Media storage not configured; uploads will be rejected");
        }

        Self::with_components(config, project_repo, relay, uploader)
    }

    /// Wires the state from explicit collaborators; the server and tests share it.
    pub fn with_components(
        config: &settings::AppConfig,
        project_repo: Arc<dyn ProjectRepository>,
        relay: Option<Arc<dyn MailRelay>>,
        uploader: Option<Arc<dyn MediaUploader>>,
    ) -> Self {
        let admin = AdminIdentity {
            email: config.admin_email.clone(),
            password_hash: config.admin_password_hash.clone(),
        };

        AppState {
            project_handler: ProjectHandler::new(project_repo),
            auth_handler: AuthHandler::new(admin, JwtService::new(config)),
            contact_handler: ContactHandler::new(relay, config.owner_email.clone()),
            media_handler: MediaHandler::new(uploader, config.media_folder.clone(), config.max_upload_bytes),
            contact_limiter: RateLimiterStore::per_hour(config.contact_limit_per_hour),
            trust_forwarded_for: config.is_production(),
        }
    }
}
