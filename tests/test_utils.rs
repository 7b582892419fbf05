#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use portfolio_catalog::{
    auth::password::hash_password,
    entities::{
        contact_me::OutgoingMail,
        media::{MediaFile, ResourceType, UploadedMedia},
        project::{NewProject, ProjectInsert, ProjectRecord},
        token::AuthResponse,
    },
    errors::AppError,
    middlewares::auth::AuthMiddleware,
    repositories::{
        mail::{MailRelay, RelayError},
        media::{MediaUploader, UploadError},
        project::ProjectRepository,
    },
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use reqwest::Client;
use std::{net::TcpListener, sync::Arc, time::Duration};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const OWNER_EMAIL: &str = "owner@example.com";

/// `ProjectRepository` over a vector; ids are handed out like `BIGSERIAL`.
#[derive(Default)]
pub struct InMemoryProjectRepo {
    rows: Mutex<Vec<ProjectRecord>>,
    next_id: Mutex<i64>,
}

impl InMemoryProjectRepo {
    pub fn snapshot(&self) -> Vec<ProjectRecord> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn create_project(&self, project: &ProjectInsert) -> Result<ProjectRecord, AppError> {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        };
        let record = project.clone().into_record(id);
        self.rows.lock().push(record.clone());
        Ok(record)
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Option<ProjectRecord>, AppError> {
        Ok(self.rows.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        Ok(self.snapshot())
    }

    async fn update_project(&self, project: &ProjectRecord) -> Result<(), AppError> {
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        let created_at = row.created_at;
        *row = project.clone();
        row.created_at = created_at;
        Ok(())
    }

    async fn delete_project(&self, id: i64) -> Result<bool, AppError> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Relay that keeps what it was asked to send, or refuses credentials.
#[derive(Default)]
pub struct CapturingRelay {
    pub reject_credentials: bool,
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl MailRelay for CapturingRelay {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), RelayError> {
        if self.reject_credentials {
            return Err(RelayError::Authentication("535 invalid login".into()));
        }
        self.sent.lock().push(mail.clone());
        Ok(())
    }
}

/// Uploader that "stores" files under a fake CDN host.
pub struct FakeStorage;

#[async_trait]
impl MediaUploader for FakeStorage {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
        Ok(UploadedMedia {
            url: format!("https://cdn.example.com/{}/{}", file.folder, file.file_name),
            public_id: format!("{}/{}", file.folder, file.file_name),
            resource_type: ResourceType::sniff(&file.bytes),
            bytes: file.bytes.len(),
        })
    }
}

#[derive(Default)]
pub struct Collaborators {
    pub relay: Option<Arc<CapturingRelay>>,
    pub storage: bool,
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub repo: Arc<InMemoryProjectRepo>,
    pub relay: Option<Arc<CapturingRelay>>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Collaborators::default()).await
    }

    pub async fn spawn_with(collaborators: Collaborators) -> Self {
        let config = test_config();
        let repo = Arc::new(InMemoryProjectRepo::default());

        let relay = collaborators
            .relay
            .clone()
            .map(|r| r as Arc<dyn MailRelay>);
        let uploader = collaborators
            .storage
            .then(|| Arc::new(FakeStorage) as Arc<dyn MediaUploader>);

        let state = Arc::new(AppState::with_components(
            &config,
            repo.clone() as Arc<dyn ProjectRepository>,
            relay,
            uploader,
        ));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);
        let max_upload_bytes = config.max_upload_bytes;

        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::from(state.clone()))
                .wrap(AuthMiddleware)
                .wrap(NormalizePath::trim())
                .configure(|cfg| configure_routes(cfg, max_upload_bytes))
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&address).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            config,
            repo,
            relay: collaborators.relay,
        }
    }

    pub fn api(&self) -> String {
        format!("{}/api/v1", self.address)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api(), path.trim_start_matches('/'))
    }

    pub async fn login(&self) -> AuthResponse {
        self.client
            .post(self.url("auth/login"))
            .json(&serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .send()
            .await
            .expect("Failed to log in")
            .json()
            .await
            .expect("Login response was not JSON")
    }

    pub async fn admin_token(&self) -> String {
        self.login().await.access_token
    }

    /// Writes straight to the repository, bypassing HTTP.
    pub async fn insert_project(&self, name: &str) -> ProjectRecord {
        let draft = NewProject {
            name: name.to_string(),
            short_description: format!("{name} in brief"),
            technologies: vec!["Rust".into(), "Postgres".into()],
            ..Default::default()
        };
        self.repo
            .create_project(&draft.prepare_for_insert(Utc::now()))
            .await
            .expect("Failed to insert project")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Catalog Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: "postgres://unused".into(),
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".into(),
        jwt_expiration_minutes: 5,
        admin_email: ADMIN_EMAIL.into(),
        admin_password_hash: hash_password(ADMIN_PASSWORD).expect("Failed to hash admin password"),
        owner_email: OWNER_EMAIL.into(),
        mail_relay_url: None,
        mail_relay_token: None,
        media_upload_url: None,
        media_upload_preset: None,
        media_folder: "portfolio".into(),
        max_upload_bytes: 1024 * 1024,
        contact_limit_per_hour: 3,
    }
}

pub fn sample_project(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "short_description": format!("{name} in brief"),
        "long_description": "Built to show how the catalog behaves.",
        "technologies": ["Go", "Kafka", "Go"],
        "github_url": "https://github.com/example/project",
        "live_url": "",
        "category": "DevOps & Infrastructure",
        "is_featured": true
    })
}
