use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{multipart, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::entities::admin::LoginRequest;
use crate::entities::media::UploadedMedia;
use crate::entities::project::{NewProject, ProjectListResponse, ProjectRecord, ProjectUpdate};
use crate::entities::token::AuthResponse;
use crate::errors::CatalogError;

/// Server side of the catalog.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<ProjectRecord>, CatalogError>;
    async fn get(&self, id: i64) -> Result<ProjectRecord, CatalogError>;
    /// Returns the canonical record, carrying the server-assigned id.
    async fn create(&self, project: &NewProject) -> Result<ProjectRecord, CatalogError>;
    async fn update(&self, id: i64, changes: &ProjectUpdate) -> Result<(), CatalogError>;
    async fn delete(&self, id: i64) -> Result<(), CatalogError>;
}

#[async_trait]
impl<T: RemoteCatalog + ?Sized> RemoteCatalog for Arc<T> {
    async fn list(&self) -> Result<Vec<ProjectRecord>, CatalogError> {
        (**self).list().await
    }

    async fn get(&self, id: i64) -> Result<ProjectRecord, CatalogError> {
        (**self).get(id).await
    }

    async fn create(&self, project: &NewProject) -> Result<ProjectRecord, CatalogError> {
        (**self).create(project).await
    }

    async fn update(&self, id: i64, changes: &ProjectUpdate) -> Result<(), CatalogError> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        (**self).delete(id).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `RemoteCatalog` over the catalog server's `/api/v1` HTTP surface.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, CatalogError> {
        url::Url::parse(base_url)
            .map_err(|e| CatalogError::Transport(format!("invalid base url {base_url}: {e}")))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Exchanges administrator credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, CatalogError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let response = self
            .client
            .post(self.endpoint("auth/login"))
            .json(&body)
            .send()
            .await?;

        Ok(expect_success(response).await?.json().await?)
    }

    /// Uploads a local file through the server's media endpoint.
    pub async fn upload_media(&self, path: &Path, folder: Option<&str>) -> Result<UploadedMedia, CatalogError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut form = multipart::Form::new().part("file", multipart::Part::bytes(bytes).file_name(file_name));
        if let Some(folder) = folder {
            form = form.text("folder", folder.to_string());
        }

        let response = self
            .authorized(self.client.post(self.endpoint("media")))
            .multipart(form)
            .send()
            .await?;

        Ok(expect_success(response).await?.json().await?)
    }
}

/// Passes 2xx responses through; anything else becomes `CatalogError::Status`
/// carrying the server's `error` message when it sent one.
async fn expect_success(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        });

    Err(CatalogError::Status { status: status.as_u16(), message })
}

#[async_trait]
impl RemoteCatalog for HttpCatalogClient {
    async fn list(&self) -> Result<Vec<ProjectRecord>, CatalogError> {
        let response = self.client.get(self.endpoint("projects")).send().await?;
        let body: ProjectListResponse = expect_success(response).await?.json().await?;

        if !body.success {
            return Err(CatalogError::Decode("remote catalog reported success=false".into()));
        }
        debug!(count = body.data.len(), "Fetched remote catalog");
        Ok(body.data)
    }

    async fn get(&self, id: i64) -> Result<ProjectRecord, CatalogError> {
        let response = self.client.get(self.endpoint(&format!("projects/{id}"))).send().await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn create(&self, project: &NewProject) -> Result<ProjectRecord, CatalogError> {
        let response = self
            .authorized(self.client.post(self.endpoint("projects")))
            .json(project)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn update(&self, id: i64, changes: &ProjectUpdate) -> Result<(), CatalogError> {
        let response = self
            .authorized(self.client.put(self.endpoint(&format!("projects/{id}"))))
            .json(changes)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        let response = self
            .authorized(self.client.delete(self.endpoint(&format!("projects/{id}"))))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(project_id = id, "Remote project already absent");
            return Ok(());
        }
        expect_success(response).await?;
        Ok(())
    }
}
