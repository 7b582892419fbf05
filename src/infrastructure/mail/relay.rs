use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::entities::contact_me::OutgoingMail;
use crate::repositories::mail::{MailRelay, RelayError};
use crate::settings::AppConfig;

/// Hands contact messages to an HTTP mail relay as JSON.
#[derive(Clone)]
pub struct HttpMailRelay {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpMailRelay {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, endpoint: endpoint.into(), token }
    }

    /// `None` when no relay endpoint is configured.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config
            .mail_relay_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Self::new(url, config.mail_relay_token.clone()))
    }
}

#[async_trait]
impl MailRelay for HttpMailRelay {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), RelayError> {
        let mut request = self.client.post(&self.endpoint).json(mail);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::Delivery(e.to_string()))?;

        let status = response.status();
        match status {
            s if s.is_success() => {
                info!(to = %mail.to, "Contact mail relayed");
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(%status, "Mail relay rejected credentials");
                Err(RelayError::Authentication(status.to_string()))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(RelayError::Delivery(format!("status={status} body={body}")))
            }
        }
    }
}
