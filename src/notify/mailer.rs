// src/notify/mailer.rs
// Outbound mail delivery

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTemplate {
    FirstAdoptionConfirmation,
    SecondAdoptionConfirmation,
}

impl std::fmt::Display for MailTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailTemplate::FirstAdoptionConfirmation => write!(f, "first_adoption_confirmation"),
            MailTemplate::SecondAdoptionConfirmation => write!(f, "second_adoption_confirmation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: Vec<String>,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub template: MailTemplate,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail API error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Records every delivered message; `deliveries()` exposes them in send order.
///
/// After `reject_deliveries`, every `deliver` fails with `MailError::Rejected`
/// and nothing is recorded.
#[derive(Default)]
pub struct MemoryMailer {
    deliveries: Mutex<Vec<MailMessage>>,
    rejection: Mutex<Option<String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reject_deliveries(&self, reason: impl Into<String>) {
        *self.rejection.lock().await = Some(reason.into());
    }

    pub async fn deliveries(&self) -> Vec<MailMessage> {
        self.deliveries.lock().await.clone()
    }

    pub async fn last(&self) -> Option<MailMessage> {
        self.deliveries.lock().await.last().cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn deliver(&self, message: MailMessage) -> Result<(), MailError> {
        if let Some(reason) = self.rejection.lock().await.clone() {
            return Err(MailError::Rejected(reason));
        }
        self.deliveries.lock().await.push(message);
        Ok(())
    }
}

/// Writes messages to the log instead of sending them. Development default.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn deliver(&self, message: MailMessage) -> Result<(), MailError> {
        info!(
            to = ?message.to,
            template = %message.template,
            "Mail (not sent): {}",
            message.subject
        );
        Ok(())
    }
}

/// Posts messages as JSON to a transactional mail API.
pub struct HttpMailer {
    endpoint: String,
    api_key: Option<String>,
    http_client: Client,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, MailError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            http_client,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn deliver(&self, message: MailMessage) -> Result<(), MailError> {
        let mut request = self.http_client.post(&self.endpoint).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("{status}: {body}")));
        }

        info!(to = ?message.to, template = %message.template, "Mail sent");
        Ok(())
    }
}
