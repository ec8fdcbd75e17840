//! Outbound notification mail.
//!
//! Messages go to an HTTP mail relay when one is configured and to the log
//! otherwise. A relay failure also writes the message to the log so nothing
//! is lost, then reports the failure to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::Config;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery failure from a mail channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryError(pub String);

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "delivery failed: {}", self.0)
    }
}

impl std::error::Error for DeliveryError {}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError>;
}

/// Writes messages to the log.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email (console)\n{}",
            message.body
        );
        Ok(())
    }
}

/// POSTs each message as JSON to a mail relay.
pub struct WebhookMailer {
    client: Client,
    url: String,
}

impl WebhookMailer {
    pub fn new(url: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DeliveryError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError(format!("mail relay unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError(format!("mail relay returned {}", status)));
        }
        tracing::debug!(to = %message.to, "Email handed to relay");
        Ok(())
    }
}

/// Primary channel with a console fallback.
pub struct FallbackMailer {
    primary: Option<Box<dyn Mailer>>,
    console: ConsoleMailer,
}

impl FallbackMailer {
    pub fn new(primary: Option<Box<dyn Mailer>>) -> Self {
        Self {
            primary,
            console: ConsoleMailer,
        }
    }
}

#[async_trait]
impl Mailer for FallbackMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let Some(primary) = &self.primary else {
            return self.console.send(message).await;
        };

        match primary.send(message).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(to = %message.to, error = %e, "Email delivery failed, writing to console");
                self.console.send(message).await?;
                Err(e)
            }
        }
    }
}

/// Build the mailer described by the configuration.
pub fn mailer_from_config(config: &Config) -> FallbackMailer {
    let primary = match config.mail_webhook_url.as_deref() {
        Some(url) => match WebhookMailer::new(url) {
            Ok(mailer) => Some(Box::new(mailer) as Box<dyn Mailer>),
            Err(e) => {
                tracing::warn!(error = %e, "Mail relay disabled");
                None
            }
        },
        None => None,
    };
    FallbackMailer::new(primary)
}
