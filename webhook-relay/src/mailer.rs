//! Mailer trait and implementations.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------ //
//  Domain types                                                       //
// ------------------------------------------------------------------ //

/// A message ready to hand to the provider. Serialises as the Resend
/// `POST /emails` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SendReceipt {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

// ------------------------------------------------------------------ //
//  Trait                                                              //
// ------------------------------------------------------------------ //

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError>;
}

// ------------------------------------------------------------------ //
//  FakeMailer (for tests)                                             //
// ------------------------------------------------------------------ //

/// In-memory mailer that records every message for test assertions.
#[derive(Debug, Default, Clone)]
pub struct FakeMailer {
    pub sent: Arc<Mutex<Vec<OutboundEmail>>>,
    /// When set, every send is rejected with this message.
    pub fail_with: Option<String>,
}

impl FakeMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Non-destructive snapshot of the messages sent so far.
    pub fn snapshot(&self) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        if let Some(message) = &self.fail_with {
            return Err(MailError::Rejected {
                status: 503,
                message: message.clone(),
            });
        }

        let mut sent = self
            .sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sent.push(email.clone());
        Ok(SendReceipt {
            id: format!("fake-{}", sent.len()),
        })
    }
}

// ------------------------------------------------------------------ //
//  ResendMailer (production)                                          //
// ------------------------------------------------------------------ //

#[derive(Deserialize)]
struct ResendErrorBody {
    message: String,
}

/// Sends through the Resend HTTP API with one account's API key.
pub struct ResendMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ResendMailer {
    /// HTTP client shared by every destination; carries the request timeout.
    pub fn http_client(timeout: Duration) -> Result<reqwest::Client, MailError> {
        Ok(reqwest::Client::builder().timeout(timeout).build()?)
    }

    pub fn new(http: reqwest::Client, api_url: &str, api_key: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        let url = format!("{}/emails", self.api_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ResendErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<SendReceipt>().await?)
    }
}
