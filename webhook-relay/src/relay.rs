//! Concurrent fan-out of a notification to every configured destination.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info};

use crate::{
    config::MailConfig,
    mailer::{MailError, Mailer, OutboundEmail, ResendMailer},
    notification::Notification,
};

/// A named group of recipients reached through one mailer.
pub struct Destination {
    pub name: String,
    pub to: Vec<String>,
    pub mailer: Arc<dyn Mailer>,
}

/// Outcome of delivering to one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    pub destination: String,
    pub success: bool,
    pub id: Option<String>,
    pub error: Option<String>,
}

pub struct Relay {
    from: String,
    destinations: Vec<Destination>,
}

impl Relay {
    pub fn new(from: impl Into<String>, destinations: Vec<Destination>) -> Self {
        Self {
            from: from.into(),
            destinations,
        }
    }

    /// One [`ResendMailer`] per destination, sharing a single HTTP client.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let http = ResendMailer::http_client(config.timeout)?;
        let destinations = config
            .destinations
            .iter()
            .map(|d| Destination {
                name: d.name.clone(),
                to: d.to.clone(),
                mailer: Arc::new(ResendMailer::new(http.clone(), &config.api_url, &d.api_key)),
            })
            .collect();
        Ok(Self::new(config.from.clone(), destinations))
    }

    pub fn destination_names(&self) -> impl Iterator<Item = &str> {
        self.destinations.iter().map(|d| d.name.as_str())
    }

    /// Send to every destination concurrently and wait for all of them.
    ///
    /// Results come back in destination order; a failed send never hides the
    /// outcome of the others.
    pub async fn dispatch(&self, notification: &Notification) -> Vec<DeliveryResult> {
        let sends = self
            .destinations
            .iter()
            .map(|destination| self.deliver(destination, notification));
        join_all(sends).await
    }

    async fn deliver(&self, destination: &Destination, notification: &Notification) -> DeliveryResult {
        let email = OutboundEmail {
            from: self.from.clone(),
            to: destination.to.clone(),
            subject: notification.subject.clone(),
            html: notification.html.clone(),
        };

        match destination.mailer.send(&email).await {
            Ok(receipt) => {
                info!(destination = %destination.name, id = %receipt.id, "notification delivered");
                DeliveryResult {
                    destination: destination.name.clone(),
                    success: true,
                    id: Some(receipt.id),
                    error: None,
                }
            }
            Err(e) => {
                error!(destination = %destination.name, error = %e, "notification delivery failed");
                DeliveryResult {
                    destination: destination.name.clone(),
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::FakeMailer;

    fn notification() -> Notification {
        Notification {
            subject: "aIgrOT info".into(),
            html: "<p>hi</p>".into(),
        }
    }

    fn destination(name: &str, mailer: &FakeMailer) -> Destination {
        Destination {
            name: name.into(),
            to: vec![format!("{name}@example.com")],
            mailer: Arc::new(mailer.clone()),
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_every_destination_in_order() {
        let main = FakeMailer::new();
        let papa = FakeMailer::new();
        let relay = Relay::new(
            "onboarding@resend.dev",
            vec![destination("main", &main), destination("papa", &papa)],
        );

        let results = relay.dispatch(&notification()).await;

        assert_eq!(
            results.iter().map(|r| r.destination.as_str()).collect::<Vec<_>>(),
            vec!["main", "papa"]
        );
        assert!(results.iter().all(|r| r.success && r.error.is_none()));

        let sent = papa.snapshot();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["papa@example.com"]);
        assert_eq!(sent[0].from, "onboarding@resend.dev");
        assert_eq!(sent[0].subject, "aIgrOT info");
        assert_eq!(main.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn one_failure_does_not_hide_the_other() {
        let main = FakeMailer::failing("invalid api key");
        let papa = FakeMailer::new();
        let relay = Relay::new(
            "onboarding@resend.dev",
            vec![destination("main", &main), destination("papa", &papa)],
        );

        let results = relay.dispatch(&notification()).await;

        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("invalid api key"));
        assert!(results[1].success);
        assert_eq!(results[1].id.as_deref(), Some("fake-1"));
    }

    #[test]
    fn from_config_builds_one_destination_per_entry() {
        let config = MailConfig {
            api_url: "https://api.resend.com".into(),
            from: "onboarding@resend.dev".into(),
            timeout: std::time::Duration::from_secs(5),
            destinations: vec![
                crate::config::DestinationConfig {
                    name: "main".into(),
                    api_key: "re_main".into(),
                    to: vec!["a@example.com".into()],
                },
                crate::config::DestinationConfig {
                    name: "papa".into(),
                    api_key: "re_papa".into(),
                    to: vec!["b@example.com".into()],
                },
            ],
        };

        let relay = Relay::from_config(&config).unwrap();
        assert_eq!(relay.destination_names().collect::<Vec<_>>(), vec!["main", "papa"]);
    }
}
