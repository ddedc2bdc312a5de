use std::sync::Arc;

use anyhow::Context;
use axum::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::MailConfig;

/// Outbound email. Delivery is an external collaborator's concern; the core
/// only ever talks to this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct RelayMailer {
    client: reqwest::Client,
    endpoint: String,
    from: String,
}

impl RelayMailer {
    pub fn new(endpoint: &str, from: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            from: from.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, to: &str, subject: &str, text: &str) -> anyhow::Result<()> {
        self.client
            .post(&self.endpoint)
            .json(&RelayMessage {
                from: &self.from,
                to,
                subject,
                text,
            })
            .send()
            .await
            .context("mail relay request")?
            .error_for_status()
            .context("mail relay response")?;
        Ok(())
    }
}

/// Logs outgoing mail instead of delivering it. Used when no relay is
/// configured and in tests.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _text: &str) -> anyhow::Result<()> {
        info!(%to, %subject, "no mail relay configured; logging email instead");
        Ok(())
    }
}

pub fn from_config(cfg: &MailConfig) -> Arc<dyn Mailer> {
    match &cfg.relay_url {
        Some(url) => Arc::new(RelayMailer::new(url, &cfg.from_address)),
        None => Arc::new(LogMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        mailer
            .send("a@example.com", "subject", "body")
            .await
            .expect("log mailer never fails");
    }

    #[test]
    fn relay_message_serializes_all_fields() {
        let msg = RelayMessage {
            from: "no-reply@kinship.local",
            to: "a@example.com",
            subject: "hi",
            text: "body",
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["from"], "no-reply@kinship.local");
        assert_eq!(json["to"], "a@example.com");
        assert_eq!(json["subject"], "hi");
        assert_eq!(json["text"], "body");
    }
}
