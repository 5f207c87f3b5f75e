//! Mail delivery client.

use async_trait::async_trait;
use tracing::info;

use siteship_core::notify::{Notification, Notifier};
use siteship_core::{Error, Result};

/// Posts notifications to the platform mail endpoint.
///
/// Without a configured endpoint it logs the notification and reports
/// success, so development setups work without a mail service.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpNotifier {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let Some(endpoint) = &self.endpoint else {
            info!(
                to = %notification.to,
                subject = %notification.subject,
                "mail disabled, skipping notification"
            );
            return Ok(());
        };

        let response = self
            .client
            .post(endpoint)
            .json(notification)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("mail request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "mail delivery failed ({}): {}",
                status, text
            )));
        }
        Ok(())
    }
}
