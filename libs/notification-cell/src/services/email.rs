use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::error::NotificationError;

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

/// Sends transactional email through the Resend HTTP API.
pub struct EmailClient {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.resend_base_url.trim_end_matches('/').to_string(),
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.from.is_empty()
    }

    /// Returns the provider's message id.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<String, NotificationError> {
        if !self.is_configured() {
            return Err(NotificationError::EmailNotConfigured);
        }

        debug!("Sending email to {}", to);

        let response = self.client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [to],
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Email API error ({}): {}", status, body);
            return Err(NotificationError::Upstream(format!("email API returned {}: {}", status, body)));
        }

        let sent: ResendResponse = response.json().await?;
        info!("Email {} sent to {}", sent.id, to);
        Ok(sent.id)
    }
}
