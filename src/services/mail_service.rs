use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::MailConfig;
use crate::errors::{AppError, Result};

/// Delivery capability injected into the reset flow. The orchestrator only
/// ever sees this trait, so tests swap in a recording double.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_otp(&self, email: &str, code: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct EmailService {
    config: MailConfig,
    client: Client,
}

impl EmailService {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MailSender for EmailService {
    async fn send_otp(&self, email: &str, code: &str) -> Result<()> {
        let body = json!({
            "from": self.config.from,
            "to": [email],
            "subject": "Your Password Reset OTP",
            "html": format!(
                "<p>Use this OTP to reset your password:</p><h2>{}</h2>\
                 <p><em>Expires in 10 minutes.</em></p>",
                code
            ),
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::delivery(format!("mail API error: {}", e)))?;

        if response.status().is_success() {
            tracing::info!("OTP email sent to {}", email);
            Ok(())
        } else {
            Err(AppError::delivery(format!(
                "mail API responded with status {}",
                response.status()
            )))
        }
    }
}
