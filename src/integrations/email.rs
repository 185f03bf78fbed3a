//! Transactional email providers (Resend, EmailIt).

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::{Delivery, Integration, into_delivery, request_failed};
use crate::config::EmailApiConfig;
use crate::error::IntegrationError;
use crate::lead::Submission;

/// Request shape expected by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStyle {
    /// `to` is an array, plain text body.
    Resend,
    /// `to` is a single address, HTML and text bodies.
    EmailIt,
}

impl EmailStyle {
    fn service(self) -> &'static str {
        match self {
            Self::Resend => "resend",
            Self::EmailIt => "emailit",
        }
    }
}

/// Sends the lead notification through a bearer-authenticated email API.
pub struct EmailApi {
    style: EmailStyle,
    config: EmailApiConfig,
    recipient: String,
    client: reqwest::Client,
}

impl EmailApi {
    pub fn new(
        style: EmailStyle,
        config: EmailApiConfig,
        recipient: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            style,
            config,
            recipient,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.config.base_url.trim_end_matches('/'))
    }

    fn payload(&self, submission: &Submission) -> serde_json::Value {
        let message = &submission.message;
        match self.style {
            EmailStyle::Resend => serde_json::json!({
                "from": self.config.from,
                "to": [self.recipient],
                "subject": message.subject,
                "text": message.text,
            }),
            EmailStyle::EmailIt => serde_json::json!({
                "from": self.config.from,
                "to": self.recipient,
                "subject": message.subject,
                "html": message.html,
                "text": message.text,
            }),
        }
    }
}

#[async_trait]
impl Integration for EmailApi {
    fn name(&self) -> &'static str {
        self.style.service()
    }

    async fn deliver(&self, submission: &Submission) -> Result<Delivery, IntegrationError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.payload(submission))
            .send()
            .await
            .map_err(|e| request_failed(self.name(), e))?;

        into_delivery(self.name(), response, true).await
    }
}
