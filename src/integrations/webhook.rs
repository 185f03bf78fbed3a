//! Zapier catch hook. Forwards the submitted fields unchanged.

use async_trait::async_trait;

use super::{Delivery, Integration, into_delivery, request_failed};
use crate::error::IntegrationError;
use crate::lead::Submission;

pub struct ZapierWebhook {
    url: String,
    client: reqwest::Client,
}

impl ZapierWebhook {
    pub fn new(url: String, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl Integration for ZapierWebhook {
    fn name(&self) -> &'static str {
        "zapier"
    }

    async fn deliver(&self, submission: &Submission) -> Result<Delivery, IntegrationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&submission.fields)
            .send()
            .await
            .map_err(|e| request_failed(self.name(), e))?;

        into_delivery(self.name(), response, true).await
    }
}
