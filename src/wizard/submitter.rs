//! Posting wizard answers to the gateway.

use async_trait::async_trait;
use serde::Deserialize;

use super::answers::LeadAnswers;
use crate::error::SubmitError;

/// Gateway acknowledgement of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Vec<ReceiptEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceiptEntry {
    pub service: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Delivers an answer set to the submission gateway.
#[async_trait]
pub trait LeadSubmitter: Send + Sync {
    async fn submit(
        &self,
        answers: &LeadAnswers,
        is_final: bool,
    ) -> Result<SubmitReceipt, SubmitError>;
}

/// Posts multipart form data to `<base>/api/submit`.
pub struct HttpSubmitter {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSubmitter {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            endpoint: format!("{}/api/submit", base_url.trim_end_matches('/')),
            client,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[async_trait]
impl LeadSubmitter for HttpSubmitter {
    async fn submit(
        &self,
        answers: &LeadAnswers,
        is_final: bool,
    ) -> Result<SubmitReceipt, SubmitError> {
        let form = answers
            .to_form_fields(is_final)
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (key, value)| {
                form.text(key, value)
            });

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
