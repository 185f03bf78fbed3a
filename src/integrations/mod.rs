//! Outbound integrations that receive a submitted lead.
//!
//! Each notification integration is enabled by the presence of its secret.
//! They share one pooled `reqwest::Client` and never depend on each other.

pub mod email;
pub mod supabase;
pub mod tidycal;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::IntegrationError;
use crate::lead::Submission;

pub use email::{EmailApi, EmailStyle};
pub use supabase::{LeadRow, SupabaseLeads};
pub use tidycal::{BookingAnswer, BookingType, CreatedBooking, NewBooking, SchedulingClient};
pub use webhook::ZapierWebhook;

/// A successful delivery to one integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub status: u16,
    pub data: Option<Value>,
}

/// A downstream service that receives every accepted submission.
#[async_trait]
pub trait Integration: Send + Sync {
    /// Service identifier reported in the results list.
    fn name(&self) -> &'static str;

    /// Deliver the submission. Non-2xx responses are errors.
    async fn deliver(&self, submission: &Submission) -> Result<Delivery, IntegrationError>;
}

/// Build the notification integrations enabled by `config`.
pub fn from_config(config: &GatewayConfig, client: &reqwest::Client) -> Vec<Arc<dyn Integration>> {
    let mut integrations: Vec<Arc<dyn Integration>> = Vec::new();

    if let Some(ref resend) = config.resend {
        integrations.push(Arc::new(EmailApi::new(
            EmailStyle::Resend,
            resend.clone(),
            config.notification_email.clone(),
            client.clone(),
        )));
    }
    if let Some(ref url) = config.zapier_webhook {
        integrations.push(Arc::new(ZapierWebhook::new(url.clone(), client.clone())));
    }
    if let Some(ref emailit) = config.emailit {
        integrations.push(Arc::new(EmailApi::new(
            EmailStyle::EmailIt,
            emailit.clone(),
            config.notification_email.clone(),
            client.clone(),
        )));
    }
    if let Some(ref supabase) = config.supabase {
        integrations.push(Arc::new(SupabaseLeads::new(supabase.clone(), client.clone())));
    }

    integrations
}

/// Read a response body as JSON, falling back to `{}`.
///
/// Webhooks and some providers answer with plain text or nothing at all.
pub(crate) async fn read_json_lenient(response: reqwest::Response) -> Value {
    let bytes = response.bytes().await.unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or_else(|_| serde_json::json!({}))
}

/// Turn a provider response into a `Delivery`, or `Rejected` when non-2xx.
pub(crate) async fn into_delivery(
    service: &str,
    response: reqwest::Response,
    read_body: bool,
) -> Result<Delivery, IntegrationError> {
    let status = response.status();
    if !status.is_success() {
        let body = read_json_lenient(response).await;
        return Err(IntegrationError::Rejected {
            service: service.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    let data = if read_body {
        Some(read_json_lenient(response).await)
    } else {
        None
    };
    Ok(Delivery {
        status: status.as_u16(),
        data,
    })
}

pub(crate) fn request_failed(service: &str, err: reqwest::Error) -> IntegrationError {
    IntegrationError::RequestFailed {
        service: service.to_string(),
        reason: err.to_string(),
    }
}
