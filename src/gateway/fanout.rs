//! Settle-all fan-out of one submission to every notification integration.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::error::IntegrationError;
use crate::integrations::{Delivery, Integration};
use crate::lead::Submission;

/// Outcome of one integration, as reported to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationResult {
    pub service: String,
    /// `None` when no HTTP response was received.
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntegrationResult {
    pub fn from_outcome(service: &str, outcome: Result<Delivery, IntegrationError>) -> Self {
        match outcome {
            Ok(delivery) => Self {
                service: service.to_string(),
                status: Some(delivery.status),
                data: delivery.data,
                error: None,
            },
            Err(err) => {
                let (status, data) = match &err {
                    IntegrationError::Rejected { status, body, .. } => {
                        (Some(*status), Some(body.clone()))
                    }
                    IntegrationError::RequestFailed { .. } => (None, None),
                };
                Self {
                    service: service.to_string(),
                    status,
                    data,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Dispatches submissions to the configured notification integrations.
#[derive(Clone)]
pub struct Notifier {
    integrations: Arc<[Arc<dyn Integration>]>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Notifier {
    pub fn new(integrations: Vec<Arc<dyn Integration>>) -> Self {
        Self {
            integrations: integrations.into(),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.integrations.iter().map(|i| i.name()).collect()
    }

    /// Fan the submission out on a detached task and wait for every result.
    ///
    /// The task keeps running if the caller is dropped (client disconnect).
    /// A `JoinError` means an integration panicked.
    pub async fn notify(&self, submission: Submission) -> Result<Vec<IntegrationResult>, JoinError> {
        let integrations = Arc::clone(&self.integrations);
        tokio::spawn(async move { settle_all(&integrations, &submission).await }).await
    }
}

/// Deliver to all integrations concurrently; results keep the input order.
pub async fn settle_all(
    integrations: &[Arc<dyn Integration>],
    submission: &Submission,
) -> Vec<IntegrationResult> {
    info!(
        submission_id = %submission.id,
        integrations = integrations.len(),
        is_final = submission.lead.is_final,
        "Fanning out lead"
    );

    let deliveries = integrations.iter().map(|integration| async move {
        let outcome = integration.deliver(submission).await;
        IntegrationResult::from_outcome(integration.name(), outcome)
    });
    let results = join_all(deliveries).await;

    for result in &results {
        if result.is_success() {
            debug!(submission_id = %submission.id, service = %result.service, status = ?result.status, "Integration delivered");
        } else {
            warn!(
                submission_id = %submission.id,
                service = %result.service,
                status = ?result.status,
                error = result.error.as_deref().unwrap_or_default(),
                "Integration failed"
            );
        }
    }

    results
}
