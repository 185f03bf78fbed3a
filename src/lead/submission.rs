//! One accepted submission, built once and shared by every integration.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::message::LeadMessage;
use super::model::Lead;
use crate::error::ValidationError;

#[derive(Debug, Clone)]
pub struct Submission {
    /// Correlates log lines for this submission.
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub lead: Lead,
    pub message: LeadMessage,
    /// The fields exactly as submitted, for pass-through integrations.
    pub fields: Map<String, Value>,
}

impl Submission {
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, ValidationError> {
        let lead = Lead::from_fields(&fields)?;
        let received_at = Utc::now();
        let message = LeadMessage::render(&lead, received_at);
        Ok(Self {
            id: Uuid::new_v4(),
            received_at,
            lead,
            message,
            fields,
        })
    }
}
