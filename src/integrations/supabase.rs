//! Supabase REST insert into the `leads` table.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{Delivery, Integration, into_delivery, request_failed};
use crate::config::SupabaseConfig;
use crate::error::IntegrationError;
use crate::lead::{Lead, Submission};

/// One row of the `leads` table.
///
/// The booking endpoint only knows `name, email, phone, goals`, so the
/// device and package columns are omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRow {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub goals: Option<String>,
}

impl From<&Lead> for LeadRow {
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            mac_model: lead.mac_model.clone(),
            package: lead.package.clone(),
            goals: lead.goals.clone(),
        }
    }
}

pub struct SupabaseLeads {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseLeads {
    pub fn new(config: SupabaseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/leads", self.config.project_url)
    }

    /// Insert one row. The response body is not requested.
    pub async fn insert(&self, row: &LeadRow) -> Result<Delivery, IntegrationError> {
        let key = self.config.anon_key.expose_secret();
        let response = self
            .client
            .post(self.endpoint())
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| request_failed("supabase", e))?;

        into_delivery("supabase", response, false).await
    }
}

#[async_trait]
impl Integration for SupabaseLeads {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn deliver(&self, submission: &Submission) -> Result<Delivery, IntegrationError> {
        self.insert(&LeadRow::from(&submission.lead)).await
    }
}
