//! The `Lead` value object and its boundary validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A validated lead. Constructing one guarantees non-empty name and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    /// Free-form message block composed by the wizard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// False for the background capture sent after the contact step.
    #[serde(default = "default_true")]
    pub is_final: bool,
}

fn default_true() -> bool {
    true
}

/// Minimal syntactic email check shared by the wizard and the gateway.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.contains('@')
}

impl Lead {
    /// Build a lead with only the required fields.
    pub fn new(name: &str, email: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        if !is_plausible_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            mac_model: None,
            package: None,
            goals: None,
            timeline: None,
            message: None,
            is_final: true,
        })
    }

    /// Validate a loosely-typed field map (decoded form or JSON body).
    ///
    /// Both `macModel` and `mac_model` spellings are accepted.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationError> {
        let name = field(fields, &["name"]).unwrap_or_default();
        let email = field(fields, &["email"]).unwrap_or_default();
        let mut lead = Self::new(&name, &email)?;

        lead.phone = field(fields, &["phone"]);
        lead.mac_model = field(fields, &["macModel", "mac_model"]);
        lead.package = field(fields, &["package"]);
        lead.goals = field(fields, &["goals"]);
        lead.timeline = field(fields, &["timeline"]);
        lead.message = field(fields, &["message"]);
        lead.is_final = field(fields, &["is_final", "isFinal"])
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Ok(lead)
    }
}

/// First non-empty value among `keys`, rendered as trimmed text.
fn field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
