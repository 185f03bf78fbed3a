//! Notification message rendered once per submission.

use chrono::{DateTime, Utc};

use super::model::Lead;

/// The human-readable notification shared by every email integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl LeadMessage {
    pub fn render(lead: &Lead, received_at: DateTime<Utc>) -> Self {
        let body = lead
            .message
            .clone()
            .or_else(|| compose_details(lead))
            .unwrap_or_else(|| "No message provided".to_string());

        let text = format!(
            "New Submission from OpenClawMac.com!\n\n\
             Name: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Received: {}\n\n\
             Message:\n{}\n",
            lead.name,
            lead.email,
            lead.phone.as_deref().unwrap_or("N/A"),
            received_at.format("%Y-%m-%d %H:%M UTC"),
            body.trim(),
        );

        let html = escape_html(&text).replace('\n', "<br>");

        Self {
            subject: format!("New Lead: {}", lead.name),
            text,
            html,
        }
    }
}

/// Summarize the wizard's structured answers when no message was sent.
fn compose_details(lead: &Lead) -> Option<String> {
    let lines: Vec<String> = [
        ("Package", &lead.package),
        ("Mac", &lead.mac_model),
        ("Goals", &lead.goals),
        ("Timeline", &lead.timeline),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}: {v}")))
    .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
