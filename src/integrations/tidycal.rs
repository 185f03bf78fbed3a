//! TidyCal scheduling API client.
//!
//! Unlike the notification integrations, failures here are surfaced to the
//! caller: a booking that was not created is the request's failure.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SchedulingConfig;
use crate::error::SchedulingError;

/// Question attached to booking notes.
pub const NOTES_QUESTION: &str = "What do you want OpenClaw to help with?";

/// Slim projection of a provider booking type returned to the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingType {
    /// Passed through as the provider sent it.
    pub id: Value,
    pub name: Option<String>,
    pub duration: Option<u32>,
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_page_url: Option<String>,
}

/// Booking type as the provider describes it. Extra fields are dropped.
#[derive(Debug, Deserialize)]
struct ProviderBookingType {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration_minutes: Option<u32>,
    #[serde(default)]
    url_slug: Option<String>,
    #[serde(default)]
    booking_page_url: Option<String>,
}

impl From<ProviderBookingType> for BookingType {
    fn from(t: ProviderBookingType) -> Self {
        Self {
            id: t.id,
            name: t.title,
            duration: t.duration_minutes,
            slug: t.url_slug,
            booking_page_url: t.booking_page_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderList {
    #[serde(default)]
    data: Option<Vec<ProviderBookingType>>,
}

impl ProviderList {
    /// A missing or null `data` is an empty list.
    fn into_booking_types(self) -> Vec<BookingType> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .map(BookingType::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingAnswer {
    pub question: String,
    pub answer: String,
}

/// Body of a provider booking creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub timezone: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<BookingAnswer>,
}

impl NewBooking {
    pub fn new(name: &str, email: &str, timezone: &str, notes: Option<&str>) -> Self {
        let answers = notes
            .filter(|n| !n.trim().is_empty())
            .map(|n| {
                vec![BookingAnswer {
                    question: NOTES_QUESTION.to_string(),
                    answer: n.to_string(),
                }]
            })
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            email: email.to_string(),
            timezone: timezone.to_string(),
            answers,
        }
    }
}

/// What the provider returned for a created booking.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedBooking {
    pub id: Option<Value>,
    pub booking_page_url: Option<String>,
}

pub struct SchedulingClient {
    api_key: SecretString,
    config: SchedulingConfig,
    client: reqwest::Client,
}

impl SchedulingClient {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &SchedulingConfig, client: reqwest::Client) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            config: config.clone(),
            client,
        })
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// `GET /booking-types`, projected to `BookingType`.
    pub async fn list_booking_types(&self) -> Result<Vec<BookingType>, SchedulingError> {
        let response = self
            .client
            .get(self.url("booking-types"))
            .bearer_auth(self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SchedulingError::Upstream {
                status: status.as_u16(),
                detail: Value::String(text),
            });
        }

        let list: ProviderList = response
            .json()
            .await
            .map_err(|e| SchedulingError::InvalidResponse(e.to_string()))?;
        Ok(list.into_booking_types())
    }

    /// `POST /booking-types/{id}/bookings`.
    pub async fn create_booking(
        &self,
        booking_type_id: u64,
        booking: &NewBooking,
    ) -> Result<CreatedBooking, SchedulingError> {
        let response = self
            .client
            .post(self.url(&format!("booking-types/{booking_type_id}/bookings")))
            .bearer_auth(self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(booking)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            // Keep the provider's detail verbatim, JSON when possible.
            let detail = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            return Err(SchedulingError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| SchedulingError::InvalidResponse(e.to_string()))?;
        let data = body.get("data");
        Ok(CreatedBooking {
            id: data.and_then(|d| d.get("id")).cloned(),
            booking_page_url: data
                .and_then(|d| d.get("booking_page_url"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}
