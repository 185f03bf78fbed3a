//! Scheduling endpoints: create a booking, list booking types.
//!
//! The provider call is load-bearing here. The accompanying database insert
//! runs on its own task and its outcome never reaches the client.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL,
};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::routes::AppState;
use crate::error::{ApiError, SchedulingError, ValidationError};
use crate::integrations::{LeadRow, NewBooking};
use crate::lead::Lead;

/// Client-side cache lifetime for the booking-types list.
pub const BOOKING_TYPES_MAX_AGE_SECS: u32 = 300;

/// Body of `POST /api/tidycal/book`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// A number or a numeric string; `0`, `""` and `null` mean the default.
    #[serde(default, deserialize_with = "booking_type_id")]
    pub booking_type_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub goals: Option<String>,
}

impl BookingRequest {
    /// Validated contact details plus the notes/goals used for the lead row.
    fn lead(&self) -> Result<Lead, ApiError> {
        let mut lead = Lead::new(
            self.name.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
        )
        .map_err(|e| match e {
            ValidationError::MissingRequired => {
                ApiError::BadRequest("name and email are required".into())
            }
            other => ApiError::from(other),
        })?;
        lead.phone = non_blank(&self.phone);
        lead.goals = non_blank(&self.notes).or_else(|| non_blank(&self.goals));
        Ok(lead)
    }
}

fn booking_type_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("bookingTypeId must be a positive integer")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "bookingTypeId must be a number, got {other}"
        ))),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn upstream_error(error: &'static str, err: SchedulingError) -> ApiError {
    match err {
        SchedulingError::Upstream { status, detail } => ApiError::Upstream {
            error,
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            detail,
        },
        other => ApiError::Internal(other.to_string()),
    }
}

/// POST /api/tidycal/book
pub async fn create_booking(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(scheduler) = state.scheduling.clone() else {
        warn!("Booking requested but no scheduling API key is configured");
        return Err(ApiError::MissingApiKey);
    };

    let request: BookingRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON body".into()))?;
    let lead = request.lead()?;

    let config = scheduler.config();
    let booking_type_id = request
        .booking_type_id
        .filter(|id| *id != 0)
        .unwrap_or(config.default_booking_type);
    let timezone = non_blank(&request.timezone).unwrap_or_else(|| config.default_timezone.clone());
    let fallback_url = config.fallback_booking_url.clone();
    let booking = NewBooking::new(&lead.name, &lead.email, &timezone, request.notes.as_deref());

    if let Some(store) = state.lead_store.clone() {
        let row = LeadRow::from(&lead);
        tokio::spawn(async move {
            match store.insert(&row).await {
                Ok(delivery) => debug!(status = delivery.status, "Booking lead stored"),
                Err(e) => warn!(error = %e, "Booking lead insert failed"),
            }
        });
    }

    info!(booking_type_id, email = %lead.email, "Creating booking");
    let created = tokio::spawn(async move { scheduler.create_booking(booking_type_id, &booking).await })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            warn!(error = %e, "Booking creation failed");
            upstream_error("TidyCal booking failed", e)
        })?;

    let booking_url = created.booking_page_url.unwrap_or(fallback_url);
    Ok((
        [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(serde_json::json!({
            "success": true,
            "booking_url": booking_url,
            "booking_id": created.id,
        })),
    )
        .into_response())
}

/// OPTIONS /api/tidycal/book
pub async fn booking_preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// GET /api/tidycal/types
pub async fn list_booking_types(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Some(scheduler) = state.scheduling.clone() else {
        return Err(ApiError::MissingApiKey);
    };

    let types = scheduler
        .list_booking_types()
        .await
        .map_err(|e| {
            warn!(error = %e, "Listing booking types failed");
            upstream_error("TidyCal API error", e)
        })?;

    let cache_control = format!("public, max-age={BOOKING_TYPES_MAX_AGE_SECS}");
    Ok((
        [
            (CACHE_CONTROL, cache_control),
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
        ],
        Json(serde_json::json!({ "data": types })),
    )
        .into_response())
}
