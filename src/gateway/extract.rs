//! Body extractor accepting multipart, urlencoded or JSON lead submissions.

use axum::Form;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::error::{ApiError, ValidationError};

/// Submitted fields, decoded but not yet validated.
///
/// Repeated keys keep the last value.
#[derive(Debug, Clone, Default)]
pub struct LeadFields(pub Map<String, Value>);

fn malformed(err: impl std::fmt::Display) -> ApiError {
    ValidationError::MalformedBody(err.to_string()).into()
}

impl<S> FromRequest<S> for LeadFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state).await.map_err(malformed)?;
            let mut fields = Map::new();
            while let Some(field) = multipart.next_field().await.map_err(malformed)? {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field.text().await.map_err(malformed)?;
                fields.insert(name, Value::String(value));
            }
            return Ok(Self(fields));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(malformed)?;
            let fields = pairs
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            return Ok(Self(fields));
        }

        // Anything else is treated as JSON, which must be an object.
        let body = Bytes::from_request(req, state).await.map_err(malformed)?;
        match serde_json::from_slice::<Value>(&body).map_err(malformed)? {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(malformed(format!("expected a JSON object, got {other}"))),
        }
    }
}
