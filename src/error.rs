//! Error types for the lead gateway.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),

    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A lead that failed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name and Email are required")]
    MissingRequired,

    #[error("A valid email address is required")]
    InvalidEmail,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// Failure of a single downstream notification integration.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("{service} request failed: {reason}")]
    RequestFailed { service: String, reason: String },

    #[error("{service} responded with HTTP {status}")]
    Rejected {
        service: String,
        status: u16,
        body: Value,
    },
}

/// Scheduling provider errors.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Scheduling provider responded with HTTP {status}")]
    Upstream { status: u16, detail: Value },

    #[error("Scheduling provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from scheduling provider: {0}")]
    InvalidResponse(String),
}

/// Wizard answer persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Saved answers are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Booking wizard errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step {step} is incomplete: {reason}")]
    StepIncomplete { step: String, reason: String },

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("{value} is not an option for {field}")]
    UnknownOption { field: String, value: String },

    #[error("Submission is only possible from the review step")]
    NotReadyToSubmit,

    #[error("Submission failed: {reason}")]
    SubmissionFailed { reason: String, fallback_url: String },
}

/// Failure posting a lead from the wizard to the gateway.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway rejected the submission (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Result type alias for the gateway.
pub type Result<T> = std::result::Result<T, Error>;

/// An error surfaced to HTTP clients as a JSON body.
///
/// Bodies are `{"error": ...}` or `{"error": ..., "detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    MissingApiKey,
    /// Unexpected fault reported as a bare `{"error": message}`.
    Fault(String),
    Upstream {
        error: &'static str,
        status: StatusCode,
        detail: Value,
    },
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingApiKey | Self::Fault(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream { status, .. } => *status,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MalformedBody(_) => Self::BadRequest("Invalid request body".into()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(message) => serde_json::json!({ "error": message }),
            Self::MissingApiKey => serde_json::json!({ "error": "Missing API key" }),
            Self::Fault(message) => serde_json::json!({ "error": message }),
            Self::Upstream { error, detail, .. } => {
                serde_json::json!({ "error": error, "detail": detail })
            }
            Self::Internal(detail) => {
                serde_json::json!({ "error": "Internal error", "detail": detail })
            }
        };
        (status, Json(body)).into_response()
    }
}
