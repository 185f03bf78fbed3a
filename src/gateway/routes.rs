//! Router, shared state, and the lead submission endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, error, info};

use super::booking::{booking_preflight, create_booking, list_booking_types};
use super::extract::LeadFields;
use super::fanout::{IntegrationResult, Notifier};
use crate::config::GatewayConfig;
use crate::error::ApiError;
use crate::integrations::{self, SchedulingClient, SupabaseLeads};
use crate::lead::Submission;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Notifier,
    /// `None` when no scheduling API key is configured.
    pub scheduling: Option<Arc<SchedulingClient>>,
    /// Best-effort store used by the booking endpoint.
    pub lead_store: Option<Arc<SupabaseLeads>>,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let client = reqwest::Client::new();
        Self {
            notifier: Notifier::new(integrations::from_config(config, &client)),
            scheduling: SchedulingClient::from_config(&config.scheduling, client.clone())
                .map(Arc::new),
            lead_store: config
                .supabase
                .clone()
                .map(|c| Arc::new(SupabaseLeads::new(c, client.clone()))),
        }
    }
}

/// Build the gateway router.
pub fn gateway_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/submit", post(submit))
        .route(
            "/api/tidycal/book",
            post(create_booking).options(booking_preflight),
        )
        .route("/api/tidycal/types", get(list_booking_types))
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            ),
        )
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "lead-gateway",
        "integrations": state.notifier.names(),
        "scheduling": state.scheduling.is_some(),
    }))
}

// ── Submit ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub results: Vec<IntegrationResult>,
}

/// POST /api/submit
///
/// Answers 200 once the lead is valid, whatever the integrations did.
async fn submit(
    State(state): State<AppState>,
    LeadFields(fields): LeadFields,
) -> Result<Json<SubmitResponse>, ApiError> {
    let submission = Submission::from_fields(fields).map_err(|e| {
        debug!(error = %e, "Rejected lead submission");
        ApiError::from(e)
    })?;
    let submission_id = submission.id;
    info!(%submission_id, email = %submission.lead.email, "Lead received");

    let results = state.notifier.notify(submission).await.map_err(|e| {
        error!(%submission_id, error = %e, "Fan-out task failed");
        ApiError::Fault(e.to_string())
    })?;

    Ok(Json(SubmitResponse {
        success: true,
        message: "Message sent!",
        results,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        gateway_routes(AppState::from_config(&GatewayConfig::default()))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn minimal_lead_with_no_integrations() {
        let (status, body) = send(
            app(),
            post_json(
                "/api/submit",
                json!({"name": "Jane Doe", "email": "jane@example.com"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["results"], json!([]));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let (status, body) = send(
            app(),
            post_json("/api/submit", json!({"name": "", "email": "a@b.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Name and Email are required"}));
    }

    #[tokio::test]
    async fn missing_email_in_form_is_rejected() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/submit")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=Jane"))
            .unwrap();
        let (status, _) = send(app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\":"))
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    struct Panics;

    #[async_trait::async_trait]
    impl crate::integrations::Integration for Panics {
        fn name(&self) -> &'static str {
            "panics"
        }
        async fn deliver(
            &self,
            _submission: &Submission,
        ) -> Result<crate::integrations::Delivery, crate::error::IntegrationError> {
            panic!("integration bug")
        }
    }

    #[tokio::test]
    async fn fan_out_fault_is_a_bare_error_body() {
        let integrations: Vec<Arc<dyn crate::integrations::Integration>> = vec![Arc::new(Panics)];
        let state = AppState {
            notifier: Notifier::new(integrations),
            scheduling: None,
            lead_store: None,
        };
        let (status, body) = send(
            gateway_routes(state),
            post_json(
                "/api/submit",
                json!({"name": "Jane Doe", "email": "jane@example.com"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn health_lists_integrations() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["integrations"], json!([]));
        assert_eq!(body["scheduling"], false);
    }
}
