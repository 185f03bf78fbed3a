//! Integration tests for the lead gateway HTTP contract.
//!
//! Each test spins up the real router on a random port next to a stub
//! provider server that records every request it receives, then talks to
//! the gateway over HTTP with reqwest.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use lead_gateway::config::{EmailApiConfig, GatewayConfig, SupabaseConfig};
use lead_gateway::gateway::{AppState, gateway_routes};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// One request seen by the stub provider.
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    auth: Option<String>,
    body: Value,
}

/// Stub for every third-party API the gateway talks to.
#[derive(Clone)]
struct Stub {
    booking_status: StatusCode,
    booking_body: Value,
    /// Non-OK status and text body for the booking-types list, if any.
    types_failure: Option<(StatusCode, &'static str)>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    fn new() -> Self {
        Self {
            booking_status: StatusCode::CREATED,
            booking_body: json!({
                "data": {"id": 991, "booking_page_url": "https://tidycal.com/booking/991"}
            }),
            types_failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing_bookings(status: StatusCode, body: Value) -> Self {
        Self {
            booking_status: status,
            booking_body: body,
            ..Self::new()
        }
    }

    fn failing_types(status: StatusCode, body: &'static str) -> Self {
        Self {
            types_failure: Some((status, body)),
            ..Self::new()
        }
    }

    fn seen(&self, path: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

async fn provider(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    stub.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        auth: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    match (method, path.as_str()) {
        (Method::POST, "/resend/emails") => Json(json!({"id": "email_1"})).into_response(),
        (Method::POST, "/hooks/zapier") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "zap down").into_response()
        }
        (Method::POST, "/rest/v1/leads") => StatusCode::CREATED.into_response(),
        (Method::GET, "/tidycal/booking-types") => match stub.types_failure {
            Some(failure) => failure.into_response(),
            None => Json(json!({
                "data": [
                    {"id": 1, "title": "Intro call", "duration_minutes": 15, "url_slug": "intro", "price": 0},
                    {"id": 2, "title": "Setup", "duration_minutes": 60, "url_slug": "setup", "private": false},
                    {"id": 3, "title": "Team", "duration_minutes": 90, "url_slug": "team",
                     "booking_page_url": "https://tidycal.com/team"}
                ]
            }))
            .into_response(),
        },
        (Method::POST, p) if p.starts_with("/tidycal/booking-types/") => {
            (stub.booking_status, Json(stub.booking_body.clone())).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{port}")
}

/// Start the stub provider, return its base URL.
async fn start_stub(stub: Stub) -> String {
    serve(Router::new().fallback(provider).with_state(stub)).await
}

/// Start the gateway with `config`, return its base URL.
async fn start_gateway(config: GatewayConfig) -> String {
    let base = serve(gateway_routes(AppState::from_config(&config))).await;
    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;
    base
}

/// Scheduling plus the booking-side lead store, both pointed at the stub.
fn scheduling_config(stub_base: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.scheduling.api_key = Some(SecretString::from("tidy-test-key"));
    config.scheduling.base_url = format!("{stub_base}/tidycal");
    config.supabase = Some(SupabaseConfig {
        project_url: stub_base.to_string(),
        anon_key: SecretString::from("anon-test-key"),
    });
    config
}

async fn body_of(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

// ── Submit ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_without_integrations_succeeds() {
    timeout(TEST_TIMEOUT, async {
        let gateway = start_gateway(GatewayConfig::default()).await;
        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/submit"))
            .json(&json!({"name": "Jane Doe", "email": "jane@example.com"}))
            .send()
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Message sent!");
        assert_eq!(body["results"], json!([]));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submit_with_empty_name_is_400() {
    timeout(TEST_TIMEOUT, async {
        let gateway = start_gateway(GatewayConfig::default()).await;
        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/submit"))
            .form(&[("name", ""), ("email", "a@b.com")])
            .send()
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "Name and Email are required"}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn one_failing_integration_does_not_hide_the_other() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new();
        let stub_base = start_stub(stub.clone()).await;

        let mut config = GatewayConfig::default();
        config.resend = Some(EmailApiConfig {
            api_key: SecretString::from("re_test"),
            base_url: format!("{stub_base}/resend"),
            from: "Site <noreply@example.com>".into(),
        });
        config.zapier_webhook = Some(format!("{stub_base}/hooks/zapier"));
        let gateway = start_gateway(config).await;

        let form = reqwest::multipart::Form::new()
            .text("name", "Jane Doe")
            .text("email", "jane@example.com")
            .text("macModel", "Mac mini")
            .text("goals", "Automate my inbox");
        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/submit"))
            .multipart(form)
            .send()
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 200);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0]["service"], "resend");
        assert_eq!(results[0]["status"], 200);
        assert_eq!(results[0]["data"]["id"], "email_1");

        assert_eq!(results[1]["service"], "zapier");
        assert_eq!(results[1]["status"], 500);
        assert!(results[1]["error"].is_string());

        let emails = stub.seen("/resend/emails");
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].auth.as_deref(), Some("Bearer re_test"));
        assert_eq!(emails[0].body["subject"], "New Lead: Jane Doe");
        assert!(
            emails[0].body["text"]
                .as_str()
                .unwrap()
                .contains("Mac: Mac mini")
        );

        // The webhook receives the submitted fields as-is.
        let hooks = stub.seen("/hooks/zapier");
        assert_eq!(hooks[0].body["macModel"], "Mac mini");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_integration_reports_no_status() {
    timeout(TEST_TIMEOUT, async {
        // Bind then drop to get a port nobody listens on.
        let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_port = dead.local_addr().unwrap().port();
        drop(dead);

        let mut config = GatewayConfig::default();
        config.zapier_webhook = Some(format!("http://127.0.0.1:{dead_port}/hook"));
        let gateway = start_gateway(config).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/submit"))
            .json(&json!({"name": "Jane", "email": "jane@example.com"}))
            .send()
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 200);
        assert_eq!(body["results"][0]["service"], "zapier");
        assert!(body["results"][0]["status"].is_null());
        assert!(body["results"][0]["error"].is_string());
    })
    .await
    .expect("test timed out");
}

// ── Booking ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn booking_returns_provider_id_and_url() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new();
        let stub_base = start_stub(stub.clone()).await;
        let gateway = start_gateway(scheduling_config(&stub_base)).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/tidycal/book"))
            .json(&json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "notes": "Help with my calendar",
                "timezone": "Europe/Berlin"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        let (status, body) = body_of(response).await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["booking_id"], 991);
        assert_eq!(body["booking_url"], "https://tidycal.com/booking/991");

        // Default booking type is used when the client sends none.
        let bookings = stub.seen("/tidycal/booking-types/1756759/bookings");
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].auth.as_deref(), Some("Bearer tidy-test-key"));
        assert_eq!(bookings[0].body["timezone"], "Europe/Berlin");
        assert_eq!(
            bookings[0].body["answers"][0]["answer"],
            "Help with my calendar"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn booking_also_stores_the_lead() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new();
        let stub_base = start_stub(stub.clone()).await;
        let gateway = start_gateway(scheduling_config(&stub_base)).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/tidycal/book"))
            .json(&json!({
                "bookingTypeId": 42,
                "name": "Jane Doe",
                "email": "jane@example.com",
                "phone": "512-555-0137",
                "goals": "Set up agents"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(stub.seen("/tidycal/booking-types/42/bookings").len(), 1);

        // The insert runs on its own task; poll until it lands.
        let row = loop {
            if let Some(r) = stub.seen("/rest/v1/leads").pop() {
                break r;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        };
        assert_eq!(row.method, Method::POST);
        assert_eq!(row.auth.as_deref(), Some("Bearer anon-test-key"));
        assert_eq!(
            row.body,
            json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "phone": "512-555-0137",
                "goals": "Set up agents"
            })
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn provider_failure_is_propagated_even_when_store_succeeds() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::failing_bookings(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"message": "The email must be a valid email address."}),
        );
        let stub_base = start_stub(stub.clone()).await;
        let gateway = start_gateway(scheduling_config(&stub_base)).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/tidycal/book"))
            .json(&json!({"name": "Jane", "email": "jane@example"}))
            .send()
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 422);
        assert_eq!(body["error"], "TidyCal booking failed");
        assert_eq!(
            body["detail"]["message"],
            "The email must be a valid email address."
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn booking_without_contact_is_400() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new();
        let stub_base = start_stub(stub.clone()).await;
        let gateway = start_gateway(scheduling_config(&stub_base)).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/tidycal/book"))
            .json(&json!({"email": "jane@example.com"}))
            .send()
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "name and email are required");
        assert!(stub.requests.lock().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn booking_without_api_key_is_500() {
    timeout(TEST_TIMEOUT, async {
        let gateway = start_gateway(GatewayConfig::default()).await;
        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/tidycal/book"))
            .json(&json!({"name": "Jane", "email": "jane@example.com"}))
            .send()
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "Missing API key"}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn booking_preflight_is_204() {
    timeout(TEST_TIMEOUT, async {
        let gateway = start_gateway(GatewayConfig::default()).await;
        let response = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, format!("{gateway}/api/tidycal/book"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 204);
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        assert_eq!(header("access-control-allow-origin").as_deref(), Some("*"));
        assert_eq!(
            header("access-control-allow-methods").as_deref(),
            Some("POST, OPTIONS")
        );
        assert_eq!(
            header("access-control-allow-headers").as_deref(),
            Some("Content-Type")
        );
    })
    .await
    .expect("test timed out");
}

// ── Booking types ───────────────────────────────────────────────────────

#[tokio::test]
async fn booking_types_are_projected_and_cacheable() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new();
        let stub_base = start_stub(stub.clone()).await;
        let gateway = start_gateway(scheduling_config(&stub_base)).await;

        let response = reqwest::Client::new()
            .get(format!("{gateway}/api/tidycal/types"))
            .send()
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("cache-control")
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=300")
        );
        let (status, body) = body_of(response).await;
        assert_eq!(status, 200);

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(
            data[0],
            json!({"id": 1, "name": "Intro call", "duration": 15, "slug": "intro"})
        );
        assert!(data[1].get("private").is_none());
        assert_eq!(data[2]["booking_page_url"], "https://tidycal.com/team");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn booking_types_upstream_failure_keeps_status_and_detail() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::failing_types(StatusCode::SERVICE_UNAVAILABLE, "down");
        let stub_base = start_stub(stub.clone()).await;
        let gateway = start_gateway(scheduling_config(&stub_base)).await;

        let response = reqwest::get(format!("{gateway}/api/tidycal/types"))
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 503);
        assert_eq!(body, json!({"error": "TidyCal API error", "detail": "down"}));
        assert_eq!(stub.seen("/tidycal/booking-types").len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn booking_types_without_api_key_is_500() {
    timeout(TEST_TIMEOUT, async {
        let gateway = start_gateway(GatewayConfig::default()).await;
        let response = reqwest::get(format!("{gateway}/api/tidycal/types"))
            .await
            .unwrap();

        let (status, body) = body_of(response).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "Missing API key");
    })
    .await
    .expect("test timed out");
}
