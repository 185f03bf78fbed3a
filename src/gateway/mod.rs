//! HTTP gateway: lead submission fan-out and scheduling proxy.

pub mod booking;
pub mod extract;
pub mod fanout;
pub mod routes;

pub use booking::BookingRequest;
pub use extract::LeadFields;
pub use fanout::{IntegrationResult, Notifier, settle_all};
pub use routes::{AppState, SubmitResponse, gateway_routes};
