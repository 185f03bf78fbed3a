use lead_gateway::config::GatewayConfig;
use lead_gateway::gateway::{AppState, gateway_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development reads secrets from .env; deployments set them directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = GatewayConfig::from_env()?;
    let enabled = config.enabled_integrations();

    eprintln!("📮 Lead Gateway v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Submit: http://0.0.0.0:{}/api/submit", config.port);
    eprintln!("   Booking: http://0.0.0.0:{}/api/tidycal/book", config.port);
    eprintln!("   Notify: {}", config.notification_email);
    if enabled.is_empty() {
        eprintln!("   Integrations: none (submissions are accepted but not delivered)");
    } else {
        eprintln!("   Integrations: {}", enabled.join(", "));
    }
    eprintln!(
        "   Scheduling: {}\n",
        if config.scheduling.api_key.is_some() {
            "enabled"
        } else {
            "disabled (no API key)"
        }
    );

    let app = gateway_routes(AppState::from_config(&config));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Lead gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}
