use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::{error, info};

pub const GREETING: &str = "Discord Bot Server is running!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

pub fn router() -> Router {
    Router::new().route("/", get(home)).route("/health", get(health))
}

/// Binds the listener up front so bind failures surface to the caller; the
/// server itself runs on its own task and shares nothing with the wizard.
pub async fn spawn(bind_address: &str, port: u16) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router()).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn home() -> &'static str {
    GREETING
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy", service: "discord-bot" })
}
