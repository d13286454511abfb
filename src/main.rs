// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::device_service::DeviceService;
use crate::application::power_panel::PowerPanel;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::orchestrator_repository::OrchestratorRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    health_check, list_devices, power_chart, power_resize, power_view,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config().context("Failed to load dashboard configuration")?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(OrchestratorRepository::new(
        config.orchestrator.base_url.clone(),
        config.orchestrator.token.clone(),
        Duration::from_secs(config.orchestrator.timeout_seconds),
    ));

    // Create services (application layer)
    let device_service = DeviceService::new(repository.clone());
    let power_panel = Arc::new(PowerPanel::new(
        repository.clone(),
        config.panel.clone(),
        config.orchestrator.sample_limit,
    ));

    let state = Arc::new(AppState {
        device_service,
        power_panel,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/devices", get(list_devices))
        .route("/power", get(power_view))
        .route("/power/chart.svg", get(power_chart))
        .route("/power/resize", post(power_resize))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;
    tracing::info!(
        "Starting photoframe-power on {} (orchestrator {})",
        addr,
        config.orchestrator.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
