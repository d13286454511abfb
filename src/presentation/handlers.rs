// HTTP request handlers
use crate::application::power_panel::{ChartSize, PanelRequest, PanelView};
use crate::infrastructure::http_response::{accepts_brotli, svg_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List devices and refresh the panel's device map
pub async fn list_devices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.device_service.list_devices().await {
        Ok(devices) => {
            state.power_panel.set_devices(&devices);
            (StatusCode::OK, Json(json!({ "devices": devices })))
        }
        Err(e) => {
            tracing::warn!("Error fetching devices: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("failed to load devices: {}", e) })),
            )
        }
    }
}

/// Refresh the power panel for the selected device and window
pub async fn power_view(
    Query(request): Query<PanelRequest>,
    State(state): State<Arc<AppState>>,
) -> Json<PanelView> {
    let now_epoch = chrono::Utc::now().timestamp();
    state.power_panel.refresh(request, now_epoch).await;
    Json(state.power_panel.view())
}

/// Last rendered power chart
pub async fn power_chart(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(
        headers
            .get(header::ACCEPT_ENCODING)
            .and_then(|v| v.to_str().ok()),
    );

    let Some(svg) = state.power_panel.chart_svg() else {
        return (StatusCode::NOT_FOUND, "no chart rendered yet").into_response();
    };

    match svg_response(&svg, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Schedule a debounced redraw of the cached chart at a new size
pub async fn power_resize(
    State(state): State<Arc<AppState>>,
    Json(size): Json<ChartSize>,
) -> StatusCode {
    state.power_panel.schedule_resize(size);
    StatusCode::ACCEPTED
}
