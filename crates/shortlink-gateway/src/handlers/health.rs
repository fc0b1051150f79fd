use crate::model::HealthResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use jiff::Timestamp;
use tracing::warn;

const SERVICE_NAME: &str = "ShortLink URL Shortening Service";

/// Reports service and store status. Always answers 200 so that a store
/// outage is visible in the payload rather than as a failed health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, store, error) = match state.shortener().ping().await {
        Ok(()) => ("ok", "connected", None),
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            ("warning", "disconnected", Some(e.to_string()))
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        message: SERVICE_NAME.to_string(),
        store: store.to_string(),
        environment: state.environment().to_string(),
        port: state.port(),
        timestamp: Timestamp::now().to_string(),
        error,
    })
}
