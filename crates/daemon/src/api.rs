//! Inbound HTTP surface: broker notifications and liveness

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use ngsi_types::{Notification, VehicleCommand, VehicleState};
use serde_json::json;

use crate::{config::BridgeConfig, orion::OrionClient};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub orion: Arc<OrionClient>,
}

/// Receives one broker notification, records the observed vehicle state, and
/// unless monitoring only, answers it with a movement order. The broker always
/// gets a 200 for a well-formed delivery; the order's outcome never changes
/// the response.
#[axum::debug_handler]
pub async fn car_update_handler(
    State(state): State<AppState>,
    Json(notification): Json<Notification>,
) -> impl IntoResponse {
    let vehicle = match VehicleState::from_notification(&notification) {
        Ok(vehicle) => vehicle,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting malformed notification");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": e.to_string()})),
            )
                .into_response();
        }
    };

    tracing::info!(
        coordinates = ?vehicle.coordinates,
        moving = vehicle.moving,
        direction = %vehicle.direction,
        service_status = %vehicle.service_status,
        signal_quality = vehicle.signal_quality,
        speed = vehicle.speed,
        "Vehicle state update"
    );

    if let Some(target) = state.config.command_target() {
        // Non-204 broker replies are logged by the client; transport failures
        // land here. Neither reaches the broker's response.
        if let Err(e) = state.orion.write_attrs(target, &VehicleCommand::advance()).await {
            tracing::warn!(error = %e, entity = target, "Movement order not delivered");
        }
    }

    (StatusCode::OK, Json(json!({}))).into_response()
}

/// Process liveness only, independent of broker reachability.
pub async fn healthz_handler() -> impl IntoResponse {
    Json(json!({"is_live": true}))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/car_update", post(car_update_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
}
