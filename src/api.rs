//! ==============================================================================
//! api.rs - query/command http surface
//! ==============================================================================
//!
//! purpose:
//!     the request/response side of the hub, consumed by the polling
//!     dashboard:
//!
//! ```text
//!     GET  /api/status        -> full device snapshot
//!     GET  /api/history       -> retained telemetry frames, oldest first
//!     POST /api/control/pump  -> set pump state, forward command to broker
//!
//!     reads go straight to the state store. the pump endpoint validates the
//!     body by hand (a json object with a boolean "status") so a wrong-typed
//!     field gets a 400 with an explanatory message and touches nothing.
//! ```
//!
//! relationships:
//!     - uses: state.rs (snapshot/history/apply_command)
//!     - serves: the dashboard, which polls every few seconds from another
//!       origin (hence the permissive cors layer)
//!
//! ==============================================================================

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::domain::{DeviceSnapshot, HistoryResponse, PumpCommand};
use crate::error::HubError;
use crate::state::StateStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct PumpResponse {
    pub success: bool,
    pub message: String,
}

pub fn router(store: StateStore) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/history", get(history_handler))
        .route("/api/control/pump", post(pump_handler))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// bind and serve until the process exits
pub async fn serve(store: StateStore, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("api listening on {}", bind);
    axum::serve(listener, router(store)).await?;
    Ok(())
}

async fn status_handler(State(store): State<StateStore>) -> Json<DeviceSnapshot> {
    Json(store.snapshot().await)
}

async fn history_handler(State(store): State<StateStore>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        device_id: store.device_id().await,
        data_points: store.history().await,
    })
}

async fn pump_handler(
    State(store): State<StateStore>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<PumpResponse>) {
    let status = match validate_pump_body(&body) {
        Ok(status) => status,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PumpResponse {
                    success: false,
                    message: e.to_string(),
                }),
            );
        }
    };

    store.apply_command(PumpCommand { status }).await;
    let message = if status { "Pump activated" } else { "Pump deactivated" };
    (
        StatusCode::OK,
        Json(PumpResponse {
            success: true,
            message: message.to_string(),
        }),
    )
}

fn validate_pump_body(body: &serde_json::Value) -> Result<bool, HubError> {
    body.get("status")
        .ok_or_else(|| HubError::validation("missing 'status' field"))?
        .as_bool()
        .ok_or_else(|| HubError::validation("'status' must be a boolean"))
}
