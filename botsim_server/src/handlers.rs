use axum::{
    Json,
    extract::{Path, State},
};
use botsim_conversation::{SimulationReport, SimulationRequest};
use serde_json::{Value, json};
use tracing::info;

use crate::{AppState, ApiError};

/// GET /healthy
pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// POST /simulate
pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationReport>, ApiError> {
    info!(
        "Simulation requested: bot_id={}, max_turns={}",
        request.bot_id, request.max_turns
    );

    let report = state.simulator.run(request).await?;
    Ok(Json(report))
}

/// GET /ws/:client_id
///
/// Realtime connections are not offered; answer with a plain JSON notice.
pub async fn websocket_unsupported(Path(client_id): Path<String>) -> Json<Value> {
    Json(json!({
        "status": "error",
        "message": "WebSocket connections are not supported by this server. Please use HTTP endpoints instead.",
        "client_id": client_id,
    }))
}
