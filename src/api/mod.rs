//! API endpoints
//!
//! Este módulo contiene los endpoints HTTP de inspección (solo lectura;
//! toda mutación pasa por el canal de eventos) y el endpoint WebSocket.

pub mod ws;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;

use crate::models::scooter::{ScooterId, ScooterSnapshot};
use crate::state::AppState;
use crate::utils::errors::{AppError, EngineError};

/// Crear el router principal de la API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/scooters", get(list_scooters))
        .route("/scooters/:id", get(get_scooter))
}

/// Health check
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "scooter-tracking",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Ids de los scooters actualmente registrados
async fn list_scooters(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut ids = state.registry.ids().await;
    ids.sort();
    Json(json!({
        "count": ids.len(),
        "scooters": ids,
    }))
}

/// Snapshot actual de un scooter
async fn get_scooter(
    State(state): State<AppState>,
    Path(id): Path<ScooterId>,
) -> Result<Json<ScooterSnapshot>, AppError> {
    let handle = state
        .registry
        .get(&id)
        .await
        .ok_or_else(|| AppError::from(EngineError::UnknownScooter(id.clone())))?;
    let snapshot = handle.snapshot().await?;
    Ok(Json(snapshot))
}
