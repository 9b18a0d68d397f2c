use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;
use turf_core::{assign_maintenance, schedule::parse_date};
use turf_shared::{MaintenanceSlotRequest, Slot};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/slots/date/{date}", get(slots_by_date))
        .route("/api/slots/exceptions", get(upcoming_exception_slots))
        .route("/api/slots/maintenance", post(add_maintenance_slot))
        .route("/api/slots/{id}", delete(remove_slot))
}

async fn slots_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let date = parse_date(&date)?;
    let slots = state.slots.list_for_date(date).await?;
    info!(%date, count = slots.len(), "Found slots for date");
    Ok(Json(slots))
}

async fn upcoming_exception_slots(State(state): State<AppState>) -> Result<Json<Vec<Slot>>, AppError> {
    let slots = state.slots.list_upcoming().await?;
    info!(count = slots.len(), "Found upcoming exception slots");
    Ok(Json(slots))
}

async fn add_maintenance_slot(
    State(state): State<AppState>,
    Json(req): Json<MaintenanceSlotRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let slot = assign_maintenance(&state.slot_store, &req.date, &req.time).await?;
    Ok(Json(MessageResponse {
        message: format!("Maintenance slot {slot} added successfully"),
    }))
}

async fn remove_slot(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<MessageResponse>, AppError> {
    if !state.slots.remove(id).await? {
        return Err(AppError::NotFoundError("Slot not found".to_string()));
    }
    info!(slot_id = id, "Removed slot");
    Ok(Json(MessageResponse {
        message: "Slot removed successfully".to_string(),
    }))
}
