use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;
use turf_core::{book_slots, probe_range, probe_slots};
use turf_shared::{BookSlotRequest, Booking, ProbeReport, ReasonKind, VerifySlotsRequest};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingResponse {
    message: &'static str,
    booking_id: i32,
}

#[derive(Debug, Serialize)]
struct ProbeResponse {
    message: String,
    #[serde(flatten)]
    report: ProbeReport,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/booking/book", post(book_slot))
        .route("/api/booking/verify", post(verify_slots))
        .route("/api/booking/user/{user_id}", get(bookings_for_user))
        .route("/api/booking/all", get(all_bookings))
}

async fn book_slot(
    State(state): State<AppState>,
    Json(req): Json<BookSlotRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    info!(
        user_id = req.user_id,
        date = %req.date,
        from = %req.from_label,
        to = %req.to_label,
        amount = %req.amount,
        "Received booking request"
    );

    let created = book_slots(&state.slot_store, &req).await?;

    Ok(Json(BookingResponse {
        message: "Booking successful",
        booking_id: created.booking_id,
    }))
}

async fn verify_slots(
    State(state): State<AppState>,
    Json(req): Json<VerifySlotsRequest>,
) -> Result<Json<ProbeResponse>, AppError> {
    let report = match (&req.from, &req.to) {
        (Some(from), Some(to)) => probe_range(&state.slot_store, &req.date, from, to).await?,
        (None, None) => probe_slots(&state.slot_store, &req.date, req.times.as_slice()).await?,
        _ => {
            return Err(AppError::rejected(
                ReasonKind::InvalidTimeFormat,
                "both 'from' and 'to' are required for a range check",
            ))
        }
    };

    let message = if report.available {
        "All selected slots are available.".to_string()
    } else {
        let names: Vec<String> = report.unavailable.iter().map(|s| s.to_string()).collect();
        format!("The following slots are not available: {}", names.join(", "))
    };

    Ok(Json(ProbeResponse { message, report }))
}

async fn bookings_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_for_user(user_id).await?))
}

async fn all_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_all().await?))
}
