use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use turf_core::{BookingError, StoreError};
use turf_shared::{ReasonKind, SlotLabel};

#[derive(Debug)]
pub enum AppError {
    /// Malformed request data; nothing was written.
    Rejected { kind: ReasonKind, detail: String },
    /// The request was valid but a slot is taken.
    SlotConflict { slot: SlotLabel, kind: ReasonKind, message: String },
    NotFoundError(String),
    InternalServerError(String),
}

impl AppError {
    pub fn rejected(kind: ReasonKind, detail: impl Into<String>) -> Self {
        AppError::Rejected { kind, detail: detail.into() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Rejected { kind, detail } => (
                StatusCode::BAD_REQUEST,
                json!({ "reasonKind": kind, "detail": detail, "message": detail }),
            ),
            AppError::SlotConflict { slot, kind, message } => (
                StatusCode::CONFLICT,
                json!({ "conflictSlot": slot, "reasonKind": kind, "message": message }),
            ),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "reasonKind": ReasonKind::Internal, "message": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let kind = err.reason_kind();
        match err {
            BookingError::InvalidDate(_) | BookingError::InvalidTimeFormat(_) => {
                AppError::rejected(kind, err.to_string())
            }
            BookingError::SlotConflict(slot) | BookingError::SlotUnderMaintenance(slot) => AppError::SlotConflict {
                slot,
                kind,
                message: format!("{err}. Please select different time slots."),
            },
            BookingError::Store(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_conflict_mapping() {
        let slot: SlotLabel = "3 PM".parse().unwrap();
        let response = AppError::from(BookingError::SlotConflict(slot)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["conflictSlot"], "3 PM");
        assert_eq!(body["reasonKind"], "SlotConflict");
        assert_eq!(
            body["message"],
            "Slot 3 PM is already booked by another user. Please select different time slots."
        );
    }

    #[tokio::test]
    async fn test_maintenance_mapping() {
        let slot: SlotLabel = "1 AM".parse().unwrap();
        let response = AppError::from(BookingError::SlotUnderMaintenance(slot)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["reasonKind"], "SlotUnderMaintenance");
        assert_eq!(body["conflictSlot"], "1 AM");
    }

    #[tokio::test]
    async fn test_storage_details_stay_internal() {
        let err = BookingError::Store(StoreError::backend("relation \"slots\" does not exist"));
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal Server Error");
        assert!(!body.to_string().contains("relation"));
    }
}
