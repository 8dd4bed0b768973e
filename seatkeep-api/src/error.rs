use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seatkeep_core::{ErrorKind, ReservationError, StoreError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    ConflictError(String),
    Reservation(ReservationError),
    InternalServerError(String),
}

fn reservation_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidWindow => StatusCode::BAD_REQUEST,
        ErrorKind::UserConflict | ErrorKind::SeatConflict => StatusCode::CONFLICT,
        ErrorKind::Mismatch => StatusCode::FORBIDDEN,
        ErrorKind::AlreadyConfirmed => StatusCode::CONFLICT,
        ErrorKind::DeadlineExceeded => StatusCode::GONE,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AppError::Reservation(err) => {
                let kind = err.kind();
                if kind == ErrorKind::StoreUnavailable {
                    tracing::error!("Store unavailable: {}", err);
                }
                (reservation_status(kind), kind.code(), err.to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        Self::Reservation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => Self::ConflictError(msg),
            other => Self::Reservation(ReservationError::StoreUnavailable(other)),
        }
    }
}
