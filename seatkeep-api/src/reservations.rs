use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use seatkeep_core::{Reservation, ReservationStatus};
use crate::{error::AppError, middleware::CurrentUser, state::AppState, time_input::parse_window};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BookSeatRequest {
    pub seat_number: String,
    pub from_time: String,
    pub to_time: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub seat_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub seat_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ReservationResponse {
    fn new(reservation: Reservation, state: &AppState) -> Self {
        Self {
            check_in_deadline: reservation.check_in_deadline(state.policy.grace_window),
            id: reservation.id,
            user_id: reservation.user_id,
            seat_id: reservation.seat_id,
            start_time: reservation.window.start,
            end_time: reservation.window.end,
            status: reservation.status,
            created_at: reservation.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(book_seat))
        .route("/v1/reservations/{id}/check-in", post(check_in))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/reservations
/// Reserve a seat for the caller
async fn book_seat(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<BookSeatRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let window = parse_window(&req.from_time, &req.to_time, state.utc_offset)?;

    let reservation = state
        .coordinator
        .create_reservation(user.id, req.seat_number.trim(), window)
        .await?;

    Ok((StatusCode::CREATED, Json(ReservationResponse::new(reservation, &state))))
}

/// POST /v1/reservations/{id}/check-in
async fn check_in(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(reservation_id): Path<Uuid>,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state
        .checkin
        .check_in(reservation_id, req.seat_id, user.id)
        .await?;

    Ok(Json(ReservationResponse::new(reservation, &state)))
}
