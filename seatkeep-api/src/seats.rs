use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use seatkeep_core::{ReservationError, Seat};
use crate::{error::AppError, state::AppState, time_input::parse_window};

#[derive(Debug, Serialize)]
pub struct SeatResponse {
    pub id: Uuid,
    pub number: String,
}

impl From<Seat> for SeatResponse {
    fn from(seat: Seat) -> Self {
        Self { id: seat.id, number: seat.number }
    }
}

#[derive(Debug, Deserialize)]
struct AddSeatRequest {
    number: String,
}

#[derive(Debug, Deserialize)]
struct AvailabilityRequest {
    from_time: String,
    to_time: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/seats", get(list_seats).post(add_seat))
        .route("/v1/seats/available", post(available_seats))
}

/// GET /v1/seats
async fn list_seats(State(state): State<AppState>) -> Result<Json<Vec<SeatResponse>>, AppError> {
    let seats = state.seats.list_seats().await?;
    Ok(Json(seats.into_iter().map(SeatResponse::from).collect()))
}

/// POST /v1/seats
async fn add_seat(
    State(state): State<AppState>,
    Json(req): Json<AddSeatRequest>,
) -> Result<(StatusCode, Json<SeatResponse>), AppError> {
    let number = req.number.trim();
    if number.is_empty() {
        return Err(AppError::ValidationError("seat number is required".to_string()));
    }

    let seat = state.seats.add_seat(number).await?;
    tracing::info!(seat = %seat.number, "Seat added");
    Ok((StatusCode::CREATED, Json(seat.into())))
}

/// POST /v1/seats/available
/// Seats free for the whole window. Advisory: booking re-checks atomically.
async fn available_seats(
    State(state): State<AppState>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<Vec<SeatResponse>>, AppError> {
    let window = parse_window(&req.from_time, &req.to_time, state.utc_offset)?;
    if !window.is_well_ordered() {
        return Err(ReservationError::InvalidWindow("start must be before end").into());
    }

    let seats = state.seats.available_seats(&window).await?;
    Ok(Json(seats.into_iter().map(SeatResponse::from).collect()))
}
