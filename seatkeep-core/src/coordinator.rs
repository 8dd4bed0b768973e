use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use crate::availability::{seat_has_conflict, user_has_conflict};
use crate::clock::Clock;
use crate::error::ReservationError;
use crate::models::{Reservation, TimeWindow};
use crate::repository::Store;

/// Creates reservations. The conflict checks and the insert share one
/// store transaction, so two overlapping requests cannot both commit.
pub struct ReservationCoordinator {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl ReservationCoordinator {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Reserve `seat_number` for `user_id` over `window`.
    ///
    /// Checks run in a fixed order and the first failure wins: seat exists,
    /// user exists, `start < end`, `start` not in the past, no user
    /// conflict, no seat conflict.
    pub async fn create_reservation(
        &self,
        user_id: Uuid,
        seat_number: &str,
        window: TimeWindow,
    ) -> Result<Reservation, ReservationError> {
        let mut tx = self.store.begin().await?;

        // 1. Resolve and lock seat, then user
        let seat = tx
            .find_seat_by_number(seat_number)
            .await?
            .ok_or_else(|| ReservationError::SeatNotFound(seat_number.to_string()))?;
        let user = tx
            .find_user(user_id)
            .await?
            .ok_or(ReservationError::UserNotFound(user_id))?;

        // 2. Validate window
        let now = self.clock.now();
        if !window.is_well_ordered() {
            return Err(ReservationError::InvalidWindow("start must be before end"));
        }
        if window.start < now {
            return Err(ReservationError::InvalidWindow("start is in the past"));
        }

        // 3. Conflicts
        if user_has_conflict(tx.as_mut(), user.id, &window).await? {
            debug!(user_id = %user.id, "Rejected reservation: user conflict");
            return Err(ReservationError::UserConflict);
        }
        if seat_has_conflict(tx.as_mut(), seat.id, &window).await? {
            debug!(seat = %seat.number, "Rejected reservation: seat conflict");
            return Err(ReservationError::SeatConflict);
        }

        // 4. Insert and commit
        let reservation = Reservation::new(user.id, seat.id, window, now);
        tx.insert_reservation(&reservation).await?;
        tx.commit().await?;

        info!(
            reservation_id = %reservation.id,
            seat = %seat.number,
            user_id = %user.id,
            start = %window.start,
            end = %window.end,
            "Reservation created"
        );
        Ok(reservation)
    }
}
