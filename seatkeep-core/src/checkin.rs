use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use crate::clock::Clock;
use crate::error::ReservationError;
use crate::models::{Reservation, ReservationStatus};
use crate::policy::ReservationPolicy;
use crate::repository::Store;

/// Transition: Reserved (unconfirmed) → CheckedIn (confirmed).
///
/// Confirmation is terminal; the sweeper never releases a confirmed
/// reservation and a second check-in is an error.
pub struct CheckInService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    policy: ReservationPolicy,
}

impl CheckInService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, policy: ReservationPolicy) -> Self {
        Self { store, clock, policy }
    }

    pub async fn check_in(
        &self,
        reservation_id: Uuid,
        seat_id: Uuid,
        user_id: Uuid,
    ) -> Result<Reservation, ReservationError> {
        let mut tx = self.store.begin().await?;

        // Locks the row: a concurrent sweep of it waits for us
        let mut reservation = tx
            .find_reservation(reservation_id)
            .await?
            .ok_or(ReservationError::ReservationNotFound(reservation_id))?;

        if reservation.seat_id != seat_id {
            return Err(ReservationError::SeatMismatch);
        }
        if reservation.user_id != user_id {
            return Err(ReservationError::UserMismatch);
        }
        if reservation.is_confirmed() {
            return Err(ReservationError::AlreadyConfirmed);
        }
        if reservation.is_past_deadline(self.clock.now(), self.policy.grace_window) {
            return Err(ReservationError::DeadlineExceeded);
        }

        if !tx.mark_confirmed(reservation_id).await? {
            return Err(ReservationError::ReservationNotFound(reservation_id));
        }
        tx.commit().await?;

        reservation.status = ReservationStatus::Confirmed;
        info!(reservation_id = %reservation_id, user_id = %user_id, "Reservation checked in");
        Ok(reservation)
    }
}
