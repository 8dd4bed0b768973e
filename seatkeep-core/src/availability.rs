//! Conflict checks. Both run inside the caller's transaction so the answer
//! stays valid until that transaction commits.

use uuid::Uuid;
use crate::error::StoreError;
use crate::models::{ConflictScope, TimeWindow};
use crate::repository::StoreTx;

/// Whether any reservation on `seat_id`, confirmed or not, overlaps `window`.
pub async fn seat_has_conflict(
    tx: &mut dyn StoreTx,
    seat_id: Uuid,
    window: &TimeWindow,
) -> Result<bool, StoreError> {
    has_conflict(tx, ConflictScope::Seat(seat_id), window).await
}

/// Whether `user_id` already holds a reservation overlapping `window` on any seat.
pub async fn user_has_conflict(
    tx: &mut dyn StoreTx,
    user_id: Uuid,
    window: &TimeWindow,
) -> Result<bool, StoreError> {
    has_conflict(tx, ConflictScope::User(user_id), window).await
}

async fn has_conflict(
    tx: &mut dyn StoreTx,
    scope: ConflictScope,
    window: &TimeWindow,
) -> Result<bool, StoreError> {
    let candidates = tx.reservations_overlapping(scope, window).await?;
    // Re-apply the predicate so a store with a looser query cannot admit a conflict
    Ok(candidates.iter().any(|r| r.window.overlaps(window)))
}
