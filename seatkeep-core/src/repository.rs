use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::error::StoreError;
use crate::models::{ConflictScope, Reservation, Seat, TimeWindow, User};

/// Durable record storage with isolated, all-or-nothing transactions.
///
/// Implementations must allow many processes to share one backing store:
/// the engine keeps no in-process locks of its own.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction. Dropping the handle without `commit` rolls it back.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;
}

/// A single open transaction.
///
/// Every `find_*` lookup locks the row it returns until the transaction
/// ends, so two transactions touching the same seat, user or reservation
/// are serialized. Callers lock seats before users.
#[async_trait]
pub trait StoreTx: Send {
    async fn find_seat_by_number(&mut self, number: &str) -> Result<Option<Seat>, StoreError>;

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_reservation(&mut self, id: Uuid) -> Result<Option<Reservation>, StoreError>;

    /// All reservations in `scope` whose window overlaps `window`, in any state.
    async fn reservations_overlapping(
        &mut self,
        scope: ConflictScope,
        window: &TimeWindow,
    ) -> Result<Vec<Reservation>, StoreError>;

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError>;

    /// Returns `false` when no such reservation exists.
    async fn mark_confirmed(&mut self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns `false` when no such reservation exists.
    async fn delete_reservation(&mut self, id: Uuid) -> Result<bool, StoreError>;

    /// Unconfirmed reservations starting strictly before `cutoff`, oldest first.
    async fn expired_unconfirmed(
        &mut self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Reservation>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// User records used by the session layer.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return the user with this email, creating it first if needed. A
    /// non-empty `name` replaces the stored one; an empty one keeps it.
    async fn upsert_user(&self, email: &str, name: &str) -> Result<User, StoreError>;
}

/// Seat records and read-only availability queries.
#[async_trait]
pub trait SeatRepository: Send + Sync {
    /// Fails with `StoreError::Duplicate` if the number is taken.
    async fn add_seat(&self, number: &str) -> Result<Seat, StoreError>;

    async fn list_seats(&self) -> Result<Vec<Seat>, StoreError>;

    /// Seats with no reservation overlapping `window`. Advisory only: the
    /// answer may be stale by the time a booking is attempted.
    async fn available_seats(&self, window: &TimeWindow) -> Result<Vec<Seat>, StoreError>;
}
