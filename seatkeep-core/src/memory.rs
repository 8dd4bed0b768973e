use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::models::{ConflictScope, Reservation, ReservationStatus, Seat, TimeWindow, User};
use crate::repository::{SeatRepository, Store, StoreTx, UserRepository};

#[derive(Debug, Clone, Default)]
struct Records {
    seats: HashMap<Uuid, Seat>,
    users: HashMap<Uuid, User>,
    reservations: HashMap<Uuid, Reservation>,
}

/// Process-local store. One lock guards the whole record set, so every
/// transaction is serializable with respect to every other.
#[derive(Clone)]
pub struct InMemoryStore {
    records: Arc<Mutex<Records>>,
    unavailable: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record creation times are read from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::default(),
            unavailable: Arc::default(),
            clock,
        }
    }

    /// While set, every operation fails with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert a reservation as-is, bypassing every check.
    pub async fn seed_reservation(&self, reservation: Reservation) {
        self.records.lock().await.reservations.insert(reservation.id, reservation);
    }

    pub async fn get_reservation(&self, id: Uuid) -> Option<Reservation> {
        self.records.lock().await.reservations.get(&id).cloned()
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        let mut all: Vec<_> = self.records.lock().await.reservations.values().cloned().collect();
        all.sort_by_key(|r| (r.window.start, r.id));
        all
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        self.check_available()?;
        let guard = self.records.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTx { guard, staged }))
    }
}

/// Writes go to `staged`; `commit` swaps them into the shared records.
struct InMemoryTx {
    guard: OwnedMutexGuard<Records>,
    staged: Records,
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn find_seat_by_number(&mut self, number: &str) -> Result<Option<Seat>, StoreError> {
        Ok(self.staged.seats.values().find(|s| s.number == number).cloned())
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.staged.users.get(&id).cloned())
    }

    async fn find_reservation(&mut self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        Ok(self.staged.reservations.get(&id).cloned())
    }

    async fn reservations_overlapping(
        &mut self,
        scope: ConflictScope,
        window: &TimeWindow,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .staged
            .reservations
            .values()
            .filter(|r| match scope {
                ConflictScope::Seat(seat_id) => r.seat_id == seat_id,
                ConflictScope::User(user_id) => r.user_id == user_id,
            })
            .filter(|r| r.window.overlaps(window))
            .cloned()
            .collect())
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError> {
        if self.staged.reservations.contains_key(&reservation.id) {
            return Err(StoreError::Duplicate(format!("reservation {}", reservation.id)));
        }
        self.staged.reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn mark_confirmed(&mut self, id: Uuid) -> Result<bool, StoreError> {
        match self.staged.reservations.get_mut(&id) {
            Some(reservation) => {
                reservation.status = ReservationStatus::Confirmed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_reservation(&mut self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.staged.reservations.remove(&id).is_some())
    }

    async fn expired_unconfirmed(
        &mut self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Reservation>, StoreError> {
        let mut expired: Vec<_> = self
            .staged
            .reservations
            .values()
            .filter(|r| !r.is_confirmed() && r.window.start < cutoff)
            .cloned()
            .collect();
        expired.sort_by_key(|r| (r.window.start, r.id));
        expired.truncate(limit);
        Ok(expired)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn upsert_user(&self, email: &str, name: &str) -> Result<User, StoreError> {
        self.check_available()?;
        let mut records = self.records.lock().await;
        if let Some(existing) = records.users.values_mut().find(|u| u.email == email) {
            if !name.is_empty() {
                existing.name = name.to_string();
            }
            return Ok(existing.clone());
        }
        let user = User::new(email, name, self.clock.now());
        records.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl SeatRepository for InMemoryStore {
    async fn add_seat(&self, number: &str) -> Result<Seat, StoreError> {
        self.check_available()?;
        let mut records = self.records.lock().await;
        if records.seats.values().any(|s| s.number == number) {
            return Err(StoreError::Duplicate(format!("seat {}", number)));
        }
        let seat = Seat::new(number);
        records.seats.insert(seat.id, seat.clone());
        Ok(seat)
    }

    async fn list_seats(&self) -> Result<Vec<Seat>, StoreError> {
        self.check_available()?;
        let mut seats: Vec<_> = self.records.lock().await.seats.values().cloned().collect();
        seats.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(seats)
    }

    async fn available_seats(&self, window: &TimeWindow) -> Result<Vec<Seat>, StoreError> {
        self.check_available()?;
        let records = self.records.lock().await;
        let mut seats: Vec<_> = records
            .seats
            .values()
            .filter(|seat| {
                !records
                    .reservations
                    .values()
                    .any(|r| r.seat_id == seat.id && r.window.overlaps(window))
            })
            .cloned()
            .collect();
        seats.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(seats)
    }
}
