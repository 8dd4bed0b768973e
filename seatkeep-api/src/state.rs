use chrono::FixedOffset;
use std::sync::Arc;
use seatkeep_core::{
    CheckInService, Clock, ReservationCoordinator, ReservationPolicy, SeatRepository, Store,
    UserRepository,
};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ReservationCoordinator>,
    pub checkin: Arc<CheckInService>,
    pub users: Arc<dyn UserRepository>,
    pub seats: Arc<dyn SeatRepository>,
    pub policy: ReservationPolicy,
    pub auth: AuthConfig,
    /// Zone for request times written without one.
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new<S>(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        policy: ReservationPolicy,
        auth: AuthConfig,
        utc_offset: FixedOffset,
    ) -> Self
    where
        S: Store + UserRepository + SeatRepository + 'static,
    {
        Self {
            coordinator: Arc::new(ReservationCoordinator::new(store.clone(), clock.clone())),
            checkin: Arc::new(CheckInService::new(store.clone(), clock, policy.clone())),
            users: store.clone(),
            seats: store,
            policy,
            auth,
            utc_offset,
        }
    }
}
