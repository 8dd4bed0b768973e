pub mod availability;
pub mod checkin;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod models;
pub mod policy;
pub mod repository;
pub mod sweeper;

pub use checkin::CheckInService;
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::ReservationCoordinator;
pub use error::{ErrorKind, ReservationError, StoreError};
pub use memory::InMemoryStore;
pub use models::{ConflictScope, Reservation, ReservationStatus, Seat, TimeWindow, User};
pub use policy::{PolicyError, ReservationPolicy};
pub use repository::{SeatRepository, Store, StoreTx, UserRepository};
pub use sweeper::{ExpirySweeper, SweepReport, SweeperHandle};
