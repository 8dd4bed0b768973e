use uuid::Uuid;

/// Failures reported by a `Store` implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

/// Stable reason for every engine failure. The boundary layer picks a
/// status from this, never from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidWindow,
    UserConflict,
    SeatConflict,
    Mismatch,
    AlreadyConfirmed,
    DeadlineExceeded,
    StoreUnavailable,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidWindow => "invalid_window",
            ErrorKind::UserConflict => "user_conflict",
            ErrorKind::SeatConflict => "seat_conflict",
            ErrorKind::Mismatch => "mismatch",
            ErrorKind::AlreadyConfirmed => "already_confirmed",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::StoreUnavailable => "store_unavailable",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Seat not found: {0}")]
    SeatNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Invalid time window: {0}")]
    InvalidWindow(&'static str),

    #[error("User already holds a reservation in that window")]
    UserConflict,

    #[error("Seat already reserved in that window")]
    SeatConflict,

    #[error("Reservation does not match seat")]
    SeatMismatch,

    #[error("Reservation does not match user")]
    UserMismatch,

    #[error("Reservation already checked in")]
    AlreadyConfirmed,

    #[error("Check-in deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl ReservationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::SeatNotFound(_)
            | ReservationError::UserNotFound(_)
            | ReservationError::ReservationNotFound(_) => ErrorKind::NotFound,
            ReservationError::InvalidWindow(_) => ErrorKind::InvalidWindow,
            ReservationError::UserConflict => ErrorKind::UserConflict,
            ReservationError::SeatConflict => ErrorKind::SeatConflict,
            ReservationError::SeatMismatch | ReservationError::UserMismatch => ErrorKind::Mismatch,
            ReservationError::AlreadyConfirmed => ErrorKind::AlreadyConfirmed,
            ReservationError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            ReservationError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}
