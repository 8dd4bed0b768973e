use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable seat. Reservation state lives on `Reservation`, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub number: String,
}

impl Seat {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Display name. Empty when never given.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            created_at,
        }
    }
}

/// Half-open interval `[start, end)` during which a seat is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `start < end`. Empty and inverted windows are rejected by the coordinator.
    pub fn is_well_ordered(&self) -> bool {
        self.start < self.end
    }

    /// Strict overlap: windows that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Unconfirmed,
    Confirmed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Unconfirmed => "UNCONFIRMED",
            ReservationStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub seat_id: Uuid,
    pub window: TimeWindow,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// A fresh, unconfirmed reservation.
    pub fn new(user_id: Uuid, seat_id: Uuid, window: TimeWindow, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            seat_id,
            window,
            status: ReservationStatus::Unconfirmed,
            created_at,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }

    /// Last instant at which check-in is still accepted. `None` when the
    /// deadline lies beyond the representable range, i.e. never.
    pub fn check_in_deadline(&self, grace_window: Duration) -> Option<DateTime<Utc>> {
        self.window.start.checked_add_signed(grace_window)
    }

    /// Strictly past its check-in deadline.
    pub fn is_past_deadline(&self, now: DateTime<Utc>, grace_window: Duration) -> bool {
        self.check_in_deadline(grace_window).is_some_and(|deadline| now > deadline)
    }

    /// Unconfirmed and strictly past its check-in deadline.
    pub fn is_expired(&self, now: DateTime<Utc>, grace_window: Duration) -> bool {
        !self.is_confirmed() && self.is_past_deadline(now, grace_window)
    }
}

/// Which reservations a conflict query is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictScope {
    Seat(Uuid),
    User(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = TimeWindow::new(at(10, 0), at(11, 0));
        assert!(a.overlaps(&TimeWindow::new(at(10, 30), at(10, 45))));
        assert!(a.overlaps(&TimeWindow::new(at(9, 0), at(10, 1))));
        assert!(a.overlaps(&a));

        // Back-to-back windows share only an endpoint
        assert!(!a.overlaps(&TimeWindow::new(at(11, 0), at(12, 0))));
        assert!(!a.overlaps(&TimeWindow::new(at(9, 0), at(10, 0))));
    }

    #[test]
    fn test_window_ordering() {
        assert!(TimeWindow::new(at(10, 0), at(11, 0)).is_well_ordered());
        assert!(!TimeWindow::new(at(10, 0), at(10, 0)).is_well_ordered());
        assert!(!TimeWindow::new(at(11, 0), at(10, 0)).is_well_ordered());
    }

    #[test]
    fn test_expiry_boundary() {
        let grace = Duration::minutes(10);
        let mut reservation = Reservation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            TimeWindow::new(at(10, 0), at(11, 0)),
            at(9, 0),
        );

        assert_eq!(reservation.check_in_deadline(grace), Some(at(10, 10)));
        assert!(!reservation.is_expired(at(10, 10), grace));
        assert!(reservation.is_expired(at(10, 10) + Duration::seconds(1), grace));

        reservation.status = ReservationStatus::Confirmed;
        assert!(!reservation.is_expired(at(12, 0), grace));
    }

    #[test]
    fn test_unrepresentable_deadline_never_passes() {
        let reservation = Reservation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            TimeWindow::new(at(10, 0), at(11, 0)),
            at(9, 0),
        );
        let huge = Duration::seconds(10_000_000_000_000);

        assert_eq!(reservation.check_in_deadline(huge), None);
        assert!(!reservation.is_past_deadline(DateTime::<Utc>::MAX_UTC, huge));
        assert!(!reservation.is_expired(DateTime::<Utc>::MAX_UTC, huge));
    }
}
