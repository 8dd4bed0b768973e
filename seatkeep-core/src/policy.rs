use chrono::Duration;

/// Longest accepted grace window.
pub const MAX_GRACE_WINDOW_SECONDS: u64 = 24 * 60 * 60;
/// Longest accepted pause between sweeps.
pub const MAX_SWEEP_INTERVAL_SECONDS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("grace window of {0}s exceeds the {max}s limit", max = MAX_GRACE_WINDOW_SECONDS)]
    GraceWindowTooLong(u64),

    #[error("sweep interval of {0}s exceeds the {max}s limit", max = MAX_SWEEP_INTERVAL_SECONDS)]
    SweepIntervalTooLong(u64),
}

/// Timing rules shared by check-in and the sweeper.
#[derive(Debug, Clone)]
pub struct ReservationPolicy {
    /// How long after `start` a check-in is still accepted.
    pub grace_window: Duration,
    /// Pause between two sweeps.
    pub sweep_interval: std::time::Duration,
    /// Rows fetched per sweep query. A sweep keeps fetching until the
    /// backlog is drained.
    pub sweep_batch_size: usize,
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            grace_window: Duration::minutes(10),
            sweep_interval: std::time::Duration::from_secs(10),
            sweep_batch_size: 100,
        }
    }
}

impl ReservationPolicy {
    /// Build a policy from raw configuration values. Zero interval and batch
    /// size are raised to 1.
    pub fn from_seconds(
        grace_window_seconds: u64,
        sweep_interval_seconds: u64,
        sweep_batch_size: usize,
    ) -> Result<Self, PolicyError> {
        let grace_seconds = i64::try_from(grace_window_seconds)
            .ok()
            .filter(|s| *s as u64 <= MAX_GRACE_WINDOW_SECONDS)
            .ok_or(PolicyError::GraceWindowTooLong(grace_window_seconds))?;

        if sweep_interval_seconds > MAX_SWEEP_INTERVAL_SECONDS {
            return Err(PolicyError::SweepIntervalTooLong(sweep_interval_seconds));
        }

        Ok(Self {
            grace_window: Duration::seconds(grace_seconds),
            sweep_interval: std::time::Duration::from_secs(sweep_interval_seconds.max(1)),
            sweep_batch_size: sweep_batch_size.max(1),
        })
    }
}
