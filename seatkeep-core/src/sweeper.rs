//! Background release of reservations nobody checked in for.
//!
//! The sweeper is the only path that reclaims abandoned holds, so a failing
//! sweep is logged and retried on the next tick; the loop only ends when its
//! cancellation token fires.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use crate::clock::Clock;
use crate::error::ReservationError;
use crate::policy::ReservationPolicy;
use crate::repository::Store;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub released: usize,
    pub failed: usize,
}

pub struct ExpirySweeper {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    policy: ReservationPolicy,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, policy: ReservationPolicy) -> Self {
        Self { store, clock, policy }
    }

    /// One pass: release every unconfirmed reservation past its deadline.
    /// Candidates are fetched `sweep_batch_size` at a time until a batch
    /// comes back short.
    pub async fn sweep_once(&self) -> Result<SweepReport, ReservationError> {
        let now = self.clock.now();
        let Some(cutoff) = now.checked_sub_signed(self.policy.grace_window) else {
            warn!(grace_window = %self.policy.grace_window, "Cutoff out of range, skipping sweep");
            return Ok(SweepReport::default());
        };

        let mut report = SweepReport::default();
        loop {
            let candidates = {
                let mut tx = self.store.begin().await?;
                let found = tx.expired_unconfirmed(cutoff, self.policy.sweep_batch_size).await?;
                tx.commit().await?;
                found
            };
            let fetched = candidates.len();

            let mut released_in_batch = 0;
            for candidate in candidates {
                match self.release(candidate.id).await {
                    Ok(true) => {
                        released_in_batch += 1;
                        info!(
                            reservation_id = %candidate.id,
                            seat_id = %candidate.seat_id,
                            user_id = %candidate.user_id,
                            "Released expired reservation"
                        );
                    }
                    Ok(false) => {
                        debug!(reservation_id = %candidate.id, "Reservation no longer releasable");
                    }
                    Err(e) => {
                        report.failed += 1;
                        warn!(reservation_id = %candidate.id, error = %e, "Failed to release reservation");
                    }
                }
            }
            report.released += released_in_batch;

            // A batch that released nothing would be fetched again unchanged
            if fetched < self.policy.sweep_batch_size || released_in_batch == 0 {
                break;
            }
        }
        Ok(report)
    }

    /// Delete one reservation if, under its row lock, it is still unconfirmed
    /// and expired. A check-in that committed first wins.
    async fn release(&self, id: Uuid) -> Result<bool, ReservationError> {
        let mut tx = self.store.begin().await?;
        let Some(reservation) = tx.find_reservation(id).await? else {
            return Ok(false);
        };
        if !reservation.is_expired(self.clock.now(), self.policy.grace_window) {
            return Ok(false);
        }
        let deleted = tx.delete_reservation(id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    /// Sweep on every tick until `shutdown` is cancelled.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        info!(interval = ?self.policy.sweep_interval, "Expiry sweeper started");

        let mut ticker = tokio::time::interval(self.policy.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.sweep_once().await {
                        Ok(report) if report.released > 0 || report.failed > 0 => {
                            info!(released = report.released, failed = report.failed, "Sweep finished");
                        }
                        Ok(_) => {}
                        Err(e) => error!(error = %e, "Sweep failed, retrying next tick"),
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    }

    /// Run the sweeper on its own task.
    pub fn spawn(self: Arc<Self>) -> SweeperHandle {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(self.run(shutdown.clone()));
        SweeperHandle { shutdown, task }
    }
}

pub struct SweeperHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the loop and wait for it to exit.
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "Expiry sweeper task ended abnormally");
        }
    }
}
