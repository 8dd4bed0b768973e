use std::sync::Arc;
use seatkeep_core::{Clock, ExpirySweeper, ReservationPolicy, Store, SweeperHandle};
use tracing::info;

/// Start the background sweeper that releases reservations nobody checked in for.
pub fn start_expiry_sweeper(
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    policy: ReservationPolicy,
) -> SweeperHandle {
    info!(
        grace_window_seconds = policy.grace_window.num_seconds(),
        "Starting expiry sweeper"
    );
    Arc::new(ExpirySweeper::new(store, clock, policy)).spawn()
}
