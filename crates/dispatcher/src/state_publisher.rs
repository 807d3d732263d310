use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use workcell_core::traits::StateBroadcaster;
use workcell_core::{DispatchStatus, NodeState};

use crate::retry::retry;

/// Best-effort publisher of the scheduler's own coarse state.
///
/// Broadcasts go through the bounded retry wrapper; exhausting the
/// retry budget is logged and swallowed because state telemetry is not
/// a correctness dependency. `NodeState` being a closed enum means
/// there is no invalid-value case to reject.
pub struct StatePublisher {
    broadcaster: Arc<dyn StateBroadcaster>,
    scheduler_id: String,
    max_attempts: u32,
    delay: Duration,
}

impl StatePublisher {
    pub fn new(
        broadcaster: Arc<dyn StateBroadcaster>,
        scheduler_id: String,
        max_attempts: u32,
        delay: Duration,
    ) -> Self {
        Self {
            broadcaster,
            scheduler_id,
            max_attempts,
            delay,
        }
    }

    pub async fn publish(&self, state: NodeState) {
        let status = retry(
            || self.broadcaster.broadcast(&self.scheduler_id, state),
            self.max_attempts,
            self.delay,
        )
        .await
        .unwrap_or(DispatchStatus::Error);

        if status.is_failure() {
            error!(
                scheduler = %self.scheduler_id,
                %state,
                "unable to update scheduler state with master, continuing \
                 but the externally visible state may be stale"
            );
        } else {
            debug!(scheduler = %self.scheduler_id, %state, "scheduler state published");
        }
    }
}
