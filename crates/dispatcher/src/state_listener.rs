use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use workcell_core::NodeStateUpdate;

use crate::block_map::BlockRobotMap;

/// Consumes inbound node state-update notifications.
///
/// A node transitioning to READY has just finished the block named in
/// the update, so the block's map entry is cleared (marking it
/// finished). Every other state is ignored. Unknown block names are
/// harmless: clearing is idempotent.
pub struct StateListener {
    block_map: Arc<BlockRobotMap>,
}

impl StateListener {
    pub fn new(block_map: Arc<BlockRobotMap>) -> Self {
        Self { block_map }
    }

    /// Drain updates until the channel closes or cancellation fires.
    pub async fn run(&self, mut updates: mpsc::Receiver<NodeStateUpdate>, cancel: CancellationToken) {
        info!("state listener started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("state listener cancelled");
                    break;
                }
                update = updates.recv() => {
                    match update {
                        Some(update) => self.process_update(update),
                        None => {
                            info!("state update channel closed, listener exiting");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn process_update(&self, update: NodeStateUpdate) {
        if !update.state.is_ready() {
            debug!(block = %update.block_name, state = %update.state, "ignoring state update");
            return;
        }

        self.block_map.clear(&update.block_name);
        info!(block = %update.block_name, "block processed");
    }
}
