use async_trait::async_trait;

use crate::models::{DispatchStatus, NodeInfo};
use crate::SchedulerResult;

/// Device-control API for a worker node.
///
/// Both calls are opaque remote operations that may fail; a hung call
/// stalls the current distribution cycle (no timeout is enforced at
/// this layer — documented limitation).
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Load a single direct instruction onto the node, returning the
    /// device-side protocol identifier to dispatch.
    async fn load_protocol(&self, node: &NodeInfo, instruction: &str) -> SchedulerResult<String>;

    /// Submit the fully translated instruction list for one block to
    /// the node.
    async fn add_work(
        &self,
        node: &NodeInfo,
        instructions: &[String],
        block_name: &str,
    ) -> SchedulerResult<DispatchStatus>;
}
