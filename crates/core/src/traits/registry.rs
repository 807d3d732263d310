use async_trait::async_trait;

use crate::models::{DispatchStatus, NodeInfo, NodeState};
use crate::SchedulerResult;

/// Client for the external master/registry service.
///
/// No retry happens at this layer; callers that want bounded retry go
/// through the retry wrapper.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Register this scheduler with the master under the given kind
    /// and name.
    async fn register(&self, kind: &str, name: &str) -> SchedulerResult<DispatchStatus>;

    /// Remove this scheduler's registration.
    async fn deregister(&self, name: &str) -> SchedulerResult<DispatchStatus>;

    /// Fetch the current snapshot of known worker nodes.
    ///
    /// Fails with `SchedulerError::RegistryUnavailable` when the
    /// registry cannot be reached.
    async fn list_nodes(&self) -> SchedulerResult<Vec<NodeInfo>>;
}

/// One-way broadcast of the scheduler's own coarse state.
///
/// Fire-and-forget at the wire: there is no acknowledgement contract,
/// only local send failure.
#[async_trait]
pub trait StateBroadcaster: Send + Sync {
    async fn broadcast(
        &self,
        scheduler_id: &str,
        state: NodeState,
    ) -> SchedulerResult<DispatchStatus>;
}
