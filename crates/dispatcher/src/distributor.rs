//! The distribution loop: matches queued blocks to idle nodes.
//!
//! Known hazard, inherited from the workcell design and deliberately
//! not resolved here: a workflow whose transfer instructions make two
//! device kinds wait on each other's readiness can deadlock (circular
//! wait — each side holds a plate the other needs before it can go
//! READY). Operators must author workflows that avoid mutual transfer
//! dependencies until an avoidance/detection policy is decided.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use workcell_core::traits::{DeviceClient, RegistryClient};
use workcell_core::{
    Block, DispatchStatus, NodeInfo, NodeKind, NodeState, SchedulerError, SchedulerResult,
    TaskInstruction,
};

use crate::block_map::BlockRobotMap;
use crate::queue::ProtocolQueue;
use crate::state_publisher::StatePublisher;

/// The scheduling engine. On a fixed cadence it fetches a node
/// snapshot from the registry, dispatches the queue head to each READY
/// node of the configured kind, and records the block→node mapping.
pub struct BlockDistributor {
    queue: Arc<ProtocolQueue>,
    block_map: Arc<BlockRobotMap>,
    registry: Arc<dyn RegistryClient>,
    device: Arc<dyn DeviceClient>,
    publisher: Arc<StatePublisher>,
    device_kind: NodeKind,
    interval: Duration,
}

impl BlockDistributor {
    pub fn new(
        queue: Arc<ProtocolQueue>,
        block_map: Arc<BlockRobotMap>,
        registry: Arc<dyn RegistryClient>,
        device: Arc<dyn DeviceClient>,
        publisher: Arc<StatePublisher>,
        device_kind: NodeKind,
        interval: Duration,
    ) -> Self {
        Self {
            queue,
            block_map,
            registry,
            device,
            publisher,
            device_kind,
            interval,
        }
    }

    /// Drive distribution cycles until cancellation or a cycle-level
    /// error.
    ///
    /// A cycle error escalates: the scheduler's own state is published
    /// as ERROR and the loop terminates. The registry is assumed to
    /// carry its own retry semantics, so failing fast here surfaces a
    /// systemic outage instead of masking it.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(kind = %self.device_kind, interval = ?self.interval, "distribution loop started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            match self.dispatch_cycle(&cancel).await {
                DispatchStatus::Fatal => break,
                DispatchStatus::Error => {
                    error!("distribution cycle failed, stopping loop");
                    self.publisher.publish(NodeState::Error).await;
                    break;
                }
                status => {
                    debug!(%status, "distribution cycle complete");
                }
            }
        }

        info!("distribution loop stopped");
    }

    /// One distribution cycle.
    ///
    /// WAITING when the queue is empty, FATAL when cancellation is
    /// observed, ERROR on registry or dispatch failure, SUCCESS
    /// otherwise. At most one block is dispatched per READY node per
    /// cycle.
    pub async fn dispatch_cycle(&self, cancel: &CancellationToken) -> DispatchStatus {
        if cancel.is_cancelled() {
            return DispatchStatus::Fatal;
        }

        if self.queue.is_empty() {
            return DispatchStatus::Waiting;
        }

        let nodes = match self.registry.list_nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                error!(error = %e, "unable to fetch node list");
                return DispatchStatus::Error;
            }
        };

        for node in &nodes {
            // Checked per node so shutdown latency is bounded by one
            // dispatch, not a whole snapshot scan.
            if cancel.is_cancelled() {
                return DispatchStatus::Fatal;
            }

            if node.kind != self.device_kind {
                continue;
            }

            match node.state {
                NodeState::Error => {
                    warn!(
                        node = %node.name,
                        "node is in errored state and must be handled immediately!"
                    );
                }
                NodeState::Ready => {
                    let Some(block) = self.queue.dequeue_front() else {
                        // Queue drained mid-scan; nothing left to place.
                        continue;
                    };

                    // Map first: dispatch is at-most-once, and a block
                    // that fails mid-dispatch stays dequeued and mapped
                    // for operator intervention rather than being
                    // silently redispatched.
                    self.block_map.assign(&block.name, &node.name);

                    if let Err(e) = self.dispatch_block(&block, node).await {
                        error!(
                            block = %block.name,
                            node = %node.id,
                            error = %e,
                            "load/add protocols failed"
                        );
                        return DispatchStatus::Error;
                    }
                }
                _ => {}
            }
        }

        DispatchStatus::Success
    }

    /// Translate a block's tasks and submit them to one node.
    ///
    /// Direct instructions go through the device-load API and the
    /// returned identifiers are dispatched; transfer instructions have
    /// both endpoints prefixed with the block's tag so they reference
    /// tagged, globally unique block names.
    async fn dispatch_block(&self, block: &Block, node: &NodeInfo) -> SchedulerResult<()> {
        let mut instructions = Vec::with_capacity(block.tasks.len());

        for task in &block.tasks {
            match task {
                TaskInstruction::Direct(instruction) => {
                    let protocol_id = self.device.load_protocol(node, instruction).await?;
                    instructions.push(protocol_id);
                }
                TaskInstruction::Transfer {
                    source,
                    destination,
                } => {
                    instructions.push(format!(
                        "transfer:{tag}-{source}:{tag}-{destination}",
                        tag = block.tag
                    ));
                }
            }
        }

        let status = self
            .device
            .add_work(node, &instructions, &block.name)
            .await?;
        if status.is_failure() {
            return Err(SchedulerError::DeviceDispatch {
                node: node.id.clone(),
                message: format!("add_work returned {status}"),
            });
        }

        info!(block = %block.name, node = %node.name, tasks = instructions.len(), "block dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mocks::{node, MockBroadcaster, MockDeviceClient, MockRegistryClient};

    fn publisher(broadcaster: &Arc<MockBroadcaster>) -> Arc<StatePublisher> {
        Arc::new(StatePublisher::new(
            Arc::clone(broadcaster) as Arc<dyn workcell_core::traits::StateBroadcaster>,
            "sched-ana".to_string(),
            1,
            Duration::from_millis(0),
        ))
    }

    struct Harness {
        queue: Arc<ProtocolQueue>,
        block_map: Arc<BlockRobotMap>,
        registry: Arc<MockRegistryClient>,
        device: Arc<MockDeviceClient>,
        broadcaster: Arc<MockBroadcaster>,
        distributor: BlockDistributor,
    }

    fn harness_with_queue(queue: ProtocolQueue) -> Harness {
        let queue = Arc::new(queue);
        let block_map = Arc::new(BlockRobotMap::new());
        let registry = Arc::new(MockRegistryClient::new());
        let device = Arc::new(MockDeviceClient::new());
        let broadcaster = Arc::new(MockBroadcaster::new());

        let distributor = BlockDistributor::new(
            Arc::clone(&queue),
            Arc::clone(&block_map),
            Arc::clone(&registry) as Arc<dyn RegistryClient>,
            Arc::clone(&device) as Arc<dyn DeviceClient>,
            publisher(&broadcaster),
            NodeKind::Ot2,
            Duration::from_millis(5),
        );

        Harness {
            queue,
            block_map,
            registry,
            device,
            broadcaster,
            distributor,
        }
    }

    fn harness() -> Harness {
        harness_with_queue(ProtocolQueue::new())
    }

    fn spec(name: &str, tasks: &str) -> workcell_core::BlockSpec {
        workcell_core::BlockSpec {
            name: name.to_string(),
            tasks: tasks.to_string(),
        }
    }

    #[tokio::test]
    async fn empty_queue_is_waiting_not_error() {
        let h = harness();
        h.registry.set_nodes(vec![node("n1", "wc_ot2_alpha", NodeKind::Ot2, NodeState::Ready)]);

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;
        assert_eq!(status, DispatchStatus::Waiting);
    }

    #[tokio::test]
    async fn dispatches_head_block_to_ready_node() {
        let h = harness();
        h.registry.set_nodes(vec![node("n1", "wc_ot2_alpha", NodeKind::Ot2, NodeState::Ready)]);
        h.queue.enqueue_batch(&[spec("mix", "pour stir")]).unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;

        assert_eq!(status, DispatchStatus::Success);
        assert_eq!(h.block_map.resolve("0-mix").as_deref(), Some("wc_ot2_alpha"));
        assert!(h.queue.is_empty());

        let submitted = h.device.submitted();
        assert_eq!(submitted.len(), 1);
        let (node_id, instructions, block_name) = &submitted[0];
        assert_eq!(node_id, "n1");
        assert_eq!(block_name, "0-mix");
        // Mock load_protocol echoes the instruction as its identifier.
        assert_eq!(instructions, &vec!["pour".to_string(), "stir".to_string()]);
    }

    #[tokio::test]
    async fn transfer_endpoints_are_tag_qualified() {
        let h = harness_with_queue(ProtocolQueue::with_next_tag(3));
        h.registry.set_nodes(vec![node("n1", "wc_ot2_alpha", NodeKind::Ot2, NodeState::Ready)]);
        h.queue
            .enqueue_batch(&[spec("move", "transfer:A:B")])
            .unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;
        assert_eq!(status, DispatchStatus::Success);

        let submitted = h.device.submitted();
        assert_eq!(submitted[0].1, vec!["transfer:3-A:3-B".to_string()]);
        assert_eq!(submitted[0].2, "3-move");
    }

    #[tokio::test]
    async fn wrong_kind_nodes_are_skipped() {
        let h = harness();
        h.registry.set_nodes(vec![
            node("n1", "wc_arm_main", NodeKind::Arm, NodeState::Ready),
            node("n2", "wc_peeler", NodeKind::Peeler, NodeState::Ready),
        ]);
        h.queue.enqueue_batch(&[spec("mix", "pour")]).unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;

        assert_eq!(status, DispatchStatus::Success);
        assert_eq!(h.queue.len(), 1);
        assert!(h.block_map.is_empty());
        assert!(h.device.submitted().is_empty());
    }

    #[tokio::test]
    async fn errored_node_alerts_but_scan_continues() {
        let h = harness();
        h.registry.set_nodes(vec![
            node("n1", "wc_ot2_alpha", NodeKind::Ot2, NodeState::Error),
            node("n2", "wc_ot2_beta", NodeKind::Ot2, NodeState::Ready),
        ]);
        h.queue.enqueue_batch(&[spec("mix", "pour")]).unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;

        assert_eq!(status, DispatchStatus::Success);
        // The block went to the healthy node after the alert.
        assert_eq!(h.block_map.resolve("0-mix").as_deref(), Some("wc_ot2_beta"));
    }

    #[tokio::test]
    async fn one_block_per_ready_node_per_cycle() {
        let h = harness();
        h.registry.set_nodes(vec![
            node("n1", "wc_ot2_alpha", NodeKind::Ot2, NodeState::Ready),
            node("n2", "wc_ot2_beta", NodeKind::Ot2, NodeState::Ready),
        ]);
        h.queue
            .enqueue_batch(&[spec("a", "x"), spec("b", "y"), spec("c", "z")])
            .unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;

        assert_eq!(status, DispatchStatus::Success);
        // Two nodes, two dispatches; third block waits for next cycle.
        assert_eq!(h.queue.len(), 1);
        assert_eq!(h.block_map.resolve("0-a").as_deref(), Some("wc_ot2_alpha"));
        assert_eq!(h.block_map.resolve("0-b").as_deref(), Some("wc_ot2_beta"));
    }

    #[tokio::test]
    async fn registry_failure_is_cycle_error() {
        let h = harness();
        h.registry.fail_listing();
        h.queue.enqueue_batch(&[spec("mix", "pour")]).unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;
        assert_eq!(status, DispatchStatus::Error);
        // Nothing was dequeued.
        assert_eq!(h.queue.len(), 1);
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_block_dequeued_and_mapped() {
        let h = harness();
        h.registry.set_nodes(vec![node("n1", "wc_ot2_alpha", NodeKind::Ot2, NodeState::Ready)]);
        h.device.fail_add_work();
        h.queue.enqueue_batch(&[spec("mix", "pour")]).unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;

        assert_eq!(status, DispatchStatus::Error);
        // At-most-once: the failed block is not requeued, and the map
        // entry records the attempted placement.
        assert!(h.queue.is_empty());
        assert_eq!(h.block_map.resolve("0-mix").as_deref(), Some("wc_ot2_alpha"));
    }

    #[tokio::test]
    async fn protocol_load_failure_is_cycle_error() {
        let h = harness();
        h.registry.set_nodes(vec![node("n1", "wc_ot2_alpha", NodeKind::Ot2, NodeState::Ready)]);
        h.device.fail_load();
        h.queue.enqueue_batch(&[spec("mix", "pour")]).unwrap();

        let status = h.distributor.dispatch_cycle(&CancellationToken::new()).await;

        assert_eq!(status, DispatchStatus::Error);
        assert!(h.device.loaded().is_empty());
        assert!(h.device.submitted().is_empty());
    }

    #[tokio::test]
    async fn cancellation_is_fatal() {
        let h = harness();
        h.queue.enqueue_batch(&[spec("mix", "pour")]).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let status = h.distributor.dispatch_cycle(&cancel).await;
        assert_eq!(status, DispatchStatus::Fatal);
        assert_eq!(h.queue.len(), 1);
    }

    #[tokio::test]
    async fn run_publishes_error_state_and_stops_on_registry_outage() {
        let h = harness();
        h.registry.fail_listing();
        h.queue.enqueue_batch(&[spec("mix", "pour")]).unwrap();

        // The loop must terminate on its own (fail-fast), no
        // cancellation involved.
        h.distributor.run(CancellationToken::new()).await;

        assert_eq!(h.broadcaster.published(), vec![NodeState::Error]);
    }

    #[tokio::test]
    async fn run_stops_promptly_when_cancelled() {
        let h = harness();
        let cancel = CancellationToken::new();
        cancel.cancel();

        h.distributor.run(cancel).await;
        assert!(h.broadcaster.published().is_empty());
    }
}
