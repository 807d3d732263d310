pub mod mocks {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use workcell_core::traits::{DeviceClient, RegistryClient, StateBroadcaster};
    use workcell_core::{
        DispatchStatus, NodeInfo, NodeKind, NodeState, SchedulerError, SchedulerResult,
    };

    pub fn node(id: &str, name: &str, kind: NodeKind, state: NodeState) -> NodeInfo {
        NodeInfo {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            state,
        }
    }

    #[derive(Default)]
    pub struct MockRegistryClient {
        nodes: Mutex<Vec<NodeInfo>>,
        fail_listing: AtomicBool,
        pub register_calls: AtomicU32,
        pub deregister_calls: AtomicU32,
    }

    impl MockRegistryClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_nodes(&self, nodes: Vec<NodeInfo>) {
            *self.nodes.lock().unwrap() = nodes;
        }

        pub fn fail_listing(&self) {
            self.fail_listing.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl RegistryClient for MockRegistryClient {
        async fn register(&self, _kind: &str, _name: &str) -> SchedulerResult<DispatchStatus> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            Ok(DispatchStatus::Success)
        }

        async fn deregister(&self, _name: &str) -> SchedulerResult<DispatchStatus> {
            self.deregister_calls.fetch_add(1, Ordering::SeqCst);
            Ok(DispatchStatus::Success)
        }

        async fn list_nodes(&self) -> SchedulerResult<Vec<NodeInfo>> {
            if self.fail_listing.load(Ordering::SeqCst) {
                return Err(SchedulerError::RegistryUnavailable(
                    "mock registry down".to_string(),
                ));
            }
            Ok(self.nodes.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    pub struct MockDeviceClient {
        /// (node id, translated instruction list, block name) per
        /// add_work call.
        submitted: Mutex<Vec<(String, Vec<String>, String)>>,
        loaded: Mutex<Vec<String>>,
        fail_add_work: AtomicBool,
        fail_load: AtomicBool,
    }

    impl MockDeviceClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_add_work(&self) {
            self.fail_add_work.store(true, Ordering::SeqCst);
        }

        pub fn fail_load(&self) {
            self.fail_load.store(true, Ordering::SeqCst);
        }

        pub fn submitted(&self) -> Vec<(String, Vec<String>, String)> {
            self.submitted.lock().unwrap().clone()
        }

        pub fn loaded(&self) -> Vec<String> {
            self.loaded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeviceClient for MockDeviceClient {
        async fn load_protocol(
            &self,
            node: &NodeInfo,
            instruction: &str,
        ) -> SchedulerResult<String> {
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(SchedulerError::DeviceDispatch {
                    node: node.id.clone(),
                    message: "mock load failure".to_string(),
                });
            }
            self.loaded.lock().unwrap().push(instruction.to_string());
            // Echo the instruction as the protocol identifier so tests
            // can assert on the submitted list directly.
            Ok(instruction.to_string())
        }

        async fn add_work(
            &self,
            node: &NodeInfo,
            instructions: &[String],
            block_name: &str,
        ) -> SchedulerResult<DispatchStatus> {
            if self.fail_add_work.load(Ordering::SeqCst) {
                return Err(SchedulerError::DeviceDispatch {
                    node: node.id.clone(),
                    message: "mock add_work failure".to_string(),
                });
            }
            self.submitted.lock().unwrap().push((
                node.id.clone(),
                instructions.to_vec(),
                block_name.to_string(),
            ));
            Ok(DispatchStatus::Success)
        }
    }

    #[derive(Default)]
    pub struct MockBroadcaster {
        published: Mutex<Vec<NodeState>>,
        attempts: AtomicU32,
        failing: AtomicBool,
    }

    impl MockBroadcaster {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            let mock = Self::default();
            mock.failing.store(true, Ordering::SeqCst);
            mock
        }

        pub fn published(&self) -> Vec<NodeState> {
            self.published.lock().unwrap().clone()
        }

        pub fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StateBroadcaster for MockBroadcaster {
        async fn broadcast(
            &self,
            _scheduler_id: &str,
            state: NodeState,
        ) -> SchedulerResult<DispatchStatus> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(SchedulerError::Broadcast("mock broadcast down".to_string()));
            }
            self.published.lock().unwrap().push(state);
            Ok(DispatchStatus::Success)
        }
    }
}
