use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use workcell_api::{create_routes, AppState};
use workcell_core::traits::{DeviceClient, RegistryClient, StateBroadcaster};
use workcell_core::{AppConfig, NodeState, SCHEDULER_NODE_TYPE};
use workcell_dispatcher::retry::retry;
use workcell_dispatcher::{
    workflow, BlockDistributor, BlockRobotMap, ProtocolQueue, StateListener, StatePublisher,
};
use workcell_infrastructure::{HttpDeviceClient, HttpRegistryClient, HttpStateBroadcaster};

const STATE_UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Wires the scheduler together and drives its lifecycle: register,
/// preload, serve, and deregister on shutdown.
pub struct Application {
    config: AppConfig,
    queue: Arc<ProtocolQueue>,
    block_map: Arc<BlockRobotMap>,
    registry: Arc<dyn RegistryClient>,
    device: Arc<dyn DeviceClient>,
    publisher: Arc<StatePublisher>,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        let timeout = Duration::from_secs(config.registry.request_timeout_seconds);
        let base_url = config.registry.base_url.clone();

        let registry: Arc<dyn RegistryClient> =
            Arc::new(HttpRegistryClient::new(base_url.clone(), timeout));
        let device: Arc<dyn DeviceClient> =
            Arc::new(HttpDeviceClient::new(base_url.clone(), timeout));
        let broadcaster: Arc<dyn StateBroadcaster> =
            Arc::new(HttpStateBroadcaster::new(base_url, timeout));

        Self::with_collaborators(config, registry, device, broadcaster)
    }

    fn with_collaborators(
        config: AppConfig,
        registry: Arc<dyn RegistryClient>,
        device: Arc<dyn DeviceClient>,
        broadcaster: Arc<dyn StateBroadcaster>,
    ) -> Self {
        let publisher = Arc::new(StatePublisher::new(
            broadcaster,
            config.scheduler.name.clone(),
            config.dispatcher.state_publish_attempts,
            Duration::from_secs(config.dispatcher.state_publish_delay_seconds),
        ));

        Self {
            config,
            queue: Arc::new(ProtocolQueue::new()),
            block_map: Arc::new(BlockRobotMap::new()),
            registry,
            device,
            publisher,
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.register().await?;
        self.publisher.publish(NodeState::Ready).await;

        if let Some(path) = &self.config.workflow.path {
            let tag = workflow::preload(&self.queue, Path::new(path))
                .with_context(|| format!("failed to preload workflow {path}"))?;
            info!(%path, tag, "initial workflow enqueued");
        }

        let cancel = CancellationToken::new();
        let (update_tx, update_rx) = mpsc::channel(STATE_UPDATE_CHANNEL_CAPACITY);

        let distributor = BlockDistributor::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.block_map),
            Arc::clone(&self.registry),
            Arc::clone(&self.device),
            Arc::clone(&self.publisher),
            self.config.scheduler.device_kind,
            Duration::from_secs(self.config.dispatcher.dispatch_interval_seconds),
        );
        let distributor_handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move { distributor.run(cancel).await })
        };

        let listener = StateListener::new(Arc::clone(&self.block_map));
        let listener_handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move { listener.run(update_rx, cancel).await })
        };

        let api_handle = if self.config.api.enabled {
            Some(self.serve_api(update_tx, cancel.clone()).await?)
        } else {
            None
        };

        crate::shutdown::wait_for_shutdown_signal().await;
        info!("shutting down");
        cancel.cancel();

        for (name, handle) in [
            ("distributor", Some(distributor_handle)),
            ("state listener", Some(listener_handle)),
            ("api server", api_handle),
        ] {
            let Some(handle) = handle else { continue };
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "task terminated abnormally");
            }
        }

        self.deregister().await;
        info!("workcell scheduler stopped");
        Ok(())
    }

    /// Register with the master, retrying for as long as the
    /// configured budget allows. The registry may come up later than
    /// the scheduler, so the budget is generous by default.
    ///
    /// Registration is under the scheduler's own node type, never the
    /// device kind it dispatches to; the distribution loop must not
    /// see the scheduler as a dispatch target.
    async fn register(&self) -> Result<()> {
        let kind = SCHEDULER_NODE_TYPE;
        let name = &self.config.scheduler.name;

        let status = retry(
            || self.registry.register(kind, name),
            self.config.registry.register_max_attempts,
            Duration::from_secs(self.config.registry.register_retry_delay_seconds),
        )
        .await
        .unwrap_or(workcell_core::DispatchStatus::Error);

        if status.is_failure() {
            anyhow::bail!("unable to register '{name}' with master: {status}");
        }

        info!(%name, kind, "registered with master");
        Ok(())
    }

    /// Best-effort deregistration; failure is logged, not fatal, since
    /// the process is exiting either way.
    async fn deregister(&self) {
        let name = &self.config.scheduler.name;

        let status = retry(
            || self.registry.deregister(name),
            self.config.registry.deregister_max_attempts,
            Duration::from_millis(self.config.registry.deregister_retry_delay_ms),
        )
        .await
        .unwrap_or(workcell_core::DispatchStatus::Error);

        if status.is_failure() {
            warn!(%name, %status, "deregistration failed, master may hold a stale entry");
        } else {
            info!(%name, "deregistered from master");
        }
    }

    async fn serve_api(
        &self,
        update_tx: mpsc::Sender<workcell_core::NodeStateUpdate>,
        cancel: CancellationToken,
    ) -> Result<tokio::task::JoinHandle<()>> {
        let state = AppState::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.block_map),
            update_tx,
        );
        let router = create_routes(state);

        let listener = tokio::net::TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("failed to bind {}", self.config.api.bind_address))?;
        info!(address = %self.config.api.bind_address, "api server listening");

        Ok(tokio::spawn(async move {
            let shutdown = async move { cancel.cancelled().await };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "api server error");
            }
        }))
    }
}
