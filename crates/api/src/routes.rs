use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use workcell_core::NodeStateUpdate;
use workcell_dispatcher::{BlockRobotMap, ProtocolQueue};

use crate::handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<ProtocolQueue>,
    pub block_map: Arc<BlockRobotMap>,
    pub update_tx: mpsc::Sender<NodeStateUpdate>,
}

impl AppState {
    pub fn new(
        queue: Arc<ProtocolQueue>,
        block_map: Arc<BlockRobotMap>,
        update_tx: mpsc::Sender<NodeStateUpdate>,
    ) -> Self {
        Self {
            queue,
            block_map,
            update_tx,
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/work", post(handlers::work::submit_work))
        .route(
            "/api/blocks/{name}/robot",
            get(handlers::blocks::get_block_robot),
        )
        .route(
            "/api/state-updates",
            post(handlers::state_updates::submit_state_update),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
