use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use workcell_core::BlockSpec;

use crate::error::ApiResult;
use crate::response;
use crate::routes::AppState;

/// A batch of blocks to schedule, same shape as a workflow file.
#[derive(Debug, Deserialize)]
pub struct WorkRequest {
    pub blocks: Vec<BlockSpec>,
}

#[derive(Debug, Serialize)]
pub struct WorkAccepted {
    pub tag: u64,
    pub queued: usize,
}

pub async fn submit_work(
    State(state): State<AppState>,
    Json(request): Json<WorkRequest>,
) -> ApiResult<impl IntoResponse> {
    let queued = request.blocks.len();
    let tag = state.queue.enqueue_batch(&request.blocks)?;
    info!(tag, queued, "work batch accepted");
    Ok(response::created(WorkAccepted { tag, queued }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use workcell_dispatcher::{BlockRobotMap, ProtocolQueue};

    use super::*;
    use crate::error::ApiError;
    use workcell_core::SchedulerError;

    fn state() -> AppState {
        let (tx, _rx) = mpsc::channel(8);
        AppState::new(
            Arc::new(ProtocolQueue::new()),
            Arc::new(BlockRobotMap::new()),
            tx,
        )
    }

    fn spec(name: &str, tasks: &str) -> BlockSpec {
        BlockSpec {
            name: name.to_string(),
            tasks: tasks.to_string(),
        }
    }

    #[tokio::test]
    async fn submitted_batch_lands_in_queue() {
        let state = AppState::new(
            Arc::new(ProtocolQueue::new()),
            Arc::new(BlockRobotMap::new()),
            mpsc::channel(8).0,
        );
        let queue = Arc::clone(&state.queue);

        let result = submit_work(
            State(state),
            Json(WorkRequest {
                blocks: vec![spec("mix", "pour"), spec("seal", "press")],
            }),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let result = submit_work(
            State(state()),
            Json(WorkRequest {
                blocks: vec![spec("mix", "pour"), spec("mix", "stir")],
            }),
        )
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Scheduler(SchedulerError::DuplicateBlockName(_)))
        ));
    }
}
