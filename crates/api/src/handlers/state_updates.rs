use axum::{extract::State, response::IntoResponse, Json};
use tracing::debug;

use workcell_core::NodeStateUpdate;

use crate::error::{ApiError, ApiResult};
use crate::response;
use crate::routes::AppState;

/// Inbound state notification from a device node. Forwarded to the
/// listener; accepted as soon as it is queued.
pub async fn submit_state_update(
    State(state): State<AppState>,
    Json(update): Json<NodeStateUpdate>,
) -> ApiResult<impl IntoResponse> {
    debug!(block = %update.block_name, state = %update.state, "state update received");
    state
        .update_tx
        .send(update)
        .await
        .map_err(|_| ApiError::Internal("state listener unavailable".to_string()))?;
    Ok(response::accepted())
}
