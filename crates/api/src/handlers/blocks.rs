use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::response;
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct BlockPlacement {
    pub robot_name: String,
}

/// Which node a dispatched block is running on.
///
/// A block with no entry answers 404 with `robot_name: "unknown"`,
/// both before dispatch and after completion clears the entry.
pub async fn get_block_robot(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.block_map.resolve(&name) {
        Some(robot_name) => response::success(BlockPlacement { robot_name }).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "ERROR", "robot_name": "unknown" })),
        )
            .into_response(),
    }
}
