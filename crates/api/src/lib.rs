//! HTTP surface of the workcell scheduler: work submission, block
//! placement queries, and inbound node state updates.

pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use routes::{create_routes, AppState};
