pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use errors::{SchedulerError, SchedulerResult};
pub use models::{
    Block, BlockSpec, DispatchStatus, NodeInfo, NodeKind, NodeState, NodeStateUpdate,
    TaskInstruction, SCHEDULER_NODE_TYPE,
};
