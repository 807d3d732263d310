pub mod block;
pub mod node;
pub mod status;

pub use block::{Block, BlockSpec, TaskInstruction};
pub use node::{NodeInfo, NodeKind, NodeState, NodeStateUpdate, SCHEDULER_NODE_TYPE};
pub use status::DispatchStatus;
