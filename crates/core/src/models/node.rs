use serde::{Deserialize, Serialize};

/// Registration type the scheduler itself uses with the master.
///
/// Deliberately not a `NodeKind`: the scheduler is not a device and
/// must never match the distribution loop's kind filter, or it could
/// be handed one of its own blocks.
pub const SCHEDULER_NODE_TYPE: &str = "scheduler";

/// Device kind of a worker node.
///
/// The workcell runs a small closed set of device types; the scheduler
/// only ever dispatches to one configured kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "OT_2")]
    Ot2,
    #[serde(rename = "ARM")]
    Arm,
    #[serde(rename = "PEELER")]
    Peeler,
    #[serde(rename = "SEALER")]
    Sealer,
    #[serde(rename = "PLATE_STACKER")]
    PlateStacker,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Ot2 => "OT_2",
            NodeKind::Arm => "ARM",
            NodeKind::Peeler => "PEELER",
            NodeKind::Sealer => "SEALER",
            NodeKind::PlateStacker => "PLATE_STACKER",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported state of a node; also used for the scheduler's own
/// externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "BUSY")]
    Busy,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "QUEUED")]
    Queued,
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl NodeState {
    pub fn is_ready(&self) -> bool {
        matches!(self, NodeState::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Ready => "READY",
            NodeState::Busy => "BUSY",
            NodeState::Error => "ERROR",
            NodeState::Queued => "QUEUED",
            NodeState::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a worker node as reported by the registry.
///
/// Read-only from the scheduler's perspective; the registry is the
/// source of truth and this is a cache-free query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub state: NodeState,
}

/// Inbound state-update notification from any device kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStateUpdate {
    pub state: NodeState,
    #[serde(rename = "block_name")]
    pub block_name: String,
}
