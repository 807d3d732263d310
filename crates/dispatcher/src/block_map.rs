use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

/// In-flight block → executing node mapping.
///
/// An entry appears when the distribution loop routes a block to a
/// node and disappears when that node reports a transition back to
/// READY carrying the block's name. Absence is meaningful: the block
/// is either not yet dispatched or already completed.
///
/// Safe under concurrent reads from query handlers, inserts from the
/// distribution loop, and deletes from notification handling. An
/// insert racing a delete for the same block is not expected (a node
/// cannot finish a block before being assigned it) and is treated as
/// an upstream invariant rather than locked against.
pub struct BlockRobotMap {
    inner: RwLock<HashMap<String, String>>,
}

impl BlockRobotMap {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Record (or overwrite) which node is executing a block.
    pub fn assign(&self, block_name: &str, node_name: &str) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(block_name.to_string(), node_name.to_string());
    }

    /// Look up the node executing a block, if any.
    pub fn resolve(&self, block_name: &str) -> Option<String> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(block_name).cloned()
    }

    /// Remove a block's entry. Idempotent: clearing a missing entry is
    /// a no-op.
    pub fn clear(&self, block_name: &str) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if map.remove(block_name).is_some() {
            debug!(block = %block_name, "block mapping cleared");
        }
    }

    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BlockRobotMap {
    fn default() -> Self {
        Self::new()
    }
}
