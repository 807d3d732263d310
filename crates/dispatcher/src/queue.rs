use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use tracing::{error, info};

use workcell_core::{Block, BlockSpec, SchedulerError, SchedulerResult};

struct QueueInner {
    blocks: VecDeque<Block>,
    next_tag: u64,
}

/// FIFO queue of pending blocks, owned exclusively by the scheduler.
///
/// All mutation goes through atomic enqueue/dequeue operations under a
/// single lock; readers never observe a partially appended batch. The
/// lock is never held across an await point.
pub struct ProtocolQueue {
    inner: Mutex<QueueInner>,
}

impl ProtocolQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                blocks: VecDeque::new(),
                next_tag: 0,
            }),
        }
    }

    /// Validate and append one submitted batch.
    ///
    /// Block names must be unique within the batch; the first duplicate
    /// rejects the whole batch and nothing is enqueued. On success the
    /// batch shares a single tag, every block name is rewritten to
    /// `"{tag}-{name}"`, the tag counter advances once, and all blocks
    /// land at the tail atomically. Returns the batch tag.
    pub fn enqueue_batch(&self, specs: &[BlockSpec]) -> SchedulerResult<u64> {
        let mut seen = HashSet::new();
        for spec in specs {
            if !seen.insert(spec.name.as_str()) {
                error!(block = %spec.name, "duplicate block name, batch rejected");
                return Err(SchedulerError::DuplicateBlockName(spec.name.clone()));
            }
        }

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let tag = inner.next_tag;

        // Parse the whole batch before touching the queue so a bad
        // instruction rejects the batch without consuming the tag.
        let blocks = specs
            .iter()
            .map(|spec| Block::from_spec(spec, tag))
            .collect::<SchedulerResult<Vec<_>>>()?;

        let count = blocks.len();
        inner.blocks.extend(blocks);
        inner.next_tag += 1;

        info!(tag, count, "batch enqueued");
        Ok(tag)
    }

    /// Pop the head block, strict FIFO.
    pub fn dequeue_front(&self) -> Option<Block> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.blocks.pop_front()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn with_next_tag(tag: u64) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                blocks: VecDeque::new(),
                next_tag: tag,
            }),
        }
    }
}

impl Default for ProtocolQueue {
    fn default() -> Self {
        Self::new()
    }
}
