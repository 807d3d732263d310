//! Startup workflow preload.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use workcell_core::{BlockSpec, SchedulerError, SchedulerResult};

use crate::queue::ProtocolQueue;

/// On-disk workflow document: a list of block specs to enqueue at
/// startup.
#[derive(Debug, Deserialize)]
pub struct WorkflowFile {
    pub blocks: Vec<BlockSpec>,
}

/// Read and parse a workflow JSON file.
pub fn load_workflow(path: &Path) -> SchedulerResult<WorkflowFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SchedulerError::WorkflowFile(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        SchedulerError::WorkflowFile(format!("cannot parse {}: {e}", path.display()))
    })
}

/// Load a workflow file and enqueue its blocks as one tagged batch.
///
/// Any failure (unreadable file, malformed JSON, duplicate block name,
/// bad instruction) rejects the whole file; nothing is enqueued.
pub fn preload(queue: &ProtocolQueue, path: &Path) -> SchedulerResult<u64> {
    let workflow = load_workflow(path)?;
    let tag = queue.enqueue_batch(&workflow.blocks)?;
    info!(
        path = %path.display(),
        blocks = workflow.blocks.len(),
        tag,
        "workflow preloaded"
    );
    Ok(tag)
}
