use thiserror::Error;

/// Scheduler error types
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("duplicate block name in batch: {0}")]
    DuplicateBlockName(String),

    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("device dispatch to node {node} failed: {message}")]
    DeviceDispatch { node: String, message: String },

    #[error("state broadcast error: {0}")]
    Broadcast(String),

    #[error("workflow file error: {0}")]
    WorkflowFile(String),

    #[error("invalid task instruction: {0}")]
    InvalidInstruction(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for SchedulerError {
    fn from(err: config::ConfigError) -> Self {
        SchedulerError::Configuration(err.to_string())
    }
}

/// Unified Result type
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;
