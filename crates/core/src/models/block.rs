use serde::{Deserialize, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};

/// A block as submitted by a client: a name and a space-separated task
/// string, not yet tagged or parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSpec {
    #[serde(rename = "block-name")]
    pub name: String,
    pub tasks: String,
}

/// A single task inside a block.
///
/// Direct instructions are routed verbatim to the device; transfer
/// instructions reference two block names that must be tag-qualified
/// before dispatch so transfers resolve against globally unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInstruction {
    Direct(String),
    Transfer { source: String, destination: String },
}

impl TaskInstruction {
    /// Parse a single task token from the wire form.
    ///
    /// `transfer:A:B` is a transfer from block `A` to block `B`; any
    /// other token is an opaque direct instruction.
    pub fn parse(token: &str) -> SchedulerResult<Self> {
        if let Some(rest) = token.strip_prefix("transfer:") {
            let mut parts = rest.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(source), Some(destination), None)
                    if !source.is_empty() && !destination.is_empty() =>
                {
                    Ok(TaskInstruction::Transfer {
                        source: source.to_string(),
                        destination: destination.to_string(),
                    })
                }
                _ => Err(SchedulerError::InvalidInstruction(token.to_string())),
            }
        } else {
            Ok(TaskInstruction::Direct(token.to_string()))
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, TaskInstruction::Transfer { .. })
    }
}

/// A tagged unit of work: an ordered task list bound for a single node.
#[derive(Debug, Clone)]
pub struct Block {
    /// Tag-qualified name, globally unique across submissions.
    pub name: String,
    /// Batch tag, shared by every block submitted in the same batch.
    pub tag: u64,
    pub tasks: Vec<TaskInstruction>,
}

impl Block {
    /// Build a tagged block from a submitted spec.
    ///
    /// The name becomes `"{tag}-{original}"`; the task string is split
    /// on whitespace and each token parsed.
    pub fn from_spec(spec: &BlockSpec, tag: u64) -> SchedulerResult<Self> {
        let tasks = spec
            .tasks
            .split_whitespace()
            .map(TaskInstruction::parse)
            .collect::<SchedulerResult<Vec<_>>>()?;

        Ok(Self {
            name: format!("{}-{}", tag, spec.name),
            tag,
            tasks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_direct_instruction() {
        let task = TaskInstruction::parse("pour").unwrap();
        assert_eq!(task, TaskInstruction::Direct("pour".to_string()));
        assert!(!task.is_transfer());
    }

    #[test]
    fn parse_transfer_instruction() {
        let task = TaskInstruction::parse("transfer:A:B").unwrap();
        assert_eq!(
            task,
            TaskInstruction::Transfer {
                source: "A".to_string(),
                destination: "B".to_string(),
            }
        );
        assert!(task.is_transfer());
    }

    #[test]
    fn parse_malformed_transfer_is_rejected() {
        assert!(TaskInstruction::parse("transfer:A").is_err());
        assert!(TaskInstruction::parse("transfer:A:B:C").is_err());
        assert!(TaskInstruction::parse("transfer::B").is_err());
    }

    #[test]
    fn block_from_spec_tags_name_and_splits_tasks() {
        let spec = BlockSpec {
            name: "mix".to_string(),
            tasks: "pour stir transfer:A:B".to_string(),
        };
        let block = Block::from_spec(&spec, 7).unwrap();

        assert_eq!(block.name, "7-mix");
        assert_eq!(block.tag, 7);
        assert_eq!(block.tasks.len(), 3);
        assert!(block.tasks[2].is_transfer());
    }

    #[test]
    fn block_spec_deserializes_wire_field_names() {
        let spec: BlockSpec =
            serde_json::from_str(r#"{"block-name": "mix", "tasks": "pour stir"}"#).unwrap();
        assert_eq!(spec.name, "mix");
        assert_eq!(spec.tasks, "pour stir");
    }
}
