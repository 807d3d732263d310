use serde::{Deserialize, Serialize};

/// Outcome taxonomy shared by the retry wrapper, the distribution
/// cycle, and collaborator calls.
///
/// `Error` is recoverable (by retry or by an operator); `Fatal` means
/// stop the affected loop now and is never retried. `Waiting` is the
/// no-work case and not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "FATAL")]
    Fatal,
    #[serde(rename = "WAITING")]
    Waiting,
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl DispatchStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, DispatchStatus::Error)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DispatchStatus::Fatal)
    }

    /// True for Error and Fatal alike: the caller cannot proceed.
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchStatus::Error | DispatchStatus::Fatal)
    }
}

impl std::fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DispatchStatus::Success => "SUCCESS",
            DispatchStatus::Warning => "WARNING",
            DispatchStatus::Error => "ERROR",
            DispatchStatus::Fatal => "FATAL",
            DispatchStatus::Waiting => "WAITING",
            DispatchStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_covers_error_and_fatal() {
        assert!(DispatchStatus::Error.is_failure());
        assert!(DispatchStatus::Fatal.is_failure());
        assert!(!DispatchStatus::Waiting.is_failure());
        assert!(!DispatchStatus::Success.is_failure());
    }

    #[test]
    fn wire_spelling_round_trip() {
        let json = serde_json::to_string(&DispatchStatus::Waiting).unwrap();
        assert_eq!(json, "\"WAITING\"");
        let status: DispatchStatus = serde_json::from_str("\"FATAL\"").unwrap();
        assert_eq!(status, DispatchStatus::Fatal);
    }
}
