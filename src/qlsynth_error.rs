// SPDX-License-Identifier: Apache-2.0

/// Coarse classification of a `QlsynthError`, used by callers that only care
/// about which phase of a run rejected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected while resolving options or the run range; nothing ran.
    Configuration,
    /// The design was not in a state the script can start from.
    Precondition,
    /// An invoked operation reported failure; the run was aborted in place.
    Operation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QlsynthError {
    UnknownFamily(String),
    UnknownStageLabel(String),
    InvertedRange {
        from: String,
        to: String,
    },
    Precondition(String),
    OperationFailed {
        stage: &'static str,
        command: String,
        cause: String,
    },
}

impl QlsynthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QlsynthError::UnknownFamily(_)
            | QlsynthError::UnknownStageLabel(_)
            | QlsynthError::InvertedRange { .. } => ErrorKind::Configuration,
            QlsynthError::Precondition(_) => ErrorKind::Precondition,
            QlsynthError::OperationFailed { .. } => ErrorKind::Operation,
        }
    }
}

impl std::fmt::Display for QlsynthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QlsynthError::UnknownFamily(family) => write!(
                f,
                "invalid family specified: '{}' (supported: {})",
                family,
                crate::family::Family::ALL
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            QlsynthError::UnknownStageLabel(label) => {
                write!(f, "unknown stage label: '{}'", label)
            }
            QlsynthError::InvertedRange { from, to } => write!(
                f,
                "run range start '{}' comes after end '{}' in the stage order",
                from, to
            ),
            QlsynthError::Precondition(message) => {
                write!(f, "design precondition failed: {}", message)
            }
            QlsynthError::OperationFailed {
                stage,
                command,
                cause,
            } => write!(
                f,
                "operation failed in stage '{}': `{}`: {}",
                stage, command, cause
            ),
        }
    }
}

impl std::error::Error for QlsynthError {}
