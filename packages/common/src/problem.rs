use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a per-placeholder failure recorded during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProblemKind {
    CommandHandlerFailed,
    UnknownCommand,
    PlaceholderParseError,
    InvalidPlaceholderStructure,
    InvalidCondition,
    UnresolvableArea,
    MissingValue,
    InvalidValue,
    IoFailure,
}

impl ProblemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemKind::CommandHandlerFailed => "command-handler-failed",
            ProblemKind::UnknownCommand => "unknown-command",
            ProblemKind::PlaceholderParseError => "placeholder-parse-error",
            ProblemKind::InvalidPlaceholderStructure => "invalid-placeholder-structure",
            ProblemKind::InvalidCondition => "invalid-condition",
            ProblemKind::UnresolvableArea => "unresolvable-area",
            ProblemKind::MissingValue => "missing-value",
            ProblemKind::InvalidValue => "invalid-value",
            ProblemKind::IoFailure => "io-failure",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry in the warnings manifest of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub kind: ProblemKind,

    /// Human-readable message
    pub message: String,

    /// Command name of the failing invocation, when it was parsed
    pub command: Option<String>,

    /// Raw marker text of the failing placeholder
    pub placeholder: Option<String>,
}

impl Problem {
    pub fn new(kind: ProblemKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            command: None,
            placeholder: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(command) = &self.command {
            write!(f, " {}:", command)?;
        }
        write!(f, " {}", self.message)?;
        if let Some(placeholder) = &self.placeholder {
            write!(f, " (at {})", placeholder)?;
        }
        Ok(())
    }
}
