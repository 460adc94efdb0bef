use docweave_common::ProblemKind;
use docweave_document::DocumentError;
use docweave_model::DataPathError;
use docweave_parser::ParseError;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid condition at '{path}': {message}")]
    InvalidCondition { path: String, message: String },

    #[error("Unresolvable area: {0}")]
    UnresolvableArea(String),

    #[error("Failed to read resource '{resource}': {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Missing value for '{0}'")]
    MissingValue(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid placeholder structure: {0}")]
    InvalidPlaceholderStructure(String),

    #[error("Placeholder parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    DataPath(#[from] DataPathError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Scan stopped after {0} placeholder dispatches")]
    StepLimit(usize),
}

impl EngineError {
    pub fn invalid_condition(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCondition {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(resource: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            resource: resource.into(),
            source,
        }
    }

    pub fn structure(message: impl Into<String>) -> Self {
        Self::InvalidPlaceholderStructure(message.into())
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Category used in the run's warnings manifest
    pub fn kind(&self) -> ProblemKind {
        match self {
            EngineError::InvalidCondition { .. } => ProblemKind::InvalidCondition,
            EngineError::UnresolvableArea(_) => ProblemKind::UnresolvableArea,
            EngineError::Io { .. } => ProblemKind::IoFailure,
            EngineError::UnknownCommand(_) => ProblemKind::UnknownCommand,
            EngineError::MissingValue(_) => ProblemKind::MissingValue,
            EngineError::InvalidValue(_) | EngineError::DataPath(_) => ProblemKind::InvalidValue,
            EngineError::InvalidPlaceholderStructure(_) | EngineError::Document(_) => {
                ProblemKind::InvalidPlaceholderStructure
            }
            EngineError::Parse(_) => ProblemKind::PlaceholderParseError,
            EngineError::StepLimit(_) => ProblemKind::CommandHandlerFailed,
        }
    }
}
