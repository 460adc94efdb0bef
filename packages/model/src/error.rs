use thiserror::Error;

pub type DataPathResult<T> = Result<T, DataPathError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataPathError {
    #[error("Invalid data path '{path}' at {pos}: {message}")]
    InvalidPath {
        path: String,
        pos: usize,
        message: String,
    },

    #[error("Invalid variable name '{0}'")]
    InvalidVariableName(String),

    #[error("Variable reference is not allowed in '{0}'")]
    VariableNotAllowed(String),
}

impl DataPathError {
    pub fn invalid_path(path: impl Into<String>, pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            pos,
            message: message.into(),
        }
    }
}
