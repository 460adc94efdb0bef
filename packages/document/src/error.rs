use crate::tree::NodeId;
use thiserror::Error;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("The root node cannot be moved or removed")]
    RootNode,

    #[error("Node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("Node {0:?} is not attached to a parent")]
    Detached(NodeId),

    #[error("Inserting {node:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, node: NodeId },

    #[error("Node {0:?} belongs to another document")]
    ForeignNode(NodeId),

    #[error("Node {0:?} is not a text node")]
    NotText(NodeId),

    #[error("Node {0:?} is not a placeholder")]
    NotPlaceholder(NodeId),

    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}
