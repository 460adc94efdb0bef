//! Document tree and placeholder toolkit
//!
//! ## Overview
//!
//! [`Document`] is an ordered, mutable tree with stable [`NodeId`] handles.
//! [`PlaceholderToolkit`] is the document-kind specific layer the engine
//! drives: it finds placeholder markers, rewrites them and removes them.
//! [`TextToolkit`] implements it for plain-text documents.

pub mod error;
pub mod text;
pub mod toolkit;
pub mod tree;

#[cfg(test)]
mod tests_toolkit;

pub use error::{DocumentError, DocumentResult};
pub use text::{DOC_TAG, IMAGE_TAG, PARAGRAPH_TAG};
pub use toolkit::{ImageElement, PlaceholderToolkit, TextToolkit};
pub use tree::{Descendants, Document, NodeData, NodeId, SplitSide};
