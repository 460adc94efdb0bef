//! Data model for template runs
//!
//! A run reads application data through three pieces:
//!
//! - [`DataNode`]: the data tree itself (leaves, maps and lists)
//! - [`DataPath`]: navigation steps with a small textual syntax
//!   (`a.b[0]`, `<` for the parent, `^` for the root, `$var.sub`)
//! - [`VariableScope`]: per-run stacks of named bindings
//!
//! [`ModelAccess`] bundles them with the current data cursor.

pub mod access;
pub mod error;
pub mod node;
pub mod path;
pub mod scope;

#[cfg(test)]
mod tests_path;

pub use access::{ModelAccess, ValueSource};
pub use error::{DataPathError, DataPathResult};
pub use node::{DataNode, NodeKind, Scalar};
pub use path::{DataPath, PathElement};
pub use scope::VariableScope;
