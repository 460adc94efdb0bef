//! Template command engine
//!
//! ## Overview
//!
//! [`Engine::run`] scans a [`Document`](docweave_document::Document) for
//! placeholders, parses each into command invocations and executes them
//! against a [`ModelAccess`](docweave_model::ModelAccess):
//!
//! ```text
//! scan ──▶ placeholder ──▶ parse payload ──▶ registry lookup ──▶ command
//!   ▲                                                              │
//!   └──────────────────── continuation ◀──── modifiers ◀───────────┘
//! ```
//!
//! Commands edit the tree only through [`modifiers`], which report where
//! scanning resumes. Failures of a single placeholder are collected in the
//! [`RunReport`] unless the configuration asks to fail fast.

pub mod alias;
pub mod commands;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod modifiers;
pub mod registry;
pub mod resource;
pub mod selection;

#[cfg(test)]
mod tests_commands;
#[cfg(test)]
mod tests_condition;
#[cfg(test)]
mod tests_modifiers;

pub use alias::{AliasDefinition, AliasTable};
pub use condition::{Comparison, ComparisonOp, ConditionElement, ConditionKind, FieldRef};
pub use config::{EngineConfig, UnknownCommandPolicy};
pub use engine::{Engine, RunReport};
pub use error::{EngineError, EngineResult};
pub use modifiers::{Continuation, Modifier, ModifierResult};
pub use registry::{CommandHandler, CommandRegistry, CommandResult};
pub use resource::{
    FsResourceProvider, ImageDimensions, MemoryResourceProvider, NoResources, Resource, ResourceProvider,
};
pub use selection::{Selection, Services};
