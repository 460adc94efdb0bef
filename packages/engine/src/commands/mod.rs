//! Built-in commands

mod alias;
mod clone;
mod compute;
mod condition;
mod counter;
mod date;
mod ignore;
mod image;
mod import;
mod join;
mod loops;
mod number;
mod scope;
mod string;

pub use alias::AliasCommand;
pub use clone::CloneCommand;
pub use compute::{CalcCommand, ConcatCommand};
pub use condition::{ClosingMarker, IfCommand};
pub use counter::CounterCommand;
pub use date::{DateCommand, TimeCommand};
pub use ignore::IgnoreCommand;
pub use image::ImageCommand;
pub use import::ImportCommand;
pub use join::JoinCommand;
pub use loops::ForCommand;
pub use number::NumberCommand;
pub use scope::{ModelCommand, PopCommand, PushCommand};
pub use string::StringCommand;

use crate::error::{EngineError, EngineResult};
use crate::modifiers::{DeletePlaceholder, Modifier, ReplaceWithText};
use crate::registry::CommandResult;
use crate::selection::Selection;

/// What a value command does when its value is absent or null
/// (`onNull` parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingData {
    /// Replace the placeholder with nothing
    Empty,
    /// Replace the placeholder with the `fallback` parameter
    Fallback,
    KeepPlaceholder,
    DeletePlaceholder,
    Fail,
}

impl MissingData {
    pub fn from_selection(selection: &Selection<'_>) -> EngineResult<Self> {
        match selection.str_param("onNull") {
            None if selection.invocation.has_param("fallback") => Ok(MissingData::Fallback),
            None | Some("empty") => Ok(MissingData::Empty),
            Some("fallback") => Ok(MissingData::Fallback),
            Some("keepPlaceholder") => Ok(MissingData::KeepPlaceholder),
            Some("deletePlaceholder") => Ok(MissingData::DeletePlaceholder),
            Some("fail") => Ok(MissingData::Fail),
            Some(other) => Err(EngineError::invalid_value(format!(
                "unknown onNull strategy '{}'",
                other
            ))),
        }
    }
}

/// Apply the selection's missing-data strategy.
pub(crate) fn handle_missing(selection: &mut Selection<'_>, what: &str) -> EngineResult<CommandResult> {
    match MissingData::from_selection(selection)? {
        MissingData::Empty => Ok(ReplaceWithText.modify(selection, "")?.into()),
        MissingData::Fallback => {
            let fallback = selection
                .invocation
                .param("fallback")
                .map(|value| match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .unwrap_or_default();
            Ok(ReplaceWithText.modify(selection, &fallback)?.into())
        }
        MissingData::KeepPlaceholder => Ok(CommandResult::Ignored),
        MissingData::DeletePlaceholder => Ok(DeletePlaceholder.modify(selection, ())?.into()),
        MissingData::Fail => Err(EngineError::MissingValue(what.to_string())),
    }
}

/// Human-readable name of the value parameter, for messages
pub(crate) fn describe_value(selection: &Selection<'_>, key: &str) -> String {
    let invocation = selection.invocation;
    for spelled in [key.to_string(), format!("${}", key), format!("@{}", key)] {
        if let Some(value) = invocation.param(&spelled) {
            return match value.as_str() {
                Some(path) => format!("{}:{}", spelled, path),
                None => spelled,
            };
        }
    }
    key.to_string()
}
