use crate::error::{EngineError, EngineResult};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::{DataNode, DataPath};
use tracing::trace;

/// `${Push key:"name", value|$value|@value:...}` binds a variable. An
/// unresolvable value binds null so a later `Pop` stays balanced.
pub struct PushCommand;

impl CommandHandler for PushCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Push"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let key = selection.require_str("key")?;
        let value = selection.resolve_value("value")?.unwrap_or_else(DataNode::null);
        trace!(key, "push");
        selection.model.scope_mut().push(key, value)?;
        Ok(CommandResult::Consumed)
    }
}

/// `${Pop key:"name"}` removes the most recent binding of a variable.
pub struct PopCommand;

impl CommandHandler for PopCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Pop"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let key = selection.require_str("key")?;
        trace!(key, "pop");
        match selection.model.scope_mut().pop(key) {
            Some(_) => Ok(CommandResult::Consumed),
            None => Err(EngineError::structure(format!("Pop of unbound variable '{}'", key))),
        }
    }
}

/// `${Model value:"path"}` moves the data cursor; `^` goes back to the root.
pub struct ModelCommand;

impl CommandHandler for ModelCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Model"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let path = DataPath::parse(selection.require_str("value")?)?;
        selection.model.enter(&path)?;
        Ok(CommandResult::Consumed)
    }
}
