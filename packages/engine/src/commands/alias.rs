use crate::alias::AliasDefinition;
use crate::error::{EngineError, EngineResult};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use serde_json::{Map, Value};

/// `${Alias key:"Name", replaceKey:"String", attributes:{...}, attrReplacements:{...}}`
///
/// Defines an alias for the rest of the run. `attributes` supplies
/// defaults for parameters a placeholder leaves out; `attrReplacements`
/// renames parameters, keeping their `$`/`@` prefix.
pub struct AliasCommand;

impl CommandHandler for AliasCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Alias"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let key = selection.require_str("key")?;
        let replace_key = selection.require_str("replaceKey")?;
        if key == replace_key {
            return Err(EngineError::invalid_value(format!("alias '{}' names itself", key)));
        }

        let mut alias = AliasDefinition::new(key, replace_key);
        if let Some(attributes) = object_param(selection, "attributes")? {
            alias.attributes = attributes.clone();
        }
        if let Some(replacements) = object_param(selection, "attrReplacements")? {
            for (from, to) in replacements {
                let to = to.as_str().ok_or_else(|| {
                    EngineError::invalid_value(format!("attrReplacements.{} must be a string", from))
                })?;
                alias.attr_replacements.insert(from.clone(), to.to_string());
            }
        }

        selection.aliases.define(alias);
        Ok(CommandResult::Consumed)
    }
}

fn object_param<'a>(selection: &Selection<'a>, key: &str) -> EngineResult<Option<&'a Map<String, Value>>> {
    match selection.invocation.param(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(EngineError::invalid_value(format!("'{}' must be an object", key))),
    }
}
