use super::{describe_value, handle_missing};
use crate::error::{EngineError, EngineResult};
use crate::modifiers::{Modifier, ReplaceWithText};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::DataNode;

/// `${String value|$value|@value:..., onNull:..., fallback:...}`, also
/// written `${$path}` or `${@path}`
pub struct StringCommand;

impl CommandHandler for StringCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["String"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        match selection.resolve_value("value")? {
            None => {
                let what = describe_value(selection, "value");
                handle_missing(selection, &what)
            }
            Some(DataNode::Leaf(scalar)) if scalar.is_null() => {
                let what = describe_value(selection, "value");
                handle_missing(selection, &what)
            }
            Some(DataNode::Leaf(scalar)) => {
                let text = scalar.to_text();
                Ok(ReplaceWithText.modify(selection, text.as_str())?.into())
            }
            Some(_) => Err(EngineError::invalid_value(format!(
                "{} is not a single value",
                describe_value(selection, "value")
            ))),
        }
    }
}
