use super::{describe_value, handle_missing};
use crate::error::{EngineError, EngineResult};
use crate::modifiers::{Modifier, ReplaceWithText};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::DataNode;

/// `${Join $value:"names", separator:", ", lastSeparator:" and ", limit:3, truncated:"..."}`
pub struct JoinCommand;

impl CommandHandler for JoinCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Join"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let items: Vec<String> = match selection.resolve_value("value")? {
            None => {
                let what = describe_value(selection, "value");
                return handle_missing(selection, &what);
            }
            Some(node) if node.is_null() => {
                let what = describe_value(selection, "value");
                return handle_missing(selection, &what);
            }
            Some(DataNode::List(items)) => items
                .iter()
                .map(|item| match item {
                    DataNode::Leaf(scalar) => Ok(scalar.to_text()),
                    _ => Err(EngineError::invalid_value("Join can only join single values")),
                })
                .collect::<EngineResult<_>>()?,
            Some(DataNode::Leaf(scalar)) => vec![scalar.to_text()],
            Some(DataNode::Map(_)) => {
                return Err(EngineError::invalid_value("Join expects a list"));
            }
        };

        let separator = selection.str_param("separator").unwrap_or(", ");
        let last_separator = selection.str_param("lastSeparator").unwrap_or(separator);
        let truncated = selection.str_param("truncated").unwrap_or("...");
        let limit = match selection.invocation.param("limit") {
            None => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .ok_or_else(|| EngineError::invalid_value("'limit' must be a positive integer"))?
                    as usize,
            ),
        };

        let text = join(&items, separator, last_separator, limit, truncated);
        Ok(ReplaceWithText.modify(selection, text.as_str())?.into())
    }
}

fn join(items: &[String], separator: &str, last_separator: &str, limit: Option<usize>, truncated: &str) -> String {
    if let Some(limit) = limit.filter(|&l| items.len() > l) {
        let mut text = items[..limit].join(separator);
        text.push_str(truncated);
        return text;
    }
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{}{}{}", head.join(separator), last_separator, last),
    }
}
