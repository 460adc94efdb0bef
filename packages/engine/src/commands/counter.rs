use crate::error::EngineResult;
use crate::modifiers::{DeletePlaceholder, Modifier, ReplaceWithText};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::{DataNode, DataPath, Scalar};

/// `${Counter}` prints the one-based position of the current `For`
/// iteration. The zero-based index comes from the `index` variable, or
/// from `index`/`$index`/`@index` when given. Outside a loop the
/// placeholder is removed.
pub struct CounterCommand;

impl CommandHandler for CounterCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Counter"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let index = match selection.value_source("index")? {
            Some(source) => selection.model.resolve_source(&source),
            None => selection
                .model
                .resolve(&DataPath::parse_variable("index")?)
                .cloned(),
        };

        match index {
            Some(DataNode::Leaf(Scalar::Integer(index))) => {
                let text = (index + 1).to_string();
                Ok(ReplaceWithText.modify(selection, text.as_str())?.into())
            }
            _ => Ok(DeletePlaceholder.modify(selection, ())?.into()),
        }
    }
}
