use crate::condition::ConditionElement;
use crate::error::{EngineError, EngineResult};
use crate::modifiers::{AreaPayload, DeleteArea, Modifier, ModifierResult};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_common::Range;
use tracing::debug;

/// `${If <condition>} ... ${EndIf}`
///
/// Keeps the body and drops both markers when the condition holds,
/// deletes the whole area otherwise.
pub struct IfCommand;

impl CommandHandler for IfCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["If"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let condition = ConditionElement::from_params(&selection.invocation.params)?;
        let end = selection.find_area_end(&["If"], "EndIf")?;
        let holds = condition.eval_model(selection.model);
        debug!(holds, "evaluated condition");

        if !holds {
            let payload = AreaPayload {
                begin: selection.node,
                end,
                inner: None::<Range>,
            };
            return Ok(DeleteArea {
                exclude_boundary: true,
            }
            .modify(selection, payload)?
            .into());
        }

        let toolkit = selection.toolkit()?;
        // The end marker goes first so the resume point below cannot land
        // on it.
        toolkit.delete_placeholder(selection.doc, end)?;
        let target = toolkit.removal_root(selection.doc, selection.node);
        let result = ModifierResult::success_at(selection.doc, Some(target), true);
        toolkit.delete_placeholder(selection.doc, selection.node)?;
        Ok(result.into())
    }
}

/// `EndIf`, `EndFor` or `EndIgnore` reached by the scanner: their opener
/// never consumed them.
pub struct ClosingMarker;

impl CommandHandler for ClosingMarker {
    fn keys(&self) -> &'static [&'static str] {
        &["EndIf", "EndFor", "EndIgnore"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        Err(EngineError::structure(format!(
            "{} without a matching opening placeholder",
            selection.command()
        )))
    }
}
