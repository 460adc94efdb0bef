use crate::error::{EngineError, EngineResult};
use crate::modifiers::{Continuation, ModifierResult};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use tracing::debug;

/// `${Ignore} ... ${EndIgnore}`
///
/// Placeholders between the markers stay in the document as written. Both
/// markers are removed. Regions do not nest: the first `EndIgnore` closes
/// the region, and without one the rest of the document is left alone.
pub struct IgnoreCommand;

impl CommandHandler for IgnoreCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Ignore"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let toolkit = selection.toolkit()?;
        let end = match selection.find_area_end(&[], "EndIgnore") {
            Ok(end) => Some(end),
            Err(EngineError::InvalidPlaceholderStructure(_)) => None,
            Err(e) => return Err(e),
        };

        let doc = &mut *selection.doc;
        let resume = match end {
            Some(end) => {
                let target = toolkit.removal_root(doc, end);
                let resume = ModifierResult::success_at(doc, Some(target), true);
                toolkit.delete_placeholder(doc, end)?;
                resume
            }
            None => {
                debug!("ignore region runs to the end of the document");
                ModifierResult::Success(Continuation::End)
            }
        };
        toolkit.delete_placeholder(doc, selection.node)?;
        Ok(resume.into())
    }
}
