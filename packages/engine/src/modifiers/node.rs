use super::{Modifier, ModifierResult};
use crate::error::EngineResult;
use crate::selection::Selection;
use tracing::trace;

/// Replace the placeholder's content with literal text. The node stays in
/// place, so scanning proceeds after it.
pub struct ReplaceWithText;

impl<'t> Modifier<&'t str> for ReplaceWithText {
    fn modify(&self, selection: &mut Selection<'_>, text: &'t str) -> EngineResult<ModifierResult> {
        let Some(toolkit) = selection.toolkit else {
            return Ok(ModifierResult::Ignored);
        };
        if !toolkit.can_replace_text(selection.doc, selection.node) {
            return Ok(ModifierResult::Ignored);
        }
        toolkit.replace_with_text(selection.doc, selection.node, text)?;
        Ok(ModifierResult::proceed())
    }
}

/// Remove exactly the selected node; scanning resumes at its former
/// successor.
pub struct DeleteNode;

impl Modifier<()> for DeleteNode {
    fn modify(&self, selection: &mut Selection<'_>, _payload: ()) -> EngineResult<ModifierResult> {
        let result = ModifierResult::success_at(selection.doc, Some(selection.node), true);
        trace!(node = selection.node.index(), "deleting node");
        selection.doc.detach(selection.node)?;
        Ok(result)
    }
}

/// Remove the placeholder through the toolkit, which also drops its block
/// when nothing else is left in it.
pub struct DeletePlaceholder;

impl Modifier<()> for DeletePlaceholder {
    fn modify(&self, selection: &mut Selection<'_>, _payload: ()) -> EngineResult<ModifierResult> {
        let Some(toolkit) = selection.toolkit else {
            return DeleteNode.modify(selection, ());
        };
        let target = toolkit.removal_root(selection.doc, selection.node);
        let result = ModifierResult::success_at(selection.doc, Some(target), true);
        toolkit.delete_placeholder(selection.doc, selection.node)?;
        Ok(result)
    }
}
