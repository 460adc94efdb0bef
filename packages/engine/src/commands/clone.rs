use crate::error::{EngineError, EngineResult};
use crate::modifiers::{DeletePlaceholder, Modifier};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_document::{Document, NodeId};
use tracing::debug;

/// Attribute naming a page, table or section
const NAME_ATTR: &str = "name";

/// `${Clone name:"Page 1", newName:"Page 2", insertBefore:"Appendix"}`
///
/// Copies the element carrying `name="Page 1"` and renames the copy. The
/// copy goes in front of the `insertBefore` element, or after the last
/// sibling of the original when that parameter is absent. Placeholders in
/// the copy are scanned when the scan reaches them.
pub struct CloneCommand;

impl CommandHandler for CloneCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Clone"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let name = selection.require_str("name")?;
        let new_name = selection.require_str("newName")?;
        let before = selection.str_param("insertBefore");

        let original = find_named(selection.doc, name)?;
        let anchor = before.map(|before| find_named(selection.doc, before)).transpose()?;
        // The marker goes first so the copy does not carry it.
        let result = DeletePlaceholder.modify(selection, ())?;

        let doc = &mut *selection.doc;
        let parent = doc
            .parent(original)
            .ok_or_else(|| EngineError::structure(format!("element '{}' cannot be cloned", name)))?;
        let copy = doc.deep_clone(original)?;
        doc.set_attr(copy, NAME_ATTR, new_name);
        match anchor {
            Some(anchor) => doc.insert_before(anchor, copy)?,
            None => doc.append_child(parent, copy)?,
        }
        debug!(name, new_name, "cloned element");

        Ok(result.into())
    }
}

fn find_named(doc: &Document, name: &str) -> EngineResult<NodeId> {
    doc.descendants(doc.root())
        .find(|&node| doc.attr(node, NAME_ATTR) == Some(name))
        .ok_or_else(|| EngineError::structure(format!("no element named '{}'", name)))
}
