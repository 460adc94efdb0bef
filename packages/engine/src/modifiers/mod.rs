//! Tree modifiers
//!
//! A modifier performs one structural edit around a selection and reports
//! where scanning resumes. The resume point is computed before the edit,
//! because afterwards the neighbourhood of the selection may be gone.
//!
//! Single-node modifiers implement [`Modifier`] directly. Area modifiers
//! implement [`AreaModifier`] and receive an [`Area`] whose boundary
//! blocks were split at the markers; they are usable as
//! `Modifier<AreaPayload<P>>` through a blanket impl.

mod area;
mod node;
mod resource;

pub use area::{Area, CloneArea, CloneAreaPayload, DeleteArea};
pub use node::{DeleteNode, DeletePlaceholder, ReplaceWithText};
pub use resource::{ImageRequest, InsertImage, SizePolicy};

use crate::error::EngineResult;
use crate::selection::Selection;
use docweave_document::{Document, NodeId};

/// Where the scanner resumes after a modifier ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Continue after the placeholder node, which is still in place
    Proceed,
    /// Continue at this node (it is scanned itself)
    At(NodeId),
    /// Nothing left to scan
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierResult {
    /// The modifier does not apply to this selection
    Ignored,
    Success(Continuation),
}

impl ModifierResult {
    /// Success resuming at `node`.
    ///
    /// With no node there is no continuation. With `exclude_node` set the
    /// resume point is the next node after `node`'s subtree instead; this
    /// step is taken once, not repeated.
    pub fn success_at(doc: &Document, node: Option<NodeId>, exclude_node: bool) -> Self {
        let target = match node {
            None => None,
            Some(node) if exclude_node => doc.next_after(node),
            Some(node) => Some(node),
        };
        ModifierResult::Success(target.map_or(Continuation::End, Continuation::At))
    }

    pub fn proceed() -> Self {
        ModifierResult::Success(Continuation::Proceed)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ModifierResult::Success(_))
    }
}

pub trait Modifier<P> {
    fn modify(&self, selection: &mut Selection<'_>, payload: P) -> EngineResult<ModifierResult>;
}

/// Bounds of an area plus the modifier-specific payload
#[derive(Debug, Clone)]
pub struct AreaPayload<P> {
    pub begin: NodeId,
    pub end: NodeId,
    pub inner: P,
}

pub trait AreaModifier<P> {
    fn modify_area(&self, selection: &mut Selection<'_>, area: &Area, payload: P) -> EngineResult<ModifierResult>;
}

impl<M, P> Modifier<AreaPayload<P>> for M
where
    M: AreaModifier<P>,
{
    fn modify(&self, selection: &mut Selection<'_>, payload: AreaPayload<P>) -> EngineResult<ModifierResult> {
        let area = Area::isolate(selection.doc, payload.begin, payload.end)?;
        self.modify_area(selection, &area, payload.inner)
    }
}
