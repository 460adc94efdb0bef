use super::{AreaModifier, ModifierResult};
use crate::error::{EngineError, EngineResult};
use crate::selection::Selection;
use docweave_common::Range;
use docweave_document::{Document, NodeId, SplitSide};
use docweave_parser::Payload;
use tracing::debug;

/// Region between a begin and an end marker.
///
/// The area spans the children of the markers' lowest common ancestor
/// from the one holding the begin marker to the one holding the end
/// marker, inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub ancestor: NodeId,
    pub begin_marker: NodeId,
    pub end_marker: NodeId,
    /// Ancestor child holding the begin marker
    pub first: NodeId,
    /// Ancestor child holding the end marker
    pub last: NodeId,
    /// Child indices of `first..=last` when the area was resolved
    pub range: Range,
}

impl Area {
    /// Resolve the area between `begin` and `end` without touching the
    /// tree.
    pub fn resolve(doc: &Document, begin: NodeId, end: NodeId) -> EngineResult<Self> {
        let ancestor = Self::common_ancestor(doc, begin, end)?;
        let unresolvable = || EngineError::UnresolvableArea("marker is not below the common ancestor".to_string());
        let first = doc.ancestor_child(ancestor, begin).ok_or_else(unresolvable)?;
        let last = doc.ancestor_child(ancestor, end).ok_or_else(unresolvable)?;
        let start = doc.index_in_parent(first).ok_or_else(unresolvable)?;
        let stop = doc.index_in_parent(last).ok_or_else(unresolvable)?;
        if start > stop {
            return Err(EngineError::UnresolvableArea(
                "end marker precedes begin marker".to_string(),
            ));
        }

        Ok(Self {
            ancestor,
            begin_marker: begin,
            end_marker: end,
            first,
            last,
            range: Range::new(start, stop),
        })
    }

    /// Resolve the area after splitting its boundary blocks, so content
    /// sharing a block with a marker but lying outside the area ends up in
    /// blocks of its own.
    pub fn isolate(doc: &mut Document, begin: NodeId, end: NodeId) -> EngineResult<Self> {
        // Validate before the tree is touched.
        let area = Self::resolve(doc, begin, end)?;
        let before = doc.split_off(area.ancestor, begin, SplitSide::Before)?;
        let after = doc.split_off(area.ancestor, end, SplitSide::After)?;
        if before.is_none() && after.is_none() {
            return Ok(area);
        }
        debug!(
            split_before = before.is_some(),
            split_after = after.is_some(),
            "split area boundaries"
        );
        Self::resolve(doc, begin, end)
    }

    fn common_ancestor(doc: &Document, begin: NodeId, end: NodeId) -> EngineResult<NodeId> {
        if begin == end {
            return Err(EngineError::UnresolvableArea(
                "begin and end marker are the same node".to_string(),
            ));
        }
        let ancestor = doc
            .common_ancestor(begin, end)
            .filter(|&a| doc.is_attached(a))
            .ok_or_else(|| EngineError::UnresolvableArea("markers share no common ancestor".to_string()))?;
        if ancestor == begin || ancestor == end {
            return Err(EngineError::UnresolvableArea(
                "one marker contains the other".to_string(),
            ));
        }
        Ok(ancestor)
    }

    /// Ancestor children covered by `range`
    pub fn nodes_in(&self, doc: &Document, range: Range) -> Vec<NodeId> {
        let children = doc.children(self.ancestor);
        range
            .iter()
            .filter_map(|i| children.get(i).copied())
            .collect()
    }

    pub fn nodes(&self, doc: &Document) -> Vec<NodeId> {
        self.nodes_in(doc, self.range)
    }
}

/// Delete the nodes of an area.
///
/// The payload narrows the deletion to a sub-range of the area's child
/// indices (`None` deletes the whole area). Scanning resumes relative to
/// the area's right boundary: after it when `exclude_boundary` is set, at
/// it otherwise.
pub struct DeleteArea {
    pub exclude_boundary: bool,
}

impl AreaModifier<Option<Range>> for DeleteArea {
    fn modify_area(&self, selection: &mut Selection<'_>, area: &Area, payload: Option<Range>) -> EngineResult<ModifierResult> {
        let range = payload.unwrap_or(area.range);
        if !area.range.contains(range.min()) || !area.range.contains(range.max()) {
            return Err(EngineError::structure(format!(
                "delete range {} lies outside area {}",
                range, area.range
            )));
        }

        let result = ModifierResult::success_at(selection.doc, Some(area.last), self.exclude_boundary);
        let doomed = area.nodes_in(selection.doc, range);
        debug!(nodes = doomed.len(), %range, "deleting area");
        for node in doomed {
            selection.doc.detach(node)?;
        }
        Ok(result)
    }
}

/// Per-copy marker payloads for [`CloneArea`]: `(begin, end)` for copy `i`
pub type MarkerRewrite<'f> = &'f dyn Fn(usize) -> (Payload, Payload);

pub struct CloneAreaPayload<'f> {
    pub copies: usize,
    pub markers: MarkerRewrite<'f>,
}

/// Replace an area with `copies` clones of itself, in order, rewriting the
/// begin and end markers of each clone. Scanning resumes at the first
/// clone; with zero copies the area is deleted and scanning resumes after
/// it.
pub struct CloneArea;

impl<'f> AreaModifier<CloneAreaPayload<'f>> for CloneArea {
    fn modify_area(&self, selection: &mut Selection<'_>, area: &Area, payload: CloneAreaPayload<'f>) -> EngineResult<ModifierResult> {
        if payload.copies == 0 {
            return DeleteArea {
                exclude_boundary: true,
            }
            .modify_area(selection, area, None);
        }

        let toolkit = selection.toolkit()?;
        let doc = &mut *selection.doc;
        let originals = area.nodes(doc);
        let begin_path = path_below(doc, area.first, area.begin_marker)
            .ok_or_else(|| EngineError::structure("begin marker left the area"))?;
        let end_path = path_below(doc, area.last, area.end_marker)
            .ok_or_else(|| EngineError::structure("end marker left the area"))?;
        let last_index = originals.len() - 1;

        let mut first_clone = None;
        for copy in 0..payload.copies {
            let (begin_payload, end_payload) = (payload.markers)(copy);
            for (index, &original) in originals.iter().enumerate() {
                let clone = doc.deep_clone(original)?;
                doc.insert_before(area.first, clone)?;
                first_clone.get_or_insert(clone);

                if index == 0 {
                    let marker = follow(doc, clone, &begin_path)
                        .ok_or_else(|| EngineError::structure("begin marker missing in clone"))?;
                    toolkit.set_placeholder(doc, marker, &begin_payload)?;
                }
                if index == last_index {
                    let marker = follow(doc, clone, &end_path)
                        .ok_or_else(|| EngineError::structure("end marker missing in clone"))?;
                    toolkit.set_placeholder(doc, marker, &end_payload)?;
                }
            }
        }

        for original in originals {
            doc.detach(original)?;
        }
        debug!(copies = payload.copies, "cloned area");
        Ok(ModifierResult::success_at(doc, first_clone, false))
    }
}

/// Child-index path from `top` down to `node`
fn path_below(doc: &Document, top: NodeId, node: NodeId) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut current = node;
    while current != top {
        path.push(doc.index_in_parent(current)?);
        current = doc.parent(current)?;
    }
    path.reverse();
    Some(path)
}

fn follow(doc: &Document, top: NodeId, path: &[usize]) -> Option<NodeId> {
    path.iter()
        .try_fold(top, |node, &i| doc.children(node).get(i).copied())
}
