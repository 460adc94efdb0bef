//! Arena-backed document tree
//!
//! Nodes live in an append-only arena and are addressed by [`NodeId`].
//! Removing a node only detaches it, so a handle taken before a mutation
//! still names the same node afterwards. Document order is the only
//! ordering signal: there are no stored positions to go stale.

use crate::error::{DocumentError, DocumentResult};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

static NEXT_DOCUMENT: AtomicU32 = AtomicU32::new(0);

/// Stable handle of a node inside one [`Document`].
///
/// Handles remember the document that created them; passing one to
/// another document is reported as [`DocumentError::ForeignNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    document: u32,
    index: usize,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Which part of a block [`Document::split_off`] moves out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSide {
    /// Everything before the node
    Before,
    /// Everything after the node's subtree
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeSlot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    id: u32,
    nodes: Vec<NodeSlot>,
    root: NodeId,
}

impl Document {
    pub fn new(root_tag: impl Into<String>) -> Self {
        let id = NEXT_DOCUMENT.fetch_add(1, AtomicOrdering::Relaxed);
        let mut doc = Self {
            id,
            nodes: Vec::new(),
            root: NodeId { document: id, index: 0 },
        };
        doc.root = doc.create_element(root_tag);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever created, attached or not
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    // ---- construction ----

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push_slot(NodeData::Element {
            tag: tag.into(),
            attrs: IndexMap::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_slot(NodeData::Text(text.into()))
    }

    fn push_slot(&mut self, data: NodeData) -> NodeId {
        let id = NodeId {
            document: self.id,
            index: self.nodes.len(),
        };
        self.nodes.push(NodeSlot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append a node created by this document that has never been attached.
    ///
    /// Only for nodes fresh from `create_*`, which cannot form a cycle or
    /// already have a parent.
    pub(crate) fn append_fresh(&mut self, parent: NodeId, child: NodeId) {
        if let (Some(_), Some(_)) = (self.slot(parent), self.slot(child)) {
            self.nodes[child.index].parent = Some(parent);
            self.nodes[parent.index].children.push(child);
        }
    }

    fn slot(&self, id: NodeId) -> Option<&NodeSlot> {
        if id.document != self.id {
            return None;
        }
        self.nodes.get(id.index)
    }

    fn slot_mut(&mut self, id: NodeId) -> DocumentResult<&mut NodeSlot> {
        if id.document != self.id {
            return Err(DocumentError::ForeignNode(id));
        }
        self.nodes.get_mut(id.index).ok_or(DocumentError::ForeignNode(id))
    }

    fn check(&self, id: NodeId) -> DocumentResult<()> {
        self.slot(id).map(|_| ()).ok_or(DocumentError::ForeignNode(id))
    }

    // ---- node data ----

    /// Payload of a node; `None` for a handle of another document.
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.slot(id).map(|slot| &slot.data)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Text(_)))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> DocumentResult<()> {
        match &mut self.slot_mut(id)?.data {
            NodeData::Text(text) => {
                *text = value.into();
                Ok(())
            }
            NodeData::Element { .. } => Err(DocumentError::NotText(id)),
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.data(id)? {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    /// Set an attribute; ignored on text nodes and foreign handles.
    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(NodeSlot {
            data: NodeData::Element { attrs, .. },
            ..
        }) = self.slot_mut(id)
        {
            attrs.insert(name.into(), value.into());
        }
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    // ---- navigation ----

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    /// Children of `id`; empty for a handle of another document.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|slot| slot.children.as_slice()).unwrap_or_default()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Next node in document order: the first child, else the next node
    /// outside this subtree.
    pub fn next_in_order(&self, id: NodeId) -> Option<NodeId> {
        self.first_child(id).or_else(|| self.next_after(id))
    }

    /// Next node in document order that is not inside `id`'s subtree.
    pub fn next_after(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if let Some(sibling) = self.next_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    /// Previous node in document order
    pub fn prev_in_order(&self, id: NodeId) -> Option<NodeId> {
        match self.prev_sibling(id) {
            Some(mut node) => {
                while let Some(last) = self.last_child(node) {
                    node = last;
                }
                Some(node)
            }
            None => self.parent(id),
        }
    }

    /// `id` and its descendants in document order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Parent chain from the direct parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).last() == Some(&self.root)
    }

    /// Lowest node containing both `a` and `b` (a node contains itself).
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut chain_a = vec![a];
        chain_a.extend(self.ancestors(a));
        let mut current = Some(b);
        while let Some(node) = current {
            if chain_a.contains(&node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Child of `ancestor` whose subtree holds `node`.
    pub fn ancestor_child(&self, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            let parent = self.parent(current)?;
            if parent == ancestor {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Document-order comparison of two attached nodes.
    pub fn compare_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        if a == b {
            return Some(Ordering::Equal);
        }
        let path_a = self.index_path(a)?;
        let path_b = self.index_path(b)?;
        Some(path_a.cmp(&path_b))
    }

    fn index_path(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    // ---- mutation ----

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DocumentResult<()> {
        self.check_insertable(parent, child)?;
        self.nodes[child.index].parent = Some(parent);
        self.nodes[parent.index].children.push(child);
        Ok(())
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> DocumentResult<()> {
        self.insert_at_offset(reference, node, 0)
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> DocumentResult<()> {
        self.insert_at_offset(reference, node, 1)
    }

    fn insert_at_offset(&mut self, reference: NodeId, node: NodeId, offset: usize) -> DocumentResult<()> {
        self.check(reference)?;
        let parent = self.parent(reference).ok_or(DocumentError::Detached(reference))?;
        self.check_insertable(parent, node)?;
        let index = self
            .index_in_parent(reference)
            .ok_or(DocumentError::Detached(reference))?;
        self.nodes[node.index].parent = Some(parent);
        self.nodes[parent.index].children.insert(index + offset, node);
        Ok(())
    }

    /// Unlink `id` from its parent. The subtree stays intact and the handle
    /// remains usable.
    pub fn detach(&mut self, id: NodeId) -> DocumentResult<()> {
        self.check(id)?;
        if id == self.root {
            return Err(DocumentError::RootNode);
        }
        let parent = self.parent(id).ok_or(DocumentError::Detached(id))?;
        self.nodes[parent.index].children.retain(|&c| c != id);
        self.nodes[id.index].parent = None;
        Ok(())
    }

    /// Replace attached `old` with detached `new` at the same position.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> DocumentResult<()> {
        self.insert_before(old, new)?;
        self.detach(old)
    }

    /// Detached copy of the subtree rooted at `id`
    pub fn deep_clone(&mut self, id: NodeId) -> DocumentResult<NodeId> {
        let slot = self.slot(id).ok_or(DocumentError::ForeignNode(id))?;
        let data = slot.data.clone();
        let children = slot.children.clone();
        let copy = self.push_slot(data);
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self.append_fresh(copy, child_copy);
        }
        Ok(copy)
    }

    /// Detached copy of a subtree of another document
    pub fn import_subtree(&mut self, source: &Document, id: NodeId) -> DocumentResult<NodeId> {
        let data = source.data(id).ok_or(DocumentError::ForeignNode(id))?;
        let copy = self.push_slot(data.clone());
        for &child in source.children(id) {
            let child_copy = self.import_subtree(source, child)?;
            self.append_fresh(copy, child_copy);
        }
        Ok(copy)
    }

    /// Split the child of `ancestor` that holds `node` in two.
    ///
    /// Content on `side` of `node` moves into shallow copies of the
    /// elements between `node` and `ancestor`, and the outermost copy is
    /// inserted as a sibling next to the original child. `node` itself
    /// stays in place. Returns the new sibling, or `None` when there was
    /// nothing to move.
    pub fn split_off(&mut self, ancestor: NodeId, node: NodeId, side: SplitSide) -> DocumentResult<Option<NodeId>> {
        self.check(ancestor)?;
        self.check(node)?;
        let top = self.ancestor_child(ancestor, node).ok_or_else(|| {
            DocumentError::InvalidStructure(format!("{:?} is not below {:?}", node, ancestor))
        })?;

        let mut carried: Option<NodeId> = None;
        let mut current = node;
        while current != top {
            let parent = self.parent(current).ok_or(DocumentError::Detached(current))?;
            let index = self
                .index_in_parent(current)
                .ok_or(DocumentError::Detached(current))?;
            let siblings = &mut self.nodes[parent.index].children;
            let mut moved: Vec<NodeId> = match side {
                SplitSide::Before => siblings.drain(..index).collect(),
                SplitSide::After => siblings.drain(index + 1..).collect(),
            };
            if !moved.is_empty() || carried.is_some() {
                if let Some(lower) = carried {
                    match side {
                        SplitSide::Before => moved.push(lower),
                        SplitSide::After => moved.insert(0, lower),
                    }
                }
                let data = self.nodes[parent.index].data.clone();
                let shell = self.push_slot(data);
                for &child in &moved {
                    self.nodes[child.index].parent = Some(shell);
                }
                self.nodes[shell.index].children = moved;
                carried = Some(shell);
            }
            current = parent;
        }

        if let Some(part) = carried {
            match side {
                SplitSide::Before => self.insert_before(top, part)?,
                SplitSide::After => self.insert_after(top, part)?,
            }
        }
        Ok(carried)
    }

    fn check_insertable(&self, parent: NodeId, node: NodeId) -> DocumentResult<()> {
        self.check(parent)?;
        self.check(node)?;
        if node == self.root {
            return Err(DocumentError::RootNode);
        }
        if self.parent(node).is_some() {
            return Err(DocumentError::AlreadyAttached(node));
        }
        if self.contains(node, parent) {
            return Err(DocumentError::Cycle { parent, node });
        }
        if self.text(parent).is_some() {
            return Err(DocumentError::InvalidStructure(
                "text nodes cannot have children".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}
