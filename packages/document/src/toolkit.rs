//! Placeholder handling on top of a [`Document`]
//!
//! The engine never looks at marker syntax or paragraph structure itself.
//! It asks a [`PlaceholderToolkit`] to find, rewrite and remove placeholder
//! nodes, so other document kinds only need another toolkit.

use crate::error::{DocumentError, DocumentResult};
use crate::text::{IMAGE_TAG, PARAGRAPH_TAG};
use crate::tree::{Document, NodeId};
use docweave_parser::{Delimiters, Payload};
use tracing::trace;

/// Image placed in the document in place of a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    /// Target file name inside the document
    pub name: String,
    /// Stable identifier of the resource the pixels came from
    pub source: String,
    pub width: u32,
    pub height: u32,
}

pub trait PlaceholderToolkit {
    fn delimiters(&self) -> &Delimiters;

    /// First placeholder at or after `from` in document order.
    ///
    /// A marker sharing a text run with other text is split out first, so
    /// the returned node holds exactly one marker.
    fn next_placeholder(&self, doc: &mut Document, from: NodeId) -> DocumentResult<Option<NodeId>>;

    /// Payload text of a placeholder node, without delimiters.
    fn payload_text(&self, doc: &Document, node: NodeId) -> Option<String> {
        let text = doc.text(node)?;
        let delimiters = self.delimiters();
        if !delimiters.is_marker(text) {
            return None;
        }
        Some(text[delimiters.prefix.len()..text.len() - delimiters.suffix.len()].to_string())
    }

    /// Whether `node` can have its content replaced by text.
    fn can_replace_text(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_text(node)
    }

    fn replace_with_text(&self, doc: &mut Document, node: NodeId, text: &str) -> DocumentResult<()> {
        doc.set_text(node, text)
    }

    /// Rewrite the marker held by `node`.
    fn set_placeholder(&self, doc: &mut Document, node: NodeId, payload: &Payload) -> DocumentResult<()> {
        let marker = self.delimiters().encode_payload(payload);
        doc.set_text(node, marker)
    }

    /// Detached node holding a marker for `payload`.
    fn create_placeholder(&self, doc: &mut Document, payload: &Payload) -> NodeId {
        let marker = self.delimiters().encode_payload(payload);
        doc.create_text(marker)
    }

    /// Enclosing block of `node` (itself when it has none).
    fn block_of(&self, doc: &Document, node: NodeId) -> NodeId;

    /// The node [`delete_placeholder`](Self::delete_placeholder) will remove:
    /// the enclosing block when nothing else would be left in it, otherwise
    /// the placeholder itself.
    fn removal_root(&self, doc: &Document, node: NodeId) -> NodeId;

    fn delete_placeholder(&self, doc: &mut Document, node: NodeId) -> DocumentResult<()> {
        let target = self.removal_root(doc, node);
        doc.detach(target)
    }

    /// Build a standalone document from imported text.
    fn parse_fragment(&self, text: &str) -> DocumentResult<Document>;

    /// Replace the placeholder with an image, returning the new node.
    fn insert_image(&self, doc: &mut Document, node: NodeId, image: &ImageElement) -> DocumentResult<NodeId>;
}

/// Toolkit for the plain-text adapter
#[derive(Debug, Clone, Default)]
pub struct TextToolkit {
    delimiters: Delimiters,
}

impl TextToolkit {
    pub fn new(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    fn isolate(&self, doc: &mut Document, node: NodeId) -> DocumentResult<Option<NodeId>> {
        let Some(text) = doc.text(node).map(str::to_string) else {
            return Ok(None);
        };
        let Some(marker) = self.delimiters.find_marker(&text, 0) else {
            return Ok(None);
        };
        if marker.range == (0..text.len()) {
            return Ok(Some(node));
        }

        let before = &text[..marker.range.start];
        let body = &text[marker.range.clone()];
        let after = &text[marker.range.end..];
        trace!(node = node.index(), marker = body, "splitting text run around placeholder");

        let placeholder = if before.is_empty() {
            doc.set_text(node, body)?;
            node
        } else {
            doc.set_text(node, before)?;
            let placeholder = doc.create_text(body);
            doc.insert_after(node, placeholder)?;
            placeholder
        };
        if !after.is_empty() {
            let rest = doc.create_text(after);
            doc.insert_after(placeholder, rest)?;
        }
        Ok(Some(placeholder))
    }
}

impl PlaceholderToolkit for TextToolkit {
    fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    fn next_placeholder(&self, doc: &mut Document, from: NodeId) -> DocumentResult<Option<NodeId>> {
        let mut current = Some(from);
        while let Some(node) = current {
            if let Some(placeholder) = self.isolate(doc, node)? {
                return Ok(Some(placeholder));
            }
            current = doc.next_in_order(node);
        }
        Ok(None)
    }

    fn block_of(&self, doc: &Document, node: NodeId) -> NodeId {
        if doc.tag(node) == Some(PARAGRAPH_TAG) {
            return node;
        }
        doc.ancestors(node)
            .into_iter()
            .find(|&a| doc.tag(a) == Some(PARAGRAPH_TAG))
            .unwrap_or(node)
    }

    fn removal_root(&self, doc: &Document, node: NodeId) -> NodeId {
        let block = self.block_of(doc, node);
        if block == node || !doc.is_attached(block) {
            return node;
        }
        let others_blank = doc
            .children(block)
            .iter()
            .filter(|&&child| child != node)
            .all(|&child| doc.text(child).map_or(false, |t| t.trim().is_empty()));
        if others_blank {
            block
        } else {
            node
        }
    }

    fn parse_fragment(&self, text: &str) -> DocumentResult<Document> {
        Ok(Document::from_text(text))
    }

    fn insert_image(&self, doc: &mut Document, node: NodeId, image: &ImageElement) -> DocumentResult<NodeId> {
        if doc.parent(node).is_none() {
            return Err(DocumentError::Detached(node));
        }
        let element = doc.create_element(IMAGE_TAG);
        doc.set_attr(element, "name", image.name.as_str());
        doc.set_attr(element, "src", image.source.as_str());
        doc.set_attr(element, "width", image.width.to_string());
        doc.set_attr(element, "height", image.height.to_string());
        doc.replace(node, element)?;
        Ok(element)
    }
}
