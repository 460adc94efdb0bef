//! Plain-text document adapter
//!
//! A text document is a `doc` root holding one `p` paragraph per line.
//! Each paragraph starts with a single text run; placeholders split runs
//! and images add `img` elements.

use crate::tree::{Document, NodeData, NodeId};

pub const DOC_TAG: &str = "doc";
pub const PARAGRAPH_TAG: &str = "p";
pub const IMAGE_TAG: &str = "img";

impl Document {
    pub fn from_text(text: &str) -> Self {
        let mut doc = Document::new(DOC_TAG);
        let root = doc.root();
        for line in text.lines() {
            let paragraph = doc.create_element(PARAGRAPH_TAG);
            let run = doc.create_text(line);
            doc.append_fresh(paragraph, run);
            doc.append_fresh(root, paragraph);
        }
        doc
    }

    /// Render back to text, one line per paragraph.
    pub fn to_text(&self) -> String {
        let lines: Vec<String> = self
            .children(self.root())
            .iter()
            .map(|&block| self.render_inline(block))
            .collect();
        lines.join("\n")
    }

    pub fn paragraphs(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&n| self.tag(n) == Some(PARAGRAPH_TAG))
            .collect()
    }

    fn render_inline(&self, id: NodeId) -> String {
        match self.data(id) {
            None => String::new(),
            Some(NodeData::Text(text)) => text.clone(),
            Some(NodeData::Element { tag, attrs }) if tag == IMAGE_TAG => format!(
                "[image {} {}x{}]",
                attrs.get("name").map(String::as_str).unwrap_or(""),
                attrs.get("width").map(String::as_str).unwrap_or("0"),
                attrs.get("height").map(String::as_str).unwrap_or("0"),
            ),
            Some(NodeData::Element { .. }) => self
                .children(id)
                .iter()
                .map(|&child| self.render_inline(child))
                .collect(),
        }
    }
}
