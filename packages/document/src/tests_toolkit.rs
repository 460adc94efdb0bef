use crate::text::PARAGRAPH_TAG;
use crate::toolkit::{ImageElement, PlaceholderToolkit, TextToolkit};
use crate::tree::Document;
use docweave_parser::{CommandInvocation, Payload};

#[test]
fn test_isolates_inline_marker() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("Dear ${$name}, welcome");
    let root = doc.root();

    let placeholder = toolkit.next_placeholder(&mut doc, root).unwrap().unwrap();
    assert_eq!(doc.text(placeholder), Some("${$name}"));
    assert_eq!(toolkit.payload_text(&doc, placeholder).as_deref(), Some("$name"));

    let paragraph = doc.parent(placeholder).unwrap();
    let runs: Vec<&str> = doc
        .children(paragraph)
        .iter()
        .filter_map(|&n| doc.text(n))
        .collect();
    assert_eq!(runs, ["Dear ", "${$name}", ", welcome"]);
    assert_eq!(doc.to_text(), "Dear ${$name}, welcome");
}

#[test]
fn test_walks_to_later_markers() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("plain\n${A}${B}");
    let root = doc.root();

    let first = toolkit.next_placeholder(&mut doc, root).unwrap().unwrap();
    assert_eq!(doc.text(first), Some("${A}"));
    let after = doc.next_after(first).unwrap();
    let second = toolkit.next_placeholder(&mut doc, after).unwrap().unwrap();
    assert_eq!(doc.text(second), Some("${B}"));
    let after = doc.next_after(second);
    assert!(after.is_none());
}

#[test]
fn test_replace_and_rewrite_placeholder() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("${Pop key:\"x\"}");
    let root = doc.root();
    let node = toolkit.next_placeholder(&mut doc, root).unwrap().unwrap();

    let payload = Payload::single(CommandInvocation::new("Push").with_param("key", "x").with_param("value", 1));
    toolkit.set_placeholder(&mut doc, node, &payload).unwrap();
    assert_eq!(doc.text(node), Some("${Push key:\"x\", value:1}"));

    assert!(toolkit.can_replace_text(&doc, node));
    toolkit.replace_with_text(&mut doc, node, "done").unwrap();
    assert_eq!(doc.to_text(), "done");
}

#[test]
fn test_delete_placeholder_removes_blank_paragraph() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("before\n  ${EndFor}  \nafter");
    let root = doc.root();
    let node = toolkit.next_placeholder(&mut doc, root).unwrap().unwrap();

    let target = toolkit.removal_root(&doc, node);
    assert_eq!(doc.tag(target), Some(PARAGRAPH_TAG));
    toolkit.delete_placeholder(&mut doc, node).unwrap();
    assert_eq!(doc.to_text(), "before\nafter");
}

#[test]
fn test_delete_placeholder_keeps_surrounding_text() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("keep ${Pop key:\"a\"} me");
    let root = doc.root();
    let node = toolkit.next_placeholder(&mut doc, root).unwrap().unwrap();

    assert_eq!(toolkit.removal_root(&doc, node), node);
    toolkit.delete_placeholder(&mut doc, node).unwrap();
    assert_eq!(doc.to_text(), "keep  me");
}

#[test]
fn test_insert_image_replaces_marker() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("Logo: ${Image resource:\"logo.png\"}");
    let root = doc.root();
    let node = toolkit.next_placeholder(&mut doc, root).unwrap().unwrap();

    let image = ImageElement {
        name: "logo.png".to_string(),
        source: "res/logo.png".to_string(),
        width: 120,
        height: 40,
    };
    let element = toolkit.insert_image(&mut doc, node, &image).unwrap();
    assert_eq!(doc.attr(element, "src"), Some("res/logo.png"));
    assert!(!doc.is_attached(node));
    assert_eq!(doc.to_text(), "Logo: [image logo.png 120x40]");
}
