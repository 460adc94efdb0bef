use crate::alias::AliasTable;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::modifiers::{
    AreaPayload, CloneArea, CloneAreaPayload, Continuation, DeleteArea, DeleteNode, Modifier, ModifierResult,
    ReplaceWithText, SizePolicy,
};
use crate::selection::{Selection, Services};
use docweave_common::Range;
use docweave_document::{Document, NodeId, PlaceholderToolkit, TextToolkit};
use docweave_model::{DataNode, ModelAccess};
use docweave_parser::{CommandInvocation, Payload};

fn services() -> Services {
    Services::new(EngineConfig::default())
}

/// Run `f` with a selection positioned at `node`.
fn with_selection<R>(
    doc: &mut Document,
    node: NodeId,
    toolkit: Option<&dyn PlaceholderToolkit>,
    f: impl FnOnce(&mut Selection<'_>) -> R,
) -> R {
    let invocation = CommandInvocation::new("Test");
    let mut model = ModelAccess::new(DataNode::null());
    let services = services();
    let mut aliases = AliasTable::new();
    let mut selection = Selection {
        doc,
        node,
        invocation: &invocation,
        model: &mut model,
        toolkit,
        services: &services,
        aliases: &mut aliases,
    };
    f(&mut selection)
}

fn delete(doc: &mut Document, node: NodeId) -> ModifierResult {
    with_selection(doc, node, None, |s| DeleteNode.modify(s, ())).unwrap()
}

#[test]
fn test_delete_node_resumes_at_successor() {
    let mut doc = Document::from_text("a\nb\nc");
    let paragraphs = doc.paragraphs();

    let result = delete(&mut doc, paragraphs[1]);
    assert_eq!(result, ModifierResult::Success(Continuation::At(paragraphs[2])));
    assert!(doc.is_attached(paragraphs[2]));
    assert_eq!(doc.to_text(), "a\nc");
}

#[test]
fn test_two_consecutive_deletions() {
    let mut doc = Document::from_text("a\nb\nc\nd");
    let paragraphs = doc.paragraphs();

    let Continuation::At(next) = continuation(delete(&mut doc, paragraphs[1])) else {
        panic!("expected a continuation node");
    };
    assert_eq!(next, paragraphs[2]);
    let Continuation::At(next) = continuation(delete(&mut doc, next)) else {
        panic!("expected a continuation node");
    };
    assert_eq!(next, paragraphs[3]);
    assert_eq!(doc.to_text(), "a\nd");
}

#[test]
fn test_chained_deletions_visit_each_node_once() {
    let text = (0..10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
    let mut doc = Document::from_text(&text);
    let paragraphs = doc.paragraphs();

    let mut visited = Vec::new();
    let mut cursor = Some(paragraphs[0]);
    while let Some(node) = cursor {
        visited.push(node);
        cursor = match continuation(delete(&mut doc, node)) {
            Continuation::At(next) => Some(next),
            Continuation::End => None,
            Continuation::Proceed => panic!("deletion cannot proceed in place"),
        };
    }

    assert_eq!(visited, paragraphs);
    assert_eq!(doc.to_text(), "");
}

#[test]
fn test_delete_last_child_resumes_after_parent() {
    let mut doc = Document::from_text("a\nb");
    let paragraphs = doc.paragraphs();
    let run = doc.first_child(paragraphs[0]).unwrap();

    let result = delete(&mut doc, run);
    assert_eq!(result, ModifierResult::Success(Continuation::At(paragraphs[1])));
}

#[test]
fn test_delete_at_document_end_has_no_continuation() {
    let mut doc = Document::from_text("a\nb");
    let paragraphs = doc.paragraphs();
    assert_eq!(
        delete(&mut doc, paragraphs[1]),
        ModifierResult::Success(Continuation::End)
    );
}

fn continuation(result: ModifierResult) -> Continuation {
    match result {
        ModifierResult::Success(continuation) => continuation,
        ModifierResult::Ignored => panic!("modifier ignored the selection"),
    }
}

fn area_markers(doc: &Document) -> (NodeId, NodeId) {
    let paragraphs = doc.paragraphs();
    let begin = doc.first_child(paragraphs[1]).unwrap();
    let end = doc.first_child(paragraphs[3]).unwrap();
    (begin, end)
}

#[test]
fn test_delete_area_excluding_boundary() {
    let mut doc = Document::from_text("a\n${Begin}\nb\n${End}\nc");
    let paragraphs = doc.paragraphs();
    let (begin, end) = area_markers(&doc);

    let payload = AreaPayload {
        begin,
        end,
        inner: None::<Range>,
    };
    let result = with_selection(&mut doc, begin, None, |s| {
        DeleteArea {
            exclude_boundary: true,
        }
        .modify(s, payload)
    })
    .unwrap();

    assert_eq!(result, ModifierResult::Success(Continuation::At(paragraphs[4])));
    assert_eq!(doc.to_text(), "a\nc");
}

#[test]
fn test_delete_area_keeps_text_beside_markers() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("Hello ${Begin}\nb\n${End} World");
    let root = doc.root();
    let begin = toolkit.next_placeholder(&mut doc, root).unwrap().unwrap();
    let from = doc.next_after(begin).unwrap();
    let end = toolkit.next_placeholder(&mut doc, from).unwrap().unwrap();

    let payload = AreaPayload {
        begin,
        end,
        inner: None::<Range>,
    };
    let result = with_selection(&mut doc, begin, Some(&toolkit), |s| {
        DeleteArea {
            exclude_boundary: true,
        }
        .modify(s, payload)
    })
    .unwrap();

    assert!(result.is_success());
    assert_eq!(doc.to_text(), "Hello \n World");
    assert_eq!(doc.paragraphs().len(), 2);
}

#[test]
fn test_delete_sub_range_resumes_at_boundary() {
    let mut doc = Document::from_text("a\n${Begin}\nb\n${End}\nc");
    let paragraphs = doc.paragraphs();
    let (begin, end) = area_markers(&doc);

    let payload = AreaPayload {
        begin,
        end,
        inner: Some(Range::point(2)),
    };
    let result = with_selection(&mut doc, begin, None, |s| {
        DeleteArea {
            exclude_boundary: false,
        }
        .modify(s, payload)
    })
    .unwrap();

    assert_eq!(result, ModifierResult::Success(Continuation::At(paragraphs[3])));
    assert_eq!(doc.to_text(), "a\n${Begin}\n${End}\nc");
}

#[test]
fn test_sub_range_outside_area_is_rejected() {
    let mut doc = Document::from_text("a\n${Begin}\nb\n${End}\nc");
    let (begin, end) = area_markers(&doc);

    let payload = AreaPayload {
        begin,
        end,
        inner: Some(Range::new(0, 2)),
    };
    let result = with_selection(&mut doc, begin, None, |s| {
        DeleteArea {
            exclude_boundary: true,
        }
        .modify(s, payload)
    });
    assert!(matches!(result, Err(EngineError::InvalidPlaceholderStructure(_))));
    assert_eq!(doc.to_text(), "a\n${Begin}\nb\n${End}\nc");
}

#[test]
fn test_area_without_common_ancestor_is_unresolvable() {
    let mut doc = Document::from_text("${Begin}");
    let begin = doc.first_child(doc.paragraphs()[0]).unwrap();
    let stray = doc.create_text("${End}");

    let payload = AreaPayload {
        begin,
        end: stray,
        inner: None::<Range>,
    };
    let result = with_selection(&mut doc, begin, None, |s| {
        DeleteArea {
            exclude_boundary: true,
        }
        .modify(s, payload)
    });
    assert!(matches!(result, Err(EngineError::UnresolvableArea(_))));
}

#[test]
fn test_reversed_area_is_unresolvable() {
    let mut doc = Document::from_text("a\n${Begin}\nb\n${End}\nc");
    let (begin, end) = area_markers(&doc);

    let payload = AreaPayload {
        begin: end,
        end: begin,
        inner: None::<Range>,
    };
    let result = with_selection(&mut doc, end, None, |s| {
        DeleteArea {
            exclude_boundary: true,
        }
        .modify(s, payload)
    });
    assert!(matches!(result, Err(EngineError::UnresolvableArea(_))));
    assert_eq!(doc.to_text(), "a\n${Begin}\nb\n${End}\nc");
}

#[test]
fn test_clone_area_rewrites_markers_per_copy() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("x\n${Begin}\nbody\n${End}\ny");
    let (begin, end) = area_markers(&doc);

    let markers = |i: usize| {
        (
            Payload::single(CommandInvocation::new("Open").with_param("i", i)),
            Payload::single(CommandInvocation::new("Close").with_param("i", i)),
        )
    };
    let payload = AreaPayload {
        begin,
        end,
        inner: CloneAreaPayload {
            copies: 2,
            markers: &markers,
        },
    };
    let result = with_selection(&mut doc, begin, Some(&toolkit), |s| CloneArea.modify(s, payload)).unwrap();

    assert_eq!(
        doc.to_text(),
        "x\n${Open i:0}\nbody\n${Close i:0}\n${Open i:1}\nbody\n${Close i:1}\ny"
    );
    let first_clone = doc.paragraphs()[1];
    assert_eq!(result, ModifierResult::Success(Continuation::At(first_clone)));
    assert!(!doc.is_attached(begin));
}

#[test]
fn test_clone_area_zero_copies_deletes_it() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("x\n${Begin}\nbody\n${End}\ny");
    let paragraphs = doc.paragraphs();
    let (begin, end) = area_markers(&doc);

    let markers = |_: usize| (Payload::default(), Payload::default());
    let payload = AreaPayload {
        begin,
        end,
        inner: CloneAreaPayload {
            copies: 0,
            markers: &markers,
        },
    };
    let result = with_selection(&mut doc, begin, Some(&toolkit), |s| CloneArea.modify(s, payload)).unwrap();

    assert_eq!(result, ModifierResult::Success(Continuation::At(paragraphs[4])));
    assert_eq!(doc.to_text(), "x\ny");
}

#[test]
fn test_replace_with_text_needs_toolkit() {
    let mut doc = Document::from_text("${$name}");
    let node = doc.first_child(doc.paragraphs()[0]).unwrap();

    let ignored = with_selection(&mut doc, node, None, |s| ReplaceWithText.modify(s, "Ada")).unwrap();
    assert_eq!(ignored, ModifierResult::Ignored);
    assert_eq!(doc.to_text(), "${$name}");

    let toolkit = TextToolkit::default();
    let replaced = with_selection(&mut doc, node, Some(&toolkit), |s| ReplaceWithText.modify(s, "Ada")).unwrap();
    assert_eq!(replaced, ModifierResult::proceed());
    assert_eq!(doc.to_text(), "Ada");
}

#[test]
fn test_replace_with_text_ignores_elements() {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text("a");
    let paragraph = doc.paragraphs()[0];

    let result = with_selection(&mut doc, paragraph, Some(&toolkit), |s| ReplaceWithText.modify(s, "b")).unwrap();
    assert_eq!(result, ModifierResult::Ignored);
}

#[test]
fn test_size_policies() {
    let original = (200, 100);
    assert_eq!(SizePolicy::Original.apply(original), (200, 100));
    assert_eq!(SizePolicy::KeepWidth(100).apply(original), (100, 50));
    assert_eq!(SizePolicy::KeepHeight(30).apply(original), (60, 30));
    assert_eq!(SizePolicy::KeepWidth(3).apply((7, 5)), (3, 2));
    assert_eq!(
        SizePolicy::Fixed {
            width: 10,
            height: 10
        }
        .apply(original),
        (10, 10)
    );
    assert_eq!(SizePolicy::KeepWidth(50).apply((0, 40)), (50, 0));
}
