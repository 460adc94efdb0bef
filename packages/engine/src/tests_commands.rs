use crate::alias::{AliasDefinition, AliasTable};
use crate::commands::MissingData;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::registry::{CommandHandler, CommandRegistry, CommandResult};
use crate::selection::{Selection, Services};
use docweave_document::{Document, NodeId, PlaceholderToolkit, TextToolkit};
use docweave_model::{DataNode, ModelAccess, ValueSource};
use docweave_parser::{parse_command, CommandInvocation};
use serde_json::json;
use std::sync::Arc;

fn services() -> Services {
    Services::new(EngineConfig::default())
}

/// Run `f` with a selection for `marker`, placed at the first placeholder
/// of `template`.
fn with_command<R>(template: &str, marker: &str, f: impl FnOnce(&mut Selection<'_>) -> R) -> R {
    let toolkit = TextToolkit::default();
    let mut doc = Document::from_text(template);
    let root = doc.root();
    let node = toolkit
        .next_placeholder(&mut doc, root)
        .unwrap()
        .unwrap_or(root);
    let invocation = parse_command(marker).unwrap();
    let mut model = ModelAccess::new(DataNode::from(json!({"name": "Ada", "list": [1, 2]})));
    model.scope_mut().push("item", DataNode::from("x")).unwrap();
    let services = services();
    let mut aliases = AliasTable::new();
    let mut selection = Selection {
        doc: &mut doc,
        node,
        invocation: &invocation,
        model: &mut model,
        toolkit: Some(&toolkit),
        services: &services,
        aliases: &mut aliases,
    };
    f(&mut selection)
}

#[test]
fn test_builtin_registry() {
    let registry = CommandRegistry::builtin();
    for name in [
        "String", "If", "EndIf", "For", "EndFor", "Push", "Pop", "Model", "Import", "Image", "Join", "Date",
        "Time", "Number", "Counter", "Concat", "Calc", "Ignore", "EndIgnore", "Alias", "Clone",
    ] {
        assert!(registry.contains(name), "missing {}", name);
    }
    assert!(!registry.contains("string"));
    assert!(Arc::ptr_eq(&registry, &CommandRegistry::builtin()));
}

struct Shout;

impl CommandHandler for Shout {
    fn keys(&self) -> &'static [&'static str] {
        &["String", "Shout"]
    }

    fn execute(&self, _selection: &mut Selection<'_>) -> crate::error::EngineResult<CommandResult> {
        Ok(CommandResult::Consumed)
    }
}

#[test]
fn test_register_replaces_existing_handler() {
    let mut registry = CommandRegistry::with_builtins();
    registry.register(Shout);
    assert!(registry.contains("Shout"));

    let result = with_command("${x}", "String value:1", |s| {
        registry.get("String").unwrap().execute(s)
    });
    assert!(matches!(result, Ok(CommandResult::Consumed)));
}

#[test]
fn test_value_source_spellings() {
    with_command("${x}", r#"String value:[1]"#, |s| {
        assert_eq!(
            s.value_source("value").unwrap(),
            Some(ValueSource::Literal(DataNode::from(json!([1]))))
        );
    });
    with_command("${x}", r#"String $value:"item""#, |s| {
        assert!(matches!(s.value_source("value").unwrap(), Some(ValueSource::Variable(_))));
        assert_eq!(s.resolve_value("value").unwrap(), Some(DataNode::from("x")));
    });
    with_command("${x}", r#"String @value:"list[1]""#, |s| {
        assert!(matches!(s.value_source("value").unwrap(), Some(ValueSource::Model(_))));
        assert_eq!(s.resolve_value("value").unwrap(), Some(DataNode::from(2i64)));
    });
    with_command("${x}", r#"String @value:"$item""#, |s| {
        assert!(matches!(s.value_source("value").unwrap(), Some(ValueSource::Variable(_))));
    });
    with_command("${x}", "String other:1", |s| {
        assert_eq!(s.value_source("value").unwrap(), None);
        assert_eq!(s.resolve_value("value").unwrap(), None);
    });
}

#[test]
fn test_path_value_must_be_a_string() {
    with_command("${x}", "String @value:3", |s| {
        assert!(matches!(s.value_source("value"), Err(EngineError::InvalidValue(_))));
    });
}

#[test]
fn test_find_area_end_skips_nested_areas() {
    let template = "${If a:1}\n${If b:2}\ninner\n${EndIf}\n${EndIf}\nafter";
    with_command(template, "If a:1", |s| {
        let end = s.find_area_end(&["If"], "EndIf").unwrap();
        let paragraphs = s.doc.paragraphs();
        assert_eq!(s.doc.parent(end), Some(paragraphs[4]));
    });
}

#[test]
fn test_find_area_end_reports_missing_closer() {
    with_command("${For value:[]}\nbody", "For value:[]", |s| {
        let result = s.find_area_end(&["For"], "EndFor");
        assert!(matches!(result, Err(EngineError::InvalidPlaceholderStructure(_))));
    });
}

#[test]
fn test_missing_data_strategies() {
    let cases = [
        ("String", MissingData::Empty),
        ("String fallback:\"-\"", MissingData::Fallback),
        ("String onNull:empty, fallback:\"-\"", MissingData::Empty),
        ("String onNull:keepPlaceholder", MissingData::KeepPlaceholder),
        ("String onNull:deletePlaceholder", MissingData::DeletePlaceholder),
        ("String onNull:fail", MissingData::Fail),
    ];
    for (marker, expected) in cases {
        let strategy = with_command("${x}", marker, |s| MissingData::from_selection(s).unwrap());
        assert_eq!(strategy, expected, "{}", marker);
    }

    let unknown = with_command("${x}", "String onNull:shrug", |s| MissingData::from_selection(s));
    assert!(matches!(unknown, Err(EngineError::InvalidValue(_))));
}

#[test]
fn test_push_and_pop_balance() {
    with_command("${x}", r#"Push key:"item", @value:"name""#, |s| {
        let push = CommandRegistry::builtin().get("Push").unwrap().clone();
        assert!(matches!(push.execute(s), Ok(CommandResult::Consumed)));
        assert_eq!(s.model.scope().get("item"), Some(&DataNode::from("Ada")));
        assert_eq!(s.model.scope().depth("item"), 2);
    });

    with_command("${x}", r#"Pop key:"ghost""#, |s| {
        let pop = CommandRegistry::builtin().get("Pop").unwrap().clone();
        assert!(matches!(pop.execute(s), Err(EngineError::InvalidPlaceholderStructure(_))));
    });
}

#[test]
fn test_closing_marker_without_opener() {
    let result = with_command("${EndIf}", "EndIf", |s| {
        CommandRegistry::builtin().get("EndIf").unwrap().execute(s)
    });
    assert!(matches!(result, Err(EngineError::InvalidPlaceholderStructure(_))));
}

#[test]
fn test_string_rejects_structured_values() {
    let result = with_command("${x}", r#"String @value:"list""#, |s| {
        CommandRegistry::builtin().get("String").unwrap().execute(s)
    });
    assert!(matches!(result, Err(EngineError::InvalidValue(_))));
}

#[test]
fn test_selection_without_toolkit_reports_structure_error() {
    let mut doc = Document::from_text("a");
    let node: NodeId = doc.paragraphs()[0];
    let invocation = CommandInvocation::new("If");
    let mut model = ModelAccess::default();
    let services = services();
    let mut aliases = AliasTable::new();
    let mut selection = Selection {
        doc: &mut doc,
        node,
        invocation: &invocation,
        model: &mut model,
        toolkit: None,
        services: &services,
        aliases: &mut aliases,
    };
    assert!(selection.toolkit().is_err());
    assert!(selection.find_area_end(&["If"], "EndIf").is_err());
}

#[test]
fn test_find_area_end_skips_ignore_regions() {
    let template = "${If a:1}\n${Ignore}\n${EndIf}\n${EndIgnore}\n${EndIf}\nafter";
    with_command(template, "If a:1", |s| {
        let end = s.find_area_end(&["If"], "EndIf").unwrap();
        let paragraphs = s.doc.paragraphs();
        assert_eq!(s.doc.parent(end), Some(paragraphs[4]));
    });
}

#[test]
fn test_find_area_end_follows_aliases() {
    with_command("${If a:1}\nbody\n${Fin}", "If a:1", |s| {
        s.aliases.define(AliasDefinition::new("Fin", "EndIf"));
        let end = s.find_area_end(&["If"], "EndIf").unwrap();
        let paragraphs = s.doc.paragraphs();
        assert_eq!(s.doc.parent(end), Some(paragraphs[2]));
    });
}

#[test]
fn test_alias_command_defines_alias() {
    let marker = r#"Alias key:"Greet", replaceKey:"String", attributes:{value:"hi"}, attrReplacements:{text:"value"}"#;
    with_command("${x}", marker, |s| {
        let alias = CommandRegistry::builtin().get("Alias").unwrap().clone();
        assert!(matches!(alias.execute(s), Ok(CommandResult::Consumed)));

        let defined = s.aliases.get("Greet").unwrap();
        assert_eq!(defined.replace_key, "String");
        assert_eq!(defined.attributes.get("value"), Some(&json!("hi")));
        assert_eq!(defined.attr_replacements.get("text").map(String::as_str), Some("value"));
    });

    let result = with_command("${x}", r#"Alias key:"If", replaceKey:"If""#, |s| {
        CommandRegistry::builtin().get("Alias").unwrap().execute(s)
    });
    assert!(matches!(result, Err(EngineError::InvalidValue(_))));

    let result = with_command("${x}", r#"Alias key:"A", replaceKey:"String", attributes:[1]"#, |s| {
        CommandRegistry::builtin().get("Alias").unwrap().execute(s)
    });
    assert!(matches!(result, Err(EngineError::InvalidValue(_))));
}

#[test]
fn test_concat_collects_resolvable_values() {
    with_command("${x}", r#"Concat key:"all", @a:"name", $b:"item", @c:"list", @d:"ghost""#, |s| {
        let concat = CommandRegistry::builtin().get("Concat").unwrap().clone();
        assert!(matches!(concat.execute(s), Ok(CommandResult::Consumed)));
        assert_eq!(s.model.scope().get("all"), Some(&DataNode::from(json!(["Ada", "x", [1, 2]]))));
    });

    let result = with_command("${x}", r#"Concat key:"s", @a:"list", type:string"#, |s| {
        CommandRegistry::builtin().get("Concat").unwrap().execute(s)
    });
    assert!(matches!(result, Err(EngineError::InvalidValue(_))));
}

#[test]
fn test_calc_requires_both_operands() {
    let result = with_command("${x}", r#"Calc key:"r", a:1"#, |s| {
        CommandRegistry::builtin().get("Calc").unwrap().execute(s)
    });
    assert!(matches!(result, Err(EngineError::MissingValue(_))));

    with_command("${x}", r#"Calc key:"r", a:7, b:2, operator:"%""#, |s| {
        let calc = CommandRegistry::builtin().get("Calc").unwrap().clone();
        assert!(matches!(calc.execute(s), Ok(CommandResult::Consumed)));
        assert_eq!(s.model.scope().get("r"), Some(&DataNode::from(1i64)));
    });
}

#[test]
fn test_clone_copies_named_element() {
    let mut doc = Document::new("doc");
    let root = doc.root();
    let marker = paragraph(&mut doc, r#"${Clone name:"Page 1", newName:"Copy", insertBefore:"Appendix"}"#);
    doc.append_child(root, marker).unwrap();
    let page = section(&mut doc, "Page 1", "Hello ${@name}");
    doc.append_child(root, page).unwrap();
    let appendix = section(&mut doc, "Appendix", "end");
    doc.append_child(root, appendix).unwrap();

    let mut model = ModelAccess::new(DataNode::from(json!({"name": "Ada"})));
    let report = Engine::default()
        .run(&mut doc, &TextToolkit::default(), &mut model)
        .unwrap();
    assert!(report.is_clean(), "{:?}", report.problems);

    let children = doc.children(root).to_vec();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0], page);
    assert_eq!(doc.attr(children[1], "name"), Some("Copy"));
    assert_eq!(children[2], appendix);
    assert_eq!(doc.text_content(page), "Hello Ada");
    assert_eq!(doc.text_content(children[1]), "Hello Ada");
}

#[test]
fn test_clone_of_unknown_element_fails() {
    let result = with_command("${x}", r#"Clone name:"Nowhere", newName:"Copy""#, |s| {
        CommandRegistry::builtin().get("Clone").unwrap().execute(s)
    });
    assert!(matches!(result, Err(EngineError::InvalidPlaceholderStructure(_))));
}

fn paragraph(doc: &mut Document, text: &str) -> NodeId {
    let p = doc.create_element("p");
    let run = doc.create_text(text);
    doc.append_child(p, run).unwrap();
    p
}

fn section(doc: &mut Document, name: &str, text: &str) -> NodeId {
    let section = doc.create_element("section");
    doc.set_attr(section, "name", name);
    let p = paragraph(doc, text);
    doc.append_child(section, p).unwrap();
    section
}
