use crate::ast::CommandInvocation;
use crate::codec::Delimiters;
use crate::error::ParseError;
use crate::parser::{parse_command, parse_payload};
use serde_json::json;

#[test]
fn test_command_without_params() {
    let command = parse_command("EndFor").unwrap();
    assert_eq!(command.name, "EndFor");
    assert!(command.params.is_empty());
}

#[test]
fn test_lenient_params() {
    let command = parse_command(r#"For $value:items, $as:"item", index:'i', limit:3,"#).unwrap();
    assert_eq!(command.name, "For");
    assert_eq!(command.param("$value"), Some(&json!("items")));
    assert_eq!(command.str_param("$as"), Some("item"));
    assert_eq!(command.str_param("index"), Some("i"));
    assert_eq!(command.int_param("limit"), Some(3));
}

#[test]
fn test_nested_condition_object() {
    let command = parse_command(r#"If and:{"$flag":true, not:{@count:0}}, extra:[1, 2.5, null]"#).unwrap();
    assert_eq!(
        command.param("and"),
        Some(&json!({"$flag": true, "not": {"@count": 0}}))
    );
    assert_eq!(command.param("extra"), Some(&json!([1, 2.5, null])));
}

#[test]
fn test_param_order_is_preserved() {
    let command = parse_command("Join separator:\", \", $value:names, limit:2").unwrap();
    let keys: Vec<&String> = command.params.keys().collect();
    assert_eq!(keys, ["separator", "$value", "limit"]);
}

#[test]
fn test_short_forms() {
    let variable = parse_command("$customer.name").unwrap();
    assert_eq!(variable.name, "String");
    assert_eq!(variable.str_param("$value"), Some("customer.name"));

    let model = parse_command("@orders[0].total").unwrap();
    assert_eq!(model.str_param("@value"), Some("orders[0].total"));

    assert!(matches!(parse_command("$"), Err(ParseError::InvalidSyntax { .. })));
}

#[test]
fn test_multi_command_payload() {
    let payload = parse_payload(r#"Push key:"a", value:"x;y"; $a ; Pop key:"a";"#).unwrap();
    let names: Vec<&str> = payload.commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Push", "String", "Pop"]);
    assert_eq!(payload.commands[0].str_param("value"), Some("x;y"));
}

#[test]
fn test_errors_carry_payload_offsets() {
    let err = parse_payload("Push key:\"a\"; Pop key \"a\"").unwrap_err();
    match err {
        ParseError::UnexpectedToken { span, expected, .. } => {
            assert_eq!(expected, "':'");
            assert_eq!(span.start, 22);
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert!(matches!(parse_payload("  ;  "), Err(ParseError::UnexpectedEof { .. })));
    assert!(matches!(parse_command("Push key:"), Err(ParseError::UnexpectedEof { .. })));
    assert!(matches!(parse_command("Push key:1 value:2"), Err(ParseError::UnexpectedToken { .. })));
    assert!(matches!(parse_command("Push #"), Err(ParseError::LexError { .. })));
}

#[test]
fn test_encode_then_parse() {
    let original = CommandInvocation::new("Push")
        .with_param("key", "index")
        .with_param("value", 2)
        .with_param("and", json!({"$x": [1, "two"]}));
    let delimiters = Delimiters::default();
    let marker = delimiters.encode(&original);
    let found = delimiters.find_marker(&marker, 0).unwrap();
    let parsed = parse_command(found.payload_str(&marker)).unwrap();
    assert_eq!(parsed, original);
}

#[cfg(feature = "pretty-errors")]
#[test]
fn test_pretty_errors_mention_expectation() {
    let source = "For $value items";
    let err = parse_command(source).unwrap_err();
    let rendered = crate::error::format_errors(source, "template.txt", &[err]);
    assert!(rendered.contains("expected ':'"));
}
