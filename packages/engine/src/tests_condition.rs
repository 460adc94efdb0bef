use crate::condition::{Comparison, ComparisonOp, ConditionElement, ConditionKind};
use crate::error::EngineError;
use docweave_model::{DataNode, DataPath, ModelAccess};
use docweave_parser::parse_command;
use serde_json::json;
use std::cmp::Ordering;

fn model() -> ModelAccess {
    let mut model = ModelAccess::new(DataNode::from(json!({
        "name": "Ada",
        "age": 36,
        "price": 12.5,
        "active": true,
        "tags": [],
        "orders": [{"total": 3}],
        "missing": null
    })));
    model.scope_mut().push("item", DataNode::from(json!({"active": false}))).unwrap();
    model
}

fn condition(marker: &str) -> ConditionElement {
    let invocation = parse_command(marker).unwrap();
    ConditionElement::from_params(&invocation.params).unwrap()
}

#[test]
fn test_comparison_with_children_is_invalid() {
    let child = ConditionElement::comparison("name", "Ada", ComparisonOp::Equal).unwrap();
    let result = ConditionElement::build(
        ConditionKind::Comparison {
            field: "age".to_string(),
            literal: DataNode::from(36i64),
            op: ComparisonOp::Equal,
        },
        vec![child],
    );
    match result {
        Err(EngineError::InvalidCondition { path, .. }) => assert_eq!(path, "age"),
        other => panic!("expected InvalidCondition, got {:?}", other),
    }
}

#[test]
fn test_nested_object_under_field_is_invalid() {
    let invocation = parse_command(r#"If name:{first:"Ada"}"#).unwrap();
    let result = ConditionElement::from_params(&invocation.params);
    assert!(matches!(result, Err(EngineError::InvalidCondition { .. })));
}

#[test]
fn test_not_requires_one_child() {
    let result = ConditionElement::build(ConditionKind::Not, Vec::new());
    assert!(matches!(result, Err(EngineError::InvalidCondition { .. })));
}

#[test]
fn test_empty_combinators() {
    let model = model();
    assert!(ConditionElement::And(Vec::new()).eval_model(&model));
    assert!(!ConditionElement::Or(Vec::new()).eval_model(&model));
}

#[test]
fn test_short_circuits_left_to_right() {
    let first = ConditionElement::comparison("a", 1i64, ComparisonOp::Equal).unwrap();
    let second = ConditionElement::comparison("b", 1i64, ComparisonOp::Equal).unwrap();

    let mut seen = Vec::new();
    let and = ConditionElement::And(vec![first.clone(), second.clone()]);
    let holds = and.eval(&mut |c: &Comparison| {
        seen.push(c.field.to_string());
        None
    });
    assert!(!holds);
    assert_eq!(seen, ["@a"]);

    seen.clear();
    let or = ConditionElement::Or(vec![first, second]);
    let holds = or.eval(&mut |c: &Comparison| {
        seen.push(c.field.to_string());
        Some(Ordering::Equal)
    });
    assert!(holds);
    assert_eq!(seen, ["@a"]);
}

#[test]
fn test_equality_against_model() {
    let model = model();
    assert!(condition(r#"If name:"Ada""#).eval_model(&model));
    assert!(!condition(r#"If name:"Bob""#).eval_model(&model));
    assert!(condition("If age:36, active:true").eval_model(&model));
    assert!(condition(r#"If "@orders[0].total":3"#).eval_model(&model));
}

#[test]
fn test_variables_and_negation() {
    let model = model();
    assert!(condition(r#"If "$item.active":false"#).eval_model(&model));
    assert!(condition(r#"If not:{"$item.active":true}"#).eval_model(&model));
    assert!(condition(r#"If or:[{name:"Bob"}, {age:36}]"#).eval_model(&model));
}

#[test]
fn test_less_and_greater() {
    let model = model();
    assert!(condition("If greater:{price:10}").eval_model(&model));
    assert!(!condition("If less:{price:10}").eval_model(&model));
    assert!(condition("If less:{age:40}, greater:{age:18}").eval_model(&model));
    assert!(!condition("If greater:{name:3}").eval_model(&model));
}

#[test]
fn test_null_and_empty_list_literals() {
    let model = model();
    assert!(condition("If nothing:null").eval_model(&model));
    assert!(condition("If missing:null").eval_model(&model));
    assert!(!condition("If name:null").eval_model(&model));
    assert!(condition("If tags:[]").eval_model(&model));
    assert!(!condition("If orders:[]").eval_model(&model));
}

#[test]
fn test_unresolvable_path_is_false() {
    let model = model();
    assert!(!condition("If nothing:1").eval_model(&model));
    assert!(condition("If not:{nothing:1}").eval_model(&model));
}

#[test]
fn test_model_cursor_is_respected() {
    let mut model = model();
    model.enter(&DataPath::parse("orders[0]").unwrap()).unwrap();
    assert!(condition("If total:3").eval_model(&model));
    assert!(condition(r#"If "^name":"Ada""#).eval_model(&model));
}
