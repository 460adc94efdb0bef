use crate::access::ModelAccess;
use crate::error::DataPathError;
use crate::node::DataNode;
use crate::path::{DataPath, PathElement};
use crate::scope::VariableScope;
use serde_json::json;

fn sample() -> DataNode {
    DataNode::from(json!({
        "title": "Quarterly report",
        "customer": {
            "name": "Ada",
            "orders": [
                {"id": 1, "total": 12.5},
                {"id": 2, "total": 40}
            ]
        },
        "tags": ["a", "b"]
    }))
}

fn path(text: &str) -> DataPath {
    DataPath::parse(text).unwrap()
}

#[test]
fn test_parse_elements() {
    assert_eq!(
        path("customer.orders[1].total").elements(),
        &[
            PathElement::Name("customer".into()),
            PathElement::Name("orders".into()),
            PathElement::Index(1),
            PathElement::Name("total".into()),
        ]
    );
    assert_eq!(
        path("$item.price").elements(),
        &[PathElement::Variable("item".into()), PathElement::Name("price".into())]
    );
    assert_eq!(
        path("<<title").elements(),
        &[PathElement::Parent, PathElement::Parent, PathElement::Name("title".into())]
    );
    assert_eq!(path("^.tags").elements(), &[PathElement::Root, PathElement::Name("tags".into())]);
    assert_eq!(path(".").elements(), &[PathElement::Current]);
    assert!(path("").is_empty());
}

#[test]
fn test_display_round_trips() {
    for text in ["customer.orders[1].total", "$item.price", "<<title", "^tags[0]", "[2].name", "."] {
        let parsed = path(text);
        assert_eq!(DataPath::parse(&parsed.to_string()).unwrap(), parsed, "{}", text);
    }
}

#[test]
fn test_parse_errors() {
    assert!(matches!(DataPath::parse("a..b"), Err(DataPathError::InvalidPath { .. })));
    assert!(matches!(DataPath::parse("a."), Err(DataPathError::InvalidPath { .. })));
    assert!(matches!(DataPath::parse("a.$b"), Err(DataPathError::InvalidPath { .. })));
    assert!(matches!(DataPath::parse("a[x]"), Err(DataPathError::InvalidPath { .. })));
}

#[test]
fn test_parse_variable_promotes_first_name() {
    assert_eq!(DataPath::parse_variable("item.price").unwrap(), path("$item.price"));
    assert_eq!(DataPath::parse_variable("$item").unwrap(), path("$item"));
    assert!(DataPath::parse_variable("^").is_err());
}

#[test]
fn test_resolve_names_and_indices() {
    let root = sample();
    let scope = VariableScope::new();
    let start = DataPath::new();

    let total = path("customer.orders[0].total").resolve(&root, &start, &scope);
    assert_eq!(total, Some(&DataNode::leaf(12.5)));
    assert_eq!(path("customer.orders[9]").resolve(&root, &start, &scope), None);
    assert_eq!(path("title.name").resolve(&root, &start, &scope), None);
    assert_eq!(path("tags.first").resolve(&root, &start, &scope), None);
}

#[test]
fn test_resolve_parent_root_and_current() {
    let root = sample();
    let scope = VariableScope::new();
    let cursor = path("customer.orders[1]");

    assert_eq!(path("id").resolve(&root, &cursor, &scope), Some(&DataNode::leaf(2)));
    assert_eq!(path("<<name").resolve(&root, &cursor, &scope), Some(&DataNode::leaf("Ada")));
    assert_eq!(path("^title").resolve(&root, &cursor, &scope), Some(&DataNode::leaf("Quarterly report")));
    assert_eq!(path("^.customer.<.title").resolve(&root, &cursor, &scope), Some(&DataNode::leaf("Quarterly report")));
    assert_eq!(path("<<<<").resolve(&root, &cursor, &scope), None);
    assert_eq!(path(".").resolve(&root, &cursor, &scope).and_then(|n| n.get("id")), Some(&DataNode::leaf(2)));
}

#[test]
fn test_resolve_variable_keeps_data_root() {
    let root = sample();
    let mut scope = VariableScope::new();
    scope.push("item", DataNode::from(json!({"price": 3}))).unwrap();
    let start = DataPath::new();

    assert_eq!(path("$item.price").resolve(&root, &start, &scope), Some(&DataNode::leaf(3)));
    assert_eq!(path("$item.^.title").resolve(&root, &start, &scope), Some(&DataNode::leaf("Quarterly report")));
    assert_eq!(path("$missing.price").resolve(&root, &start, &scope), None);
}

#[test]
fn test_resolution_is_idempotent() {
    let root = sample();
    let mut scope = VariableScope::new();
    scope.push("order", DataNode::leaf(7)).unwrap();
    let cursor = path("customer");

    for text in ["orders[1].total", "$order", "<tags[1]", "missing.deep"] {
        let p = path(text);
        let first = p.resolve(&root, &cursor, &scope).cloned();
        let second = p.resolve(&root, &cursor, &scope).cloned();
        assert_eq!(first, second, "{}", text);
    }
}

#[test]
fn test_normalize() {
    assert_eq!(path("a.b<c").normalize().unwrap(), path("a.c"));
    assert_eq!(path("a.b^x[0]").normalize().unwrap(), path("x[0]"));
    assert_eq!(path("<<").normalize().unwrap(), DataPath::new());
    assert!(path("$v.a").normalize().is_err());
}

#[test]
fn test_model_access_cursor() {
    let mut access = ModelAccess::new(sample());
    access.enter(&path("customer.orders")).unwrap();
    assert_eq!(access.resolve_str("[1].id").unwrap(), Some(&DataNode::leaf(2)));

    access.enter(&path("<")).unwrap();
    assert_eq!(access.resolve_str("name").unwrap(), Some(&DataNode::leaf("Ada")));
    assert_eq!(access.current().and_then(|n| n.get("name")), Some(&DataNode::leaf("Ada")));

    access.enter(&DataPath::root()).unwrap();
    assert!(access.cursor().is_empty());
    assert_eq!(access.resolve_str("title").unwrap(), Some(&DataNode::leaf("Quarterly report")));
}
