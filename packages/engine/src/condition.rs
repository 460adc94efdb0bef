//! Condition expressions
//!
//! A condition is a closed tree of [`ConditionElement`]s: path/literal
//! comparisons at the leaves, `And`/`Or`/`Not` above them. Placeholders
//! write conditions as lenient JSON objects:
//!
//! ```text
//! ${If and:{"$item.active":true, not:{"@stock":0}}, greater:{"@price":10}}
//! ```
//!
//! Keys `and`, `or`, `not`, `less` and `greater` combine; any other key is
//! a field compared against its value. A field starting with `$` reads a
//! variable, otherwise (with or without `@`) it reads the data model.
//! Sibling entries of one object are combined with AND.
//!
//! Comparisons are leaves: a field mapped to an object would be a
//! comparison with children, which is rejected as an invalid condition.

use crate::error::{EngineError, EngineResult};
use docweave_model::{DataNode, DataPath, ModelAccess};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    Less,
    Greater,
}

impl ComparisonOp {
    fn accepts(&self, ordering: Ordering) -> bool {
        matches!(
            (self, ordering),
            (ComparisonOp::Equal, Ordering::Equal)
                | (ComparisonOp::Less, Ordering::Less)
                | (ComparisonOp::Greater, Ordering::Greater)
        )
    }
}

/// Where a comparison reads its value from
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
    Variable(DataPath),
    Model(DataPath),
}

impl FieldRef {
    pub fn parse(field: &str) -> EngineResult<Self> {
        let parsed = if let Some(rest) = field.strip_prefix('@') {
            DataPath::parse(rest).map(FieldRef::Model)
        } else if field.starts_with('$') {
            DataPath::parse_variable(field).map(FieldRef::Variable)
        } else {
            DataPath::parse(field).map(FieldRef::Model)
        };
        parsed.map_err(|e| EngineError::invalid_condition(field, e.to_string()))
    }

    pub fn path(&self) -> &DataPath {
        match self {
            FieldRef::Variable(path) | FieldRef::Model(path) => path,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Variable(path) => write!(f, "{}", path),
            FieldRef::Model(path) => write!(f, "@{}", path),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: FieldRef,
    pub literal: DataNode,
    pub op: ComparisonOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionElement {
    Comparison(Comparison),
    And(Vec<ConditionElement>),
    Or(Vec<ConditionElement>),
    Not(Box<ConditionElement>),
}

/// Node kinds accepted by [`ConditionElement::build`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    Comparison {
        field: String,
        literal: DataNode,
        op: ComparisonOp,
    },
    And,
    Or,
    Not,
}

impl ConditionElement {
    /// Generic constructor enforcing the shape rules: comparisons take no
    /// children and `Not` takes exactly one.
    pub fn build(kind: ConditionKind, children: Vec<ConditionElement>) -> EngineResult<Self> {
        match kind {
            ConditionKind::Comparison { field, literal, op } => {
                if !children.is_empty() {
                    return Err(EngineError::invalid_condition(
                        field,
                        "a comparison cannot have nested conditions",
                    ));
                }
                Ok(ConditionElement::Comparison(Comparison {
                    field: FieldRef::parse(&field)?,
                    literal,
                    op,
                }))
            }
            ConditionKind::And => Ok(ConditionElement::And(children)),
            ConditionKind::Or => Ok(ConditionElement::Or(children)),
            ConditionKind::Not => {
                let mut children = children;
                if children.len() != 1 {
                    return Err(EngineError::invalid_condition(
                        "not",
                        format!("expected exactly one condition, found {}", children.len()),
                    ));
                }
                Ok(ConditionElement::Not(Box::new(children.remove(0))))
            }
        }
    }

    pub fn comparison(field: &str, literal: impl Into<DataNode>, op: ComparisonOp) -> EngineResult<Self> {
        Self::build(
            ConditionKind::Comparison {
                field: field.to_string(),
                literal: literal.into(),
                op,
            },
            Vec::new(),
        )
    }

    /// Parse the parameter object of a conditional command. All entries
    /// must hold.
    pub fn from_params(params: &Map<String, Value>) -> EngineResult<Self> {
        let mut children = parse_entries(params, ComparisonOp::Equal)?;
        if children.len() == 1 {
            return Ok(children.remove(0));
        }
        Self::build(ConditionKind::And, children)
    }

    /// Evaluate with short-circuiting, left to right.
    ///
    /// `compare` orders the value a comparison refers to against its
    /// literal, or returns `None` when they cannot be compared; such a
    /// comparison is false. An empty `And` is true and an empty `Or` is
    /// false.
    pub fn eval<F>(&self, compare: &mut F) -> bool
    where
        F: FnMut(&Comparison) -> Option<Ordering>,
    {
        match self {
            ConditionElement::Comparison(comparison) => {
                compare(comparison).map_or(false, |ordering| comparison.op.accepts(ordering))
            }
            ConditionElement::And(children) => children.iter().all(|c| c.eval(compare)),
            ConditionElement::Or(children) => children.iter().any(|c| c.eval(compare)),
            ConditionElement::Not(child) => !child.eval(compare),
        }
    }

    /// Evaluate against a data model and variable scope.
    pub fn eval_model(&self, model: &ModelAccess) -> bool {
        self.eval(&mut |comparison: &Comparison| compare_with_model(model, comparison))
    }
}

fn parse_entries(entries: &Map<String, Value>, op: ComparisonOp) -> EngineResult<Vec<ConditionElement>> {
    entries
        .iter()
        .map(|(key, value)| parse_entry(key, value, op))
        .collect()
}

fn parse_entry(key: &str, value: &Value, op: ComparisonOp) -> EngineResult<ConditionElement> {
    match key {
        "and" => ConditionElement::build(ConditionKind::And, parse_group(key, value)?),
        "or" => ConditionElement::build(ConditionKind::Or, parse_group(key, value)?),
        "not" => {
            let mut children = parse_group(key, value)?;
            let child = if children.len() == 1 {
                children.remove(0)
            } else {
                ConditionElement::build(ConditionKind::And, children)?
            };
            ConditionElement::build(ConditionKind::Not, vec![child])
        }
        "less" => combine(parse_operator_group(key, value, ComparisonOp::Less)?),
        "greater" => combine(parse_operator_group(key, value, ComparisonOp::Greater)?),
        field => {
            let children = match value {
                Value::Object(nested) => parse_entries(nested, op)?,
                _ => Vec::new(),
            };
            ConditionElement::build(
                ConditionKind::Comparison {
                    field: field.to_string(),
                    literal: DataNode::from(value.clone()),
                    op,
                },
                children,
            )
        }
    }
}

/// Children of `and`/`or`/`not`: an object (one child per entry) or an
/// array of objects (one child per object).
fn parse_group(key: &str, value: &Value) -> EngineResult<Vec<ConditionElement>> {
    match value {
        Value::Object(entries) => parse_entries(entries, ComparisonOp::Equal),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(entries) => {
                    let mut children = parse_entries(entries, ComparisonOp::Equal)?;
                    if children.len() == 1 {
                        Ok(children.remove(0))
                    } else {
                        ConditionElement::build(ConditionKind::And, children)
                    }
                }
                _ => Err(EngineError::invalid_condition(key, "expected an object")),
            })
            .collect(),
        _ => Err(EngineError::invalid_condition(key, "expected an object or array")),
    }
}

fn parse_operator_group(key: &str, value: &Value, op: ComparisonOp) -> EngineResult<Vec<ConditionElement>> {
    match value {
        Value::Object(entries) => entries
            .iter()
            .map(|(field, literal)| match field.as_str() {
                "and" | "or" | "not" | "less" | "greater" => Err(EngineError::invalid_condition(
                    field.as_str(),
                    format!("'{}' only accepts comparisons", key),
                )),
                _ => parse_entry(field, literal, op),
            })
            .collect(),
        _ => Err(EngineError::invalid_condition(key, "expected an object")),
    }
}

fn combine(mut children: Vec<ConditionElement>) -> EngineResult<ConditionElement> {
    if children.len() == 1 {
        Ok(children.remove(0))
    } else {
        ConditionElement::build(ConditionKind::And, children)
    }
}

/// Order the value a comparison points at against its literal.
///
/// - a `null` literal equals an absent or null value
/// - an empty-list literal equals an empty list
/// - leaves compare by [`Scalar::compare`](docweave_model::Scalar::compare)
/// - anything else is not comparable
pub fn compare_with_model(model: &ModelAccess, comparison: &Comparison) -> Option<Ordering> {
    let resolved = model.resolve(comparison.field.path());

    match (&comparison.literal, resolved) {
        (literal, None) if literal.is_null() => Some(Ordering::Equal),
        (_, None) => None,
        (DataNode::List(expected), Some(DataNode::List(actual))) if expected.is_empty() => {
            actual.is_empty().then_some(Ordering::Equal)
        }
        (DataNode::Leaf(expected), Some(DataNode::Leaf(actual))) => actual.compare(expected),
        _ => None,
    }
}
