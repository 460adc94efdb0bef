use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Opaque scalar carried by a leaf node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Ordering between two scalars of compatible kinds.
    ///
    /// Integers and floats compare numerically with each other; every other
    /// kind only compares with itself. Mixed kinds are not comparable.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => Some(Ordering::Equal),
            // Booleans only compare for equality.
            (Scalar::Bool(a), Scalar::Bool(b)) => (a == b).then_some(Ordering::Equal),
            (Scalar::Integer(a), Scalar::Integer(b)) => Some(a.cmp(b)),
            (Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Text used when the scalar is substituted into a document.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Map,
    List,
}

/// A node of the application data tree.
///
/// The kind is fixed at creation. Map children keep insertion order for
/// enumeration; lookups are by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataNode {
    Leaf(Scalar),
    List(Vec<DataNode>),
    Map(IndexMap<String, DataNode>),
}

impl DataNode {
    pub fn null() -> Self {
        DataNode::Leaf(Scalar::Null)
    }

    pub fn leaf(value: impl Into<Scalar>) -> Self {
        DataNode::Leaf(value.into())
    }

    pub fn map() -> Self {
        DataNode::Map(IndexMap::new())
    }

    pub fn list() -> Self {
        DataNode::List(Vec::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            DataNode::Leaf(_) => NodeKind::Leaf,
            DataNode::Map(_) => NodeKind::Map,
            DataNode::List(_) => NodeKind::List,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DataNode::Leaf(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataNode::Leaf(Scalar::Null))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            DataNode::Leaf(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DataNode]> {
        match self {
            DataNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, DataNode>> {
        match self {
            DataNode::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Map child by key. Absent for non-map nodes.
    pub fn get(&self, name: &str) -> Option<&DataNode> {
        self.as_map().and_then(|entries| entries.get(name))
    }

    /// List child by position. Absent for non-list nodes and out-of-range
    /// positions.
    pub fn at(&self, index: usize) -> Option<&DataNode> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Insert into a map node, returning `false` if this is not a map.
    pub fn insert(&mut self, name: impl Into<String>, value: DataNode) -> bool {
        match self {
            DataNode::Map(entries) => {
                entries.insert(name.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Append to a list node, returning `false` if this is not a list.
    pub fn push(&mut self, value: DataNode) -> bool {
        match self {
            DataNode::List(items) => {
                items.push(value);
                true
            }
            _ => false,
        }
    }

    /// Number of direct children (0 for leaves).
    pub fn len(&self) -> usize {
        match self {
            DataNode::Leaf(_) => 0,
            DataNode::List(items) => items.len(),
            DataNode::Map(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DataNode::Leaf(Scalar::Null) => serde_json::Value::Null,
            DataNode::Leaf(Scalar::Bool(b)) => serde_json::Value::Bool(*b),
            DataNode::Leaf(Scalar::Integer(i)) => serde_json::Value::from(*i),
            DataNode::Leaf(Scalar::Float(f)) => serde_json::Value::from(*f),
            DataNode::Leaf(Scalar::String(s)) => serde_json::Value::String(s.clone()),
            DataNode::List(items) => {
                serde_json::Value::Array(items.iter().map(DataNode::to_json).collect())
            }
            DataNode::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Default for DataNode {
    fn default() -> Self {
        DataNode::null()
    }
}

impl From<serde_json::Value> for DataNode {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => DataNode::null(),
            Value::Bool(b) => DataNode::leaf(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DataNode::leaf(i),
                None => DataNode::leaf(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => DataNode::leaf(s),
            Value::Array(items) => DataNode::List(items.into_iter().map(DataNode::from).collect()),
            Value::Object(entries) => DataNode::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, DataNode::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Scalar> for DataNode {
    fn from(value: Scalar) -> Self {
        DataNode::Leaf(value)
    }
}

impl From<&str> for DataNode {
    fn from(value: &str) -> Self {
        DataNode::leaf(value)
    }
}

impl From<String> for DataNode {
    fn from(value: String) -> Self {
        DataNode::leaf(value)
    }
}

impl From<i64> for DataNode {
    fn from(value: i64) -> Self {
        DataNode::leaf(value)
    }
}

impl From<bool> for DataNode {
    fn from(value: bool) -> Self {
        DataNode::leaf(value)
    }
}

impl From<Vec<DataNode>> for DataNode {
    fn from(items: Vec<DataNode>) -> Self {
        DataNode::List(items)
    }
}
