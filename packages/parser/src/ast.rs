use crate::lexer::Span;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed `(name, parameters)` pair taken from a placeholder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub name: String,
    pub params: Map<String, Value>,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
            span: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// String parameter; non-string values are absent.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn int_param(&self, key: &str) -> Option<i64> {
        self.params.get(key).and_then(Value::as_i64)
    }

    pub fn bool_param(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(Value::as_bool)
    }
}

// Equality ignores where the invocation was parsed from.
impl PartialEq for CommandInvocation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params
    }
}

/// All invocations of one placeholder, in execution order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub commands: Vec<CommandInvocation>,
}

impl Payload {
    pub fn single(command: CommandInvocation) -> Self {
        Self {
            commands: vec![command],
        }
    }

    pub fn is_single(&self) -> bool {
        self.commands.len() == 1
    }

    pub fn first(&self) -> Option<&CommandInvocation> {
        self.commands.first()
    }
}
