use crate::error::{DataPathError, DataPathResult};
use crate::node::DataNode;
use std::collections::HashMap;

/// Per-run variable bindings.
///
/// Each name owns its own stack: pushing shadows the visible binding and
/// popping reveals the previous one.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    stacks: HashMap<String, Vec<DataNode>>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate_name(name: &str) -> DataPathResult<()> {
        let invalid = name.is_empty()
            || name
                .chars()
                .any(|c| matches!(c, '.' | '[' | ']' | '^' | '<' | '$') || c.is_whitespace());
        if invalid {
            return Err(DataPathError::InvalidVariableName(name.to_string()));
        }
        Ok(())
    }

    pub fn push(&mut self, name: impl Into<String>, value: DataNode) -> DataPathResult<()> {
        let name = name.into();
        Self::validate_name(&name)?;
        self.stacks.entry(name).or_default().push(value);
        Ok(())
    }

    /// Remove the top binding for `name`, if any.
    pub fn pop(&mut self, name: &str) -> Option<DataNode> {
        let stack = self.stacks.get_mut(name)?;
        let value = stack.pop();
        if stack.is_empty() {
            self.stacks.remove(name);
        }
        value
    }

    /// The visible (most recent) binding for `name`.
    pub fn get(&self, name: &str) -> Option<&DataNode> {
        self.stacks.get(name).and_then(|stack| stack.last())
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of stacked bindings for `name`.
    pub fn depth(&self, name: &str) -> usize {
        self.stacks.get(name).map_or(0, Vec::len)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stacks.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}
