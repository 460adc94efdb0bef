use crate::error::DataPathResult;
use crate::node::DataNode;
use crate::path::DataPath;
use crate::scope::VariableScope;
use tracing::debug;

/// How a command parameter refers to its value.
///
/// Commands accept the same parameter in three spellings: `value` carries
/// a literal, `$value` names a variable path and `@value` a data path
/// relative to the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    Literal(DataNode),
    Variable(DataPath),
    Model(DataPath),
}

/// Data root, cursor and variable scope of a run
#[derive(Debug, Clone, Default)]
pub struct ModelAccess {
    root: DataNode,
    cursor: DataPath,
    scope: VariableScope,
}

impl ModelAccess {
    pub fn new(root: DataNode) -> Self {
        Self {
            root,
            cursor: DataPath::new(),
            scope: VariableScope::new(),
        }
    }

    pub fn with_scope(mut self, scope: VariableScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn root(&self) -> &DataNode {
        &self.root
    }

    /// Absolute path of the data cursor
    pub fn cursor(&self) -> &DataPath {
        &self.cursor
    }

    pub fn scope(&self) -> &VariableScope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut VariableScope {
        &mut self.scope
    }

    /// The node under the cursor
    pub fn current(&self) -> Option<&DataNode> {
        DataPath::new().resolve(&self.root, &self.cursor, &self.scope)
    }

    pub fn resolve(&self, path: &DataPath) -> Option<&DataNode> {
        path.resolve(&self.root, &self.cursor, &self.scope)
    }

    pub fn resolve_str(&self, text: &str) -> DataPathResult<Option<&DataNode>> {
        let path = DataPath::parse(text)?;
        Ok(self.resolve(&path))
    }

    pub fn resolve_source(&self, source: &ValueSource) -> Option<DataNode> {
        match source {
            ValueSource::Literal(value) => Some(value.clone()),
            ValueSource::Variable(path) | ValueSource::Model(path) => self.resolve(path).cloned(),
        }
    }

    /// Move the cursor by `path`; `^` resets it to the root.
    pub fn enter(&mut self, path: &DataPath) -> DataPathResult<()> {
        let next = self.cursor.join(path).normalize()?;
        debug!(from = %self.cursor, to = %next, "moving data cursor");
        self.cursor = next;
        Ok(())
    }

    pub fn set_cursor(&mut self, path: DataPath) -> DataPathResult<()> {
        self.cursor = path.normalize()?;
        Ok(())
    }
}
