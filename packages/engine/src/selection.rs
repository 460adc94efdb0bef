use crate::alias::AliasTable;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::resource::{ImageDimensions, NoResources, ResourceProvider};
use docweave_common::SelfClearingCache;
use docweave_document::{Document, NodeId, PlaceholderToolkit};
use docweave_model::{DataNode, DataPath, ModelAccess, ValueSource};
use docweave_parser::{parse_payload, CommandInvocation};
use std::sync::Arc;

/// Engine-level collaborators shared by every selection of a run
pub struct Services {
    pub config: EngineConfig,
    pub resources: Arc<dyn ResourceProvider>,
    pub dimensions: ImageDimensions,
    /// Imported resource text by resource identifier
    pub fragments: SelfClearingCache<String, String>,
}

impl Services {
    /// Services without resources; caches flush after the configured TTL.
    pub fn new(config: EngineConfig) -> Self {
        let ttl = config.cache_ttl();
        Self {
            config,
            resources: Arc::new(NoResources),
            dimensions: ImageDimensions::new(ttl),
            fragments: SelfClearingCache::new(ttl),
        }
    }
}

/// Execution context of one command invocation.
///
/// Built fresh for every dispatched command and dropped afterwards.
pub struct Selection<'a> {
    pub doc: &'a mut Document,
    /// The placeholder node
    pub node: NodeId,
    pub invocation: &'a CommandInvocation,
    pub model: &'a mut ModelAccess,
    /// Text capability; absent when the document kind cannot hold text
    pub toolkit: Option<&'a dyn PlaceholderToolkit>,
    pub services: &'a Services,
    /// Aliases defined so far in this run
    pub aliases: &'a mut AliasTable,
}

impl<'a> Selection<'a> {
    pub fn toolkit(&self) -> EngineResult<&'a dyn PlaceholderToolkit> {
        self.toolkit
            .ok_or_else(|| EngineError::structure("no placeholder toolkit for this document"))
    }

    pub fn command(&self) -> &str {
        &self.invocation.name
    }

    pub fn str_param(&self, key: &str) -> Option<&'a str> {
        self.invocation.str_param(key)
    }

    pub fn require_str(&self, key: &str) -> EngineResult<&'a str> {
        self.str_param(key).ok_or_else(|| {
            EngineError::structure(format!("{} requires a '{}' parameter", self.command(), key))
        })
    }

    /// Which spelling of `key` the invocation uses: `key` (literal),
    /// `$key` (variable path) or `@key` (data path).
    pub fn value_source(&self, key: &str) -> EngineResult<Option<ValueSource>> {
        if let Some(value) = self.invocation.param(key) {
            return Ok(Some(ValueSource::Literal(DataNode::from(value.clone()))));
        }
        if let Some(value) = self.invocation.param(&format!("${}", key)) {
            let text = value
                .as_str()
                .ok_or_else(|| EngineError::invalid_value(format!("'${}' must be a path string", key)))?;
            return Ok(Some(ValueSource::Variable(DataPath::parse_variable(text)?)));
        }
        if let Some(value) = self.invocation.param(&format!("@{}", key)) {
            let text = value
                .as_str()
                .ok_or_else(|| EngineError::invalid_value(format!("'@{}' must be a path string", key)))?;
            let path = DataPath::parse(text)?;
            let source = if path.has_variable() {
                ValueSource::Variable(path)
            } else {
                ValueSource::Model(path)
            };
            return Ok(Some(source));
        }
        Ok(None)
    }

    /// Resolve the value triple `key` / `$key` / `@key`.
    ///
    /// `Ok(None)` when the parameter is missing or its path resolves to
    /// nothing.
    pub fn resolve_value(&self, key: &str) -> EngineResult<Option<DataNode>> {
        Ok(self
            .value_source(key)?
            .and_then(|source| self.model.resolve_source(&source)))
    }

    /// Matching closing placeholder for the area opened at this node.
    ///
    /// Placeholders named in `openers` nest; the first `closer` at depth
    /// zero ends the area. Names go through the run's aliases, and
    /// placeholders inside `Ignore` regions do not count.
    pub fn find_area_end(&mut self, openers: &[&str], closer: &str) -> EngineResult<NodeId> {
        let toolkit = self.toolkit()?;
        let mut depth = 0usize;
        let mut ignoring = false;
        let mut cursor = self.doc.next_after(self.node);

        while let Some(from) = cursor {
            let Some(found) = toolkit.next_placeholder(self.doc, from)? else {
                break;
            };
            let name = toolkit
                .payload_text(self.doc, found)
                .and_then(|payload| parse_payload(&payload).ok())
                .and_then(|payload| payload.first().map(|c| self.aliases.command_name(&c.name).to_string()));

            match name.as_deref() {
                Some(n) if n == closer && depth == 0 && !ignoring => return Ok(found),
                Some("Ignore") if closer != "EndIgnore" => ignoring = true,
                Some("EndIgnore") if ignoring => ignoring = false,
                _ if ignoring => {}
                Some(n) if n == closer => depth -= 1,
                Some(n) if openers.contains(&n) => depth += 1,
                _ => {}
            }
            cursor = self.doc.next_after(found);
        }

        Err(EngineError::structure(format!(
            "{} has no matching {}",
            self.command(),
            closer
        )))
    }
}
