//! Command aliases
//!
//! An alias maps a placeholder name onto another command. It can rename
//! parameters and supply defaults for parameters the placeholder leaves
//! out. Aliases come from the host through
//! [`Engine::with_alias`](crate::Engine::with_alias) or from `${Alias ...}`
//! placeholders earlier in the same document.

use docweave_parser::CommandInvocation;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDefinition {
    /// Name written in the placeholder
    pub key: String,
    /// Command the placeholder runs as
    pub replace_key: String,
    /// Defaults for parameters the placeholder does not spell out
    pub attributes: Map<String, Value>,
    /// Parameter renames, by name without access prefix
    pub attr_replacements: HashMap<String, String>,
}

impl AliasDefinition {
    pub fn new(key: impl Into<String>, replace_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            replace_key: replace_key.into(),
            attributes: Map::new(),
            attr_replacements: HashMap::new(),
        }
    }

    /// Alias standing for a complete invocation: its name becomes the
    /// target command and its parameters the defaults.
    pub fn for_invocation(key: impl Into<String>, invocation: &CommandInvocation) -> Self {
        Self {
            key: key.into(),
            replace_key: invocation.name.clone(),
            attributes: invocation.params.clone(),
            attr_replacements: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_attr_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.attr_replacements.insert(from.into(), to.into());
        self
    }

    fn apply(&self, invocation: &CommandInvocation) -> CommandInvocation {
        let mut params = Map::new();
        for (name, value) in &invocation.params {
            let (prefix, pure) = split_access(name);
            let name = match self.attr_replacements.get(pure) {
                Some(renamed) => format!("{}{}", prefix, renamed),
                None => name.clone(),
            };
            params.insert(name, value.clone());
        }
        for (name, value) in &self.attributes {
            let (_, pure) = split_access(name);
            let spelled = params.keys().any(|existing| split_access(existing).1 == pure);
            if !spelled {
                params.insert(name.clone(), value.clone());
            }
        }
        CommandInvocation {
            name: self.replace_key.clone(),
            params,
            span: invocation.span,
        }
    }
}

/// `$name` and `@name` address the same parameter as `name`.
fn split_access(name: &str) -> (&str, &str) {
    match name.chars().next() {
        Some('$') | Some('@') => name.split_at(1),
        _ => ("", name),
    }
}

/// Aliases known to one run
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, AliasDefinition>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `alias`, replacing an earlier one with the same key.
    pub fn define(&mut self, alias: AliasDefinition) {
        trace!(alias = %alias.key, target = %alias.replace_key, "alias defined");
        self.aliases.insert(alias.key.clone(), alias);
    }

    pub fn get(&self, key: &str) -> Option<&AliasDefinition> {
        self.aliases.get(key)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Command that a placeholder named `name` runs as
    pub fn command_name<'n>(&'n self, name: &'n str) -> &'n str {
        self.aliases
            .get(name)
            .map(|alias| alias.replace_key.as_str())
            .unwrap_or(name)
    }

    /// `invocation` rewritten through its alias. Expansion is a single
    /// step; an alias naming another alias is not followed.
    pub fn expand(&self, invocation: &CommandInvocation) -> CommandInvocation {
        match self.aliases.get(&invocation.name) {
            Some(alias) => alias.apply(invocation),
            None => invocation.clone(),
        }
    }
}
