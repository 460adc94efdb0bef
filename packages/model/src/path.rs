//! Data paths
//!
//! Textual syntax:
//!
//! | Text      | Element                              |
//! |-----------|--------------------------------------|
//! | `name`    | map child lookup                     |
//! | `[3]`     | list child lookup                    |
//! | `$name`   | variable binding (first element only)|
//! | `<`       | parent of the cursor                 |
//! | `^`       | data root                            |
//! | `.`       | the starting cursor (whole path)     |
//!
//! Names are separated by dots: `customer.orders[0].total`, `<.title`,
//! `^.settings`, `$item.price`.

use crate::error::{DataPathError, DataPathResult};
use crate::node::DataNode;
use crate::scope::VariableScope;
use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum PathToken<'src> {
    #[token(".")]
    Dot,

    #[token("<")]
    Parent,

    #[token("^")]
    Root,

    #[regex(r"\[[0-9]+\]", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].parse::<usize>().ok()
    })]
    Index(usize),

    #[regex(r"\$[^.\[\]<^$ \t\r\n]+", |lex| &lex.slice()[1..])]
    Variable(&'src str),

    #[regex(r"[^.\[\]<^$ \t\r\n]+", |lex| lex.slice())]
    Name(&'src str),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathElement {
    Name(String),
    Index(usize),
    Variable(String),
    Parent,
    Root,
    Current,
}

/// Ordered navigation steps through the data tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataPath {
    elements: Vec<PathElement>,
}

impl DataPath {
    /// The empty path; resolves to the starting cursor.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    pub fn root() -> Self {
        Self {
            elements: vec![PathElement::Root],
        }
    }

    pub fn parse(text: &str) -> DataPathResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        if trimmed == "." {
            return Ok(Self::from_elements(vec![PathElement::Current]));
        }

        let mut elements = Vec::new();
        // True when the previous element was a named step and the next name
        // needs a separating dot.
        let mut needs_dot = false;
        let mut pending_dot = false;

        for (token, span) in PathToken::lexer(trimmed).spanned() {
            let token = token
                .map_err(|_| DataPathError::invalid_path(text, span.start, "unexpected character"))?;

            match token {
                PathToken::Dot => {
                    if pending_dot {
                        return Err(DataPathError::invalid_path(text, span.start, "empty path segment"));
                    }
                    pending_dot = true;
                    needs_dot = false;
                    continue;
                }
                PathToken::Name(name) => {
                    if needs_dot {
                        return Err(DataPathError::invalid_path(text, span.start, "expected '.' before name"));
                    }
                    elements.push(PathElement::Name(name.to_string()));
                    needs_dot = true;
                }
                PathToken::Index(index) => {
                    if pending_dot {
                        return Err(DataPathError::invalid_path(text, span.start, "index cannot follow '.'"));
                    }
                    elements.push(PathElement::Index(index));
                    needs_dot = true;
                }
                PathToken::Variable(name) => {
                    if !elements.is_empty() {
                        return Err(DataPathError::invalid_path(
                            text,
                            span.start,
                            "variables may only start a path",
                        ));
                    }
                    elements.push(PathElement::Variable(name.to_string()));
                    needs_dot = true;
                }
                PathToken::Parent => {
                    elements.push(PathElement::Parent);
                    needs_dot = false;
                }
                PathToken::Root => {
                    elements.push(PathElement::Root);
                    needs_dot = false;
                }
            }
            pending_dot = false;
        }

        if pending_dot && !elements.is_empty() {
            return Err(DataPathError::invalid_path(text, trimmed.len(), "trailing '.'"));
        }

        Ok(Self { elements })
    }

    /// Parse `name.sub` (or `$name.sub`) as a path whose first step is the
    /// variable `name`.
    pub fn parse_variable(text: &str) -> DataPathResult<Self> {
        let trimmed = text.trim();
        if trimmed.starts_with('$') {
            return Self::parse(trimmed);
        }
        let mut path = Self::parse(trimmed)?;
        match path.elements.first() {
            Some(PathElement::Name(name)) => {
                path.elements[0] = PathElement::Variable(name.clone());
                Ok(path)
            }
            _ => Err(DataPathError::invalid_path(text, 0, "expected a variable name")),
        }
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_variable(&self) -> bool {
        self.elements
            .iter()
            .any(|el| matches!(el, PathElement::Variable(_)))
    }

    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Concatenate `other` after this path.
    pub fn join(&self, other: &DataPath) -> DataPath {
        let mut elements = self.elements.clone();
        elements.extend(other.elements.iter().cloned());
        DataPath { elements }
    }

    /// Collapse navigation steps syntactically: `Parent` removes the step
    /// before it, `Root` discards everything before it and `Current` is
    /// dropped. The result is an absolute path of names and indices.
    ///
    /// Variable steps cannot be collapsed without data and are rejected.
    pub fn normalize(&self) -> DataPathResult<DataPath> {
        let mut elements = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            match element {
                PathElement::Name(_) | PathElement::Index(_) => elements.push(element.clone()),
                PathElement::Parent => {
                    elements.pop();
                }
                PathElement::Root => elements.clear(),
                PathElement::Current => {}
                PathElement::Variable(_) => {
                    return Err(DataPathError::VariableNotAllowed(self.to_string()));
                }
            }
        }
        Ok(DataPath { elements })
    }

    /// Resolve this path starting from `cursor` (an absolute path into
    /// `root`).
    ///
    /// Every step either moves the cursor or yields absence; absence short
    /// circuits the remaining steps. Variable steps look up `scope` and do
    /// not change what `^` refers to. Resolution never mutates anything.
    pub fn resolve<'a>(
        &self,
        root: &'a DataNode,
        cursor: &DataPath,
        scope: &'a VariableScope,
    ) -> Option<&'a DataNode> {
        let mut stack: Vec<&'a DataNode> = vec![root];
        for element in &cursor.elements {
            step(&mut stack, element, root, &[root], scope)?;
        }

        let anchor = stack.clone();
        for element in &self.elements {
            step(&mut stack, element, root, &anchor, scope)?;
        }
        stack.last().copied()
    }
}

fn step<'a>(
    stack: &mut Vec<&'a DataNode>,
    element: &PathElement,
    root: &'a DataNode,
    anchor: &[&'a DataNode],
    scope: &'a VariableScope,
) -> Option<()> {
    match element {
        PathElement::Name(name) => {
            let next = stack.last()?.get(name)?;
            stack.push(next);
        }
        PathElement::Index(index) => {
            let next = stack.last()?.at(*index)?;
            stack.push(next);
        }
        PathElement::Variable(name) => {
            let bound = scope.get(name)?;
            stack.clear();
            stack.push(bound);
        }
        PathElement::Parent => {
            if stack.len() <= 1 {
                return None;
            }
            stack.pop();
        }
        PathElement::Root => {
            stack.clear();
            stack.push(root);
        }
        PathElement::Current => {
            stack.clear();
            stack.extend_from_slice(anchor);
        }
    }
    Some(())
}

impl FromStr for DataPath {
    type Err = DataPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataPath::parse(s)
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous_named = false;
        for element in &self.elements {
            match element {
                PathElement::Name(name) => {
                    if previous_named {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                    previous_named = true;
                }
                PathElement::Index(index) => {
                    write!(f, "[{}]", index)?;
                    previous_named = true;
                }
                PathElement::Variable(name) => {
                    write!(f, "${}", name)?;
                    previous_named = true;
                }
                PathElement::Parent => {
                    f.write_str("<")?;
                    previous_named = false;
                }
                PathElement::Root => {
                    f.write_str("^")?;
                    previous_named = false;
                }
                PathElement::Current => {
                    f.write_str(".")?;
                    previous_named = false;
                }
            }
        }
        Ok(())
    }
}
