//! Placeholder scanner and engine entry point
//!
//! The scanner walks the document in order. Every placeholder it meets is
//! parsed, its commands are dispatched one after another, and the
//! continuation reported by the last command decides where the walk
//! resumes. Nodes behind a continuation are never revisited, so text a
//! command wrote is not scanned again.

use crate::alias::{AliasDefinition, AliasTable};
use crate::config::{EngineConfig, UnknownCommandPolicy};
use crate::error::{EngineError, EngineResult};
use crate::modifiers::{Continuation, DeletePlaceholder, Modifier, ModifierResult};
use crate::registry::{CommandRegistry, CommandResult};
use crate::resource::{ImageDimensions, ResourceProvider};
use crate::selection::{Selection, Services};
use docweave_common::Problem;
use docweave_document::{Document, NodeId, PlaceholderToolkit, TextToolkit};
use docweave_model::ModelAccess;
use docweave_parser::{parse_payload, CommandInvocation, Payload};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Placeholders whose commands ran to completion
    pub executed: usize,
    /// Placeholders left in the document as literal text
    pub ignored: usize,
    /// Per-placeholder failures, in document order
    pub problems: Vec<Problem>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Command execution engine.
///
/// An engine is immutable once built and may be shared between runs and
/// threads. Each run gets its own document and data model.
pub struct Engine {
    registry: Arc<CommandRegistry>,
    services: Services,
    /// Aliases every run starts with
    aliases: AliasTable,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: CommandRegistry::builtin(),
            services: Services::new(config),
            aliases: AliasTable::new(),
        }
    }

    pub fn with_registry(mut self, registry: impl Into<Arc<CommandRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceProvider>) -> Self {
        self.services.resources = resources;
        self
    }

    pub fn with_alias(mut self, alias: AliasDefinition) -> Self {
        self.aliases.define(alias);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.services.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn dimensions(&self) -> &ImageDimensions {
        &self.services.dimensions
    }

    /// Execute every placeholder of `doc` against `model`.
    ///
    /// Per-placeholder failures end up in the report unless `failFast` is
    /// set. An unknown command under the `fail` policy, a step limit
    /// overrun and toolkit failures while scanning abort the run; the
    /// document keeps whatever edits were made up to that point.
    #[instrument(skip_all, fields(nodes = doc.arena_len()))]
    pub fn run(
        &self,
        doc: &mut Document,
        toolkit: &dyn PlaceholderToolkit,
        model: &mut ModelAccess,
    ) -> EngineResult<RunReport> {
        info!("Starting template run");
        let root = doc.root();
        let mut scanner = Scanner {
            engine: self,
            doc,
            toolkit,
            model,
            aliases: self.aliases.clone(),
            report: RunReport::default(),
            steps: 0,
        };
        scanner.scan(root)?;

        let report = scanner.report;
        info!(
            executed = report.executed,
            ignored = report.ignored,
            problems = report.problems.len(),
            "Template run complete"
        );
        Ok(report)
    }

    /// Render a plain-text template, one paragraph per line.
    pub fn render_text(&self, template: &str, model: &mut ModelAccess) -> EngineResult<(String, RunReport)> {
        let mut doc = Document::from_text(template);
        let toolkit = TextToolkit::new(self.services.config.delimiters());
        let report = self.run(&mut doc, &toolkit, model)?;
        Ok((doc.to_text(), report))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("config", &self.services.config)
            .finish()
    }
}

enum ScanState {
    Scanning(Option<NodeId>),
    PlaceholderFound(NodeId),
    Dispatching {
        node: NodeId,
        payload: Payload,
        marker: String,
        /// Resume point computed before any command touched the tree
        fallback: Option<NodeId>,
    },
    Done,
}

/// What the commands of one placeholder did
enum Dispatch {
    /// The marker stays; scanning continues after it
    Keep,
    Resume(Continuation),
}

struct Scanner<'e, 'r> {
    engine: &'e Engine,
    doc: &'r mut Document,
    toolkit: &'r dyn PlaceholderToolkit,
    model: &'r mut ModelAccess,
    aliases: AliasTable,
    report: RunReport,
    steps: usize,
}

impl<'e, 'r> Scanner<'e, 'r> {
    fn scan(&mut self, from: NodeId) -> EngineResult<()> {
        let mut state = ScanState::Scanning(Some(from));
        loop {
            state = match state {
                ScanState::Scanning(None) => ScanState::Done,
                ScanState::Scanning(Some(from)) => match self.toolkit.next_placeholder(self.doc, from)? {
                    Some(node) => ScanState::PlaceholderFound(node),
                    None => ScanState::Done,
                },
                ScanState::PlaceholderFound(node) => self.parse(node)?,
                ScanState::Dispatching {
                    node,
                    payload,
                    marker,
                    fallback,
                } => {
                    let dispatch = self.dispatch(node, &payload, &marker)?;
                    ScanState::Scanning(self.resume(node, fallback, dispatch))
                }
                ScanState::Done => return Ok(()),
            };
        }
    }

    fn parse(&mut self, node: NodeId) -> EngineResult<ScanState> {
        self.steps += 1;
        let max_steps = self.engine.services.config.max_steps;
        if self.steps > max_steps {
            return Err(EngineError::StepLimit(max_steps));
        }

        let fallback = self.doc.next_after(node);
        let marker = self.doc.text(node).unwrap_or_default().to_string();
        let Some(text) = self.toolkit.payload_text(self.doc, node) else {
            return Ok(ScanState::Scanning(fallback));
        };
        trace!(node = node.index(), marker = %marker, "placeholder found");

        match parse_payload(&text) {
            Ok(payload) => Ok(ScanState::Dispatching {
                node,
                payload,
                marker,
                fallback,
            }),
            Err(e) => {
                self.report.ignored += 1;
                self.record(e.into(), None, &marker)?;
                Ok(ScanState::Scanning(fallback))
            }
        }
    }

    /// Run the payload's commands in order.
    ///
    /// Every command name is checked against the registry first, so an
    /// unknown name leaves the placeholder untouched. Side-effect commands
    /// chain; the first command that edits the tree decides the
    /// continuation and ends the payload. A marker made only of
    /// side-effect commands is removed once all of them ran.
    fn dispatch(&mut self, node: NodeId, payload: &Payload, marker: &str) -> EngineResult<Dispatch> {
        let engine = self.engine;
        let commands: Vec<CommandInvocation> = payload
            .commands
            .iter()
            .map(|invocation| self.aliases.expand(invocation))
            .collect();
        let count = commands.len();

        if let Some(unknown) = commands.iter().find(|c| !engine.registry.contains(&c.name)) {
            match engine.services.config.unknown_command {
                UnknownCommandPolicy::Ignore => {
                    debug!(command = %unknown.name, "ignoring unknown command");
                    self.report.ignored += 1;
                    return Ok(Dispatch::Keep);
                }
                UnknownCommandPolicy::Fail => {
                    return Err(EngineError::UnknownCommand(unknown.name.clone()));
                }
            }
        }

        for (position, invocation) in commands.iter().enumerate() {
            let Some(handler) = engine.registry.get(&invocation.name) else {
                return Err(EngineError::UnknownCommand(invocation.name.clone()));
            };

            debug!(command = %invocation.name, node = node.index(), "dispatching");
            let result = handler.execute(&mut self.selection(node, invocation));
            match result {
                Ok(CommandResult::Consumed) => continue,
                Ok(CommandResult::Ignored) => {
                    self.report.ignored += 1;
                    return Ok(Dispatch::Keep);
                }
                Ok(CommandResult::Executed(continuation)) => {
                    self.report.executed += 1;
                    if position + 1 < count {
                        let skipped = EngineError::structure(format!(
                            "{} command(s) after {} were not run because it rewrote the placeholder",
                            count - position - 1,
                            invocation.name
                        ));
                        self.record(skipped, Some(invocation.name.as_str()), marker)?;
                    }
                    return Ok(Dispatch::Resume(continuation));
                }
                Err(e) => {
                    self.record(e, Some(invocation.name.as_str()), marker)?;
                    return Ok(Dispatch::Keep);
                }
            }
        }

        let Some(last) = commands.last() else {
            return Ok(Dispatch::Keep);
        };
        let removed = DeletePlaceholder.modify(&mut self.selection(node, last), ());
        match removed {
            Ok(ModifierResult::Success(continuation)) => {
                self.report.executed += 1;
                Ok(Dispatch::Resume(continuation))
            }
            Ok(ModifierResult::Ignored) => Ok(Dispatch::Keep),
            Err(e) => {
                self.record(e, Some(last.name.as_str()), marker)?;
                Ok(Dispatch::Keep)
            }
        }
    }

    fn selection<'s>(&'s mut self, node: NodeId, invocation: &'s CommandInvocation) -> Selection<'s> {
        Selection {
            doc: &mut *self.doc,
            node,
            invocation,
            model: &mut *self.model,
            toolkit: Some(self.toolkit),
            services: &self.engine.services,
            aliases: &mut self.aliases,
        }
    }

    /// Where to continue after the placeholder at `node` was handled.
    ///
    /// A continuation node the command detached afterwards falls back to
    /// the successor recorded before dispatch.
    fn resume(&self, node: NodeId, fallback: Option<NodeId>, dispatch: Dispatch) -> Option<NodeId> {
        let attached = |n: &NodeId| self.doc.is_attached(*n);
        let next = match dispatch {
            Dispatch::Keep | Dispatch::Resume(Continuation::Proceed) => {
                if self.doc.is_attached(node) {
                    self.doc.next_after(node)
                } else {
                    fallback.filter(attached)
                }
            }
            Dispatch::Resume(Continuation::At(target)) if attached(&target) => Some(target),
            Dispatch::Resume(Continuation::At(_)) => fallback.filter(attached),
            Dispatch::Resume(Continuation::End) => None,
        };
        if next.is_none() {
            trace!(node = node.index(), "no continuation, scan ends");
        }
        next
    }

    fn record(&mut self, error: EngineError, command: Option<&str>, marker: &str) -> EngineResult<()> {
        if self.engine.services.config.fail_fast {
            return Err(error);
        }
        let mut problem = Problem::new(error.kind(), error.to_string()).with_placeholder(marker);
        if let Some(command) = command {
            problem = problem.with_command(command);
        }
        warn!(kind = %problem.kind, placeholder = marker, "{}", problem.message);
        self.report.problems.push(problem);
        Ok(())
    }
}
