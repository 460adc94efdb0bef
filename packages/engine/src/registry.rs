use crate::commands;
use crate::error::EngineResult;
use crate::modifiers::{Continuation, ModifierResult};
use crate::selection::Selection;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Outcome of one command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// The command did not apply; the placeholder stays as literal text
    Ignored,
    /// The command changed the tree and says where to resume
    Executed(Continuation),
    /// Side effect only (scope or cursor change); the dispatcher removes
    /// the placeholder once every command of its payload has run
    Consumed,
}

impl From<ModifierResult> for CommandResult {
    fn from(result: ModifierResult) -> Self {
        match result {
            ModifierResult::Ignored => CommandResult::Ignored,
            ModifierResult::Success(continuation) => CommandResult::Executed(continuation),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    /// Command names this handler answers to
    fn keys(&self) -> &'static [&'static str];

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult>;
}

/// Command name to handler mapping.
///
/// [`CommandRegistry::builtin`] is the shared, read-only registry of the
/// built-in commands. Hosts that add commands start from
/// [`CommandRegistry::with_builtins`] and hand the result to the engine.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

static BUILTIN: OnceLock<Arc<CommandRegistry>> = OnceLock::new();

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register(commands::StringCommand)
            .register(commands::IfCommand)
            .register(commands::ForCommand)
            .register(commands::ClosingMarker)
            .register(commands::PushCommand)
            .register(commands::PopCommand)
            .register(commands::ModelCommand)
            .register(commands::ImportCommand)
            .register(commands::ImageCommand)
            .register(commands::JoinCommand)
            .register(commands::DateCommand)
            .register(commands::TimeCommand)
            .register(commands::NumberCommand)
            .register(commands::CounterCommand)
            .register(commands::ConcatCommand)
            .register(commands::CalcCommand)
            .register(commands::IgnoreCommand)
            .register(commands::AliasCommand)
            .register(commands::CloneCommand);
        registry
    }

    pub fn builtin() -> Arc<CommandRegistry> {
        Arc::clone(BUILTIN.get_or_init(|| Arc::new(Self::with_builtins())))
    }

    /// Register `handler` under each of its keys, replacing earlier
    /// handlers with the same name.
    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) -> &mut Self {
        let handler: Arc<dyn CommandHandler> = Arc::new(handler);
        for key in handler.keys() {
            self.handlers.insert(key.to_string(), Arc::clone(&handler));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}
