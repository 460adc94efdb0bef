use docweave_parser::Delimiters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with placeholders naming no registered command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownCommandPolicy {
    /// Leave the marker in the document as literal text
    #[default]
    Ignore,
    /// Abort the run
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub unknown_command: UnknownCommandPolicy,

    /// Abort on the first per-placeholder failure instead of recording it
    pub fail_fast: bool,

    /// Flush interval of the resource dimension cache
    pub cache_ttl_ms: u64,

    /// Upper bound on dispatched placeholders per run
    pub max_steps: usize,

    pub placeholder_prefix: String,
    pub placeholder_suffix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let delimiters = Delimiters::default();
        Self {
            unknown_command: UnknownCommandPolicy::Ignore,
            fail_fast: false,
            cache_ttl_ms: 1000,
            max_steps: 100_000,
            placeholder_prefix: delimiters.prefix,
            placeholder_suffix: delimiters.suffix,
        }
    }
}

impl EngineConfig {
    pub fn delimiters(&self) -> Delimiters {
        Delimiters::new(self.placeholder_prefix.clone(), self.placeholder_suffix.clone())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}
