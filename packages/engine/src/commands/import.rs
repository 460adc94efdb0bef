use crate::error::{EngineError, EngineResult};
use crate::modifiers::{Continuation, ModifierResult};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::{DataNode, Scalar};
use regex::Regex;
use tracing::debug;

/// `${Import resource:"handle"}` or `${Import $value:"fragment"}`
///
/// Merges another document in front of the placeholder's block and
/// removes the placeholder. Scanning resumes at the first merged node, so
/// placeholders inside the fragment run against the host's data and
/// bindings.
///
/// `beginFragment` and `endFragment` are patterns; only the blocks between
/// the block matching the first and the block matching the second are
/// merged, both excluded. Resource text is cached per resource unless
/// `cache:false` is given.
pub struct ImportCommand;

impl CommandHandler for ImportCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Import"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let mut filter = FragmentFilter::new(
            pattern_param(selection, "beginFragment")?,
            pattern_param(selection, "endFragment")?,
        );
        let text = match selection.str_param("resource") {
            Some(handle) => fetch_resource(selection, handle)?,
            None => match selection.resolve_value("value")? {
                Some(DataNode::Leaf(Scalar::String(text))) => text,
                Some(_) => return Err(EngineError::invalid_value("Import expects document text")),
                None => return Err(EngineError::MissingValue("Import value".to_string())),
            },
        };

        let toolkit = selection.toolkit()?;
        let fragment = toolkit.parse_fragment(&text)?;
        let doc = &mut *selection.doc;
        let anchor = toolkit.block_of(doc, selection.node);

        let mut first = None;
        let mut imported = 0usize;
        for &child in fragment.children(fragment.root()) {
            if !filter.keep(&fragment.text_content(child)) {
                continue;
            }
            let copy = doc.import_subtree(&fragment, child)?;
            doc.insert_before(anchor, copy)?;
            first.get_or_insert(copy);
            imported += 1;
        }
        debug!(blocks = imported, "imported fragment");

        let target = toolkit.removal_root(doc, selection.node);
        let after = ModifierResult::success_at(doc, Some(target), true);
        toolkit.delete_placeholder(doc, selection.node)?;

        Ok(match first {
            Some(node) => CommandResult::Executed(Continuation::At(node)),
            None => after.into(),
        })
    }
}

fn fetch_resource(selection: &Selection<'_>, handle: &str) -> EngineResult<String> {
    let services = selection.services;
    if selection.invocation.bool_param("cache") == Some(false) {
        return services.resources.fetch_text(handle);
    }
    let id = services.resources.identify(handle)?;
    services
        .fragments
        .get_or_try_cache(id, || services.resources.fetch_text(handle))
}

fn pattern_param(selection: &Selection<'_>, key: &str) -> EngineResult<Option<Regex>> {
    selection
        .str_param(key)
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| EngineError::invalid_value(format!("invalid {} pattern: {}", key, e)))
        })
        .transpose()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FragmentState {
    WaitBegin,
    Copying,
    Done,
}

/// Picks the blocks of an imported document between two marker blocks
struct FragmentFilter {
    begin: Option<Regex>,
    end: Option<Regex>,
    state: FragmentState,
}

impl FragmentFilter {
    fn new(begin: Option<Regex>, end: Option<Regex>) -> Self {
        let state = if begin.is_some() {
            FragmentState::WaitBegin
        } else {
            FragmentState::Copying
        };
        Self { begin, end, state }
    }

    fn keep(&mut self, block_text: &str) -> bool {
        match self.state {
            FragmentState::WaitBegin => {
                if self.begin.as_ref().is_some_and(|begin| begin.is_match(block_text)) {
                    self.state = FragmentState::Copying;
                }
                false
            }
            FragmentState::Copying => {
                if self.end.as_ref().is_some_and(|end| end.is_match(block_text)) {
                    self.state = FragmentState::Done;
                    return false;
                }
                true
            }
            FragmentState::Done => false,
        }
    }
}
