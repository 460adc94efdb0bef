use crate::error::{EngineError, EngineResult};
use crate::modifiers::{AreaPayload, CloneArea, CloneAreaPayload, Modifier};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::{DataNode, DataPath, ValueSource, VariableScope};
use docweave_parser::{CommandInvocation, Payload};
use tracing::debug;

const DEFAULT_ITEM: &str = "item";
const DEFAULT_INDEX: &str = "index";

/// `${For value|$value|@value:<list>, $as:"item", index:"index"} ... ${EndFor}`
///
/// The body is cloned once per element. Each clone opens with a marker
/// binding the element and its index and closes with one releasing them,
/// so the body's own placeholders resolve against that element when the
/// scanner reaches them.
///
/// Iterating a data path without `$as` moves the data cursor onto each
/// element instead of binding a variable, and restores it afterwards.
pub struct ForCommand;

/// How one iteration refers to its element
enum Binding {
    Variable { name: String, source: ValueSource },
    Cursor { list: DataPath, restore: DataPath },
}

impl CommandHandler for ForCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["For"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let source = selection
            .value_source("value")?
            .ok_or_else(|| EngineError::structure("For requires a 'value' parameter"))?;
        let index_name = selection.str_param("index").unwrap_or(DEFAULT_INDEX).to_string();
        VariableScope::validate_name(&index_name)?;
        let alias = selection.str_param("$as").or_else(|| selection.str_param("as"));

        let copies = match selection.model.resolve_source(&source) {
            Some(DataNode::List(items)) => items.len(),
            None => 0,
            Some(node) if node.is_null() => 0,
            Some(_) => {
                return Err(EngineError::invalid_value("For expects a list"));
            }
        };

        let binding = match (&source, alias) {
            (ValueSource::Model(path), None) => {
                let restore = selection.model.cursor().clone();
                Binding::Cursor {
                    list: restore.join(path).normalize()?,
                    restore,
                }
            }
            (_, alias) => {
                let name = alias.unwrap_or(DEFAULT_ITEM).to_string();
                VariableScope::validate_name(&name)?;
                Binding::Variable {
                    name,
                    source: source.clone(),
                }
            }
        };

        let end = selection.find_area_end(&["For"], "EndFor")?;
        debug!(copies, index = %index_name, "expanding loop");

        let markers = |i: usize| iteration_markers(&binding, &index_name, i);
        let payload = AreaPayload {
            begin: selection.node,
            end,
            inner: CloneAreaPayload {
                copies,
                markers: &markers,
            },
        };
        Ok(CloneArea.modify(selection, payload)?.into())
    }
}

/// Opening and closing marker payloads of iteration `i`
fn iteration_markers(binding: &Binding, index_name: &str, i: usize) -> (Payload, Payload) {
    let push_index = CommandInvocation::new("Push")
        .with_param("key", index_name)
        .with_param("value", i);
    let pop_index = CommandInvocation::new("Pop").with_param("key", index_name);

    match binding {
        Binding::Variable { name, source } => {
            let push_item = CommandInvocation::new("Push").with_param("key", name.as_str());
            let push_item = match source {
                ValueSource::Literal(list) => {
                    let element = list.at(i).map(DataNode::to_json).unwrap_or_default();
                    push_item.with_param("value", element)
                }
                ValueSource::Variable(path) => push_item.with_param("$value", format!("{}[{}]", path, i)),
                ValueSource::Model(path) => push_item.with_param("@value", format!("{}[{}]", path, i)),
            };
            let pop_item = CommandInvocation::new("Pop").with_param("key", name.as_str());
            (
                Payload {
                    commands: vec![push_item, push_index],
                },
                Payload {
                    commands: vec![pop_index, pop_item],
                },
            )
        }
        Binding::Cursor { list, restore } => {
            let enter = CommandInvocation::new("Model").with_param("value", format!("^{}[{}]", list, i));
            let leave = CommandInvocation::new("Model").with_param("value", format!("^{}", restore));
            (
                Payload {
                    commands: vec![enter, push_index],
                },
                Payload {
                    commands: vec![pop_index, leave],
                },
            )
        }
    }
}
