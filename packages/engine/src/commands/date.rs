use super::{describe_value, handle_missing};
use crate::error::{EngineError, EngineResult};
use crate::modifiers::{Modifier, ReplaceWithText};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use docweave_model::{DataNode, Scalar};
use std::fmt::Write;

const DEFAULT_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_TIME_INPUT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_TIME_OUTPUT: &str = "%H:%M:%S";

/// `${Date @value:"order.date", inputFormat:"%d.%m.%Y", outputFormat:"%B %e, %Y"}`
///
/// Formats use strftime syntax. Without a value the current local date is
/// printed.
pub struct DateCommand;

impl CommandHandler for DateCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Date"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        print_moment(selection, DEFAULT_FORMAT, DEFAULT_FORMAT)
    }
}

/// `${Time @value:"order.placed", outputFormat:"%H:%M"}`
///
/// Like `Date`, but reads `%Y-%m-%d %H:%M:%S` and prints `%H:%M:%S`
/// unless told otherwise.
pub struct TimeCommand;

impl CommandHandler for TimeCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Time"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        print_moment(selection, DEFAULT_TIME_INPUT, DEFAULT_TIME_OUTPUT)
    }
}

fn print_moment(selection: &mut Selection<'_>, default_input: &str, default_output: &str) -> EngineResult<CommandResult> {
    let input_format = selection.str_param("inputFormat").unwrap_or(default_input);
    let output_format = selection.str_param("outputFormat").unwrap_or(default_output);

    let moment = match selection.value_source("value")? {
        None => Local::now().naive_local(),
        Some(source) => match selection.model.resolve_source(&source) {
            Some(DataNode::Leaf(Scalar::String(text))) => parse_moment(&text, input_format)?,
            Some(node) if !node.is_null() => {
                return Err(EngineError::invalid_value(format!(
                    "{} expects a string value",
                    selection.command()
                )));
            }
            _ => {
                let what = describe_value(selection, "value");
                return handle_missing(selection, &what);
            }
        },
    };

    let mut text = String::new();
    write!(text, "{}", moment.format(output_format))
        .map_err(|_| EngineError::invalid_value(format!("invalid outputFormat '{}'", output_format)))?;
    Ok(ReplaceWithText.modify(selection, text.as_str())?.into())
}

fn parse_moment(text: &str, format: &str) -> EngineResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, format)
        .or_else(|_| NaiveDate::parse_from_str(text, format).map(|date| date.and_time(NaiveTime::MIN)))
        .map_err(|e| EngineError::invalid_value(format!("cannot parse date '{}' with '{}': {}", text, format, e)))
}
