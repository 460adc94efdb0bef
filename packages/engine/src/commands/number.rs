use super::{describe_value, handle_missing};
use crate::error::{EngineError, EngineResult};
use crate::modifiers::{Modifier, ReplaceWithText};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::{DataNode, Scalar};
use serde_json::Value;

const DEFAULT_FORMAT: &str = "#,###.##";

/// `${Number @value:"total", format:"#,##0.00", lang:"de", prefix:"€ "}`
///
/// Formats a numeric value with a decimal pattern. `multiplier` and
/// `summand` adjust the value first; `intFormat` replaces `format` when the
/// adjusted value is an integer. A value that is not a number is treated
/// as missing.
pub struct NumberCommand;

impl CommandHandler for NumberCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Number"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let value = match selection.resolve_value("value")? {
            Some(DataNode::Leaf(scalar @ (Scalar::Integer(_) | Scalar::Float(_)))) => scalar,
            _ => {
                let what = describe_value(selection, "value");
                return handle_missing(selection, &what);
            }
        };

        let value = adjust(value, number_param(selection, "multiplier")?, |a, b| a.checked_mul(b), |a, b| a * b)?;
        let value = adjust(value, number_param(selection, "summand")?, |a, b| a.checked_add(b), |a, b| a + b)?;

        let pattern = match (&value, selection.str_param("intFormat")) {
            (Scalar::Integer(_), Some(int_format)) => int_format,
            _ => selection.str_param("format").unwrap_or(DEFAULT_FORMAT),
        };
        let symbols = Symbols::for_lang(selection.str_param("lang"));
        let number = NumberFormat::parse(pattern)?.format(value.as_f64().unwrap_or_default(), symbols);

        let text = format!(
            "{}{}{}",
            selection.str_param("prefix").unwrap_or_default(),
            number,
            selection.str_param("suffix").unwrap_or_default()
        );
        Ok(ReplaceWithText.modify(selection, text.as_str())?.into())
    }
}

fn number_param(selection: &Selection<'_>, key: &str) -> EngineResult<Option<Scalar>> {
    match selection.invocation.param(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(match n.as_i64() {
            Some(i) => Scalar::Integer(i),
            None => Scalar::Float(n.as_f64().unwrap_or_default()),
        })),
        Some(_) => Err(EngineError::invalid_value(format!("'{}' must be a number", key))),
    }
}

/// Combine `value` with `operand`, staying integral while both sides are.
fn adjust(
    value: Scalar,
    operand: Option<Scalar>,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> EngineResult<Scalar> {
    let Some(operand) = operand else {
        return Ok(value);
    };
    if let (Scalar::Integer(a), Scalar::Integer(b)) = (&value, &operand) {
        return int_op(*a, *b)
            .map(Scalar::Integer)
            .ok_or_else(|| EngineError::invalid_value("number out of range"));
    }
    match (value.as_f64(), operand.as_f64()) {
        (Some(a), Some(b)) => Ok(Scalar::Float(float_op(a, b))),
        _ => Ok(value),
    }
}

/// Separators of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Symbols {
    grouping: char,
    decimal: char,
}

impl Symbols {
    fn for_lang(lang: Option<&str>) -> Self {
        let language = lang
            .and_then(|tag| tag.split(['-', '_']).next())
            .unwrap_or("en")
            .to_ascii_lowercase();
        let (grouping, decimal) = match language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr" => ('.', ','),
            "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "uk" => ('\u{a0}', ','),
            _ => (',', '.'),
        };
        Self { grouping, decimal }
    }
}

/// Decimal pattern: `#` is an optional digit, `0` a required one, `,`
/// marks the grouping size and `.` the decimal point. Other characters
/// before or after the digits are copied literally.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NumberFormat {
    prefix: String,
    suffix: String,
    min_integer: usize,
    grouping: usize,
    min_fraction: usize,
    max_fraction: usize,
}

impl NumberFormat {
    fn parse(pattern: &str) -> EngineResult<Self> {
        let is_digit_char = |c: char| matches!(c, '#' | '0' | ',' | '.');
        let start = pattern.find(is_digit_char);
        let end = pattern.rfind(is_digit_char);
        let (Some(start), Some(end)) = (start, end) else {
            return Err(EngineError::invalid_value(format!("number format '{}' has no digits", pattern)));
        };

        let body = &pattern[start..=end];
        let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));
        if fraction.contains(['.', ',']) {
            return Err(EngineError::invalid_value(format!("malformed number format '{}'", pattern)));
        }

        Ok(Self {
            prefix: pattern[..start].to_string(),
            suffix: pattern[end + 1..].to_string(),
            min_integer: integer.chars().filter(|&c| c == '0').count().max(1),
            grouping: integer.rfind(',').map_or(0, |comma| integer.len() - comma - 1),
            min_fraction: fraction.chars().filter(|&c| c == '0').count(),
            max_fraction: fraction.len(),
        })
    }

    fn format(&self, value: f64, symbols: Symbols) -> String {
        let rounded = format!("{:.*}", self.max_fraction, value.abs());
        let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

        let mut fraction = fraction.to_string();
        while fraction.len() > self.min_fraction && fraction.ends_with('0') {
            fraction.pop();
        }

        let mut digits = integer.to_string();
        while digits.len() < self.min_integer {
            digits.insert(0, '0');
        }

        let mut grouped = String::new();
        for (i, digit) in digits.chars().enumerate() {
            let remaining = digits.len() - i;
            if i > 0 && self.grouping > 0 && remaining % self.grouping == 0 {
                grouped.push(symbols.grouping);
            }
            grouped.push(digit);
        }

        let negative = value < 0.0 && (digits.chars().any(|c| c != '0') || !fraction.trim_end_matches('0').is_empty());
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&grouped);
        if !fraction.is_empty() {
            out.push(symbols.decimal);
            out.push_str(&fraction);
        }
        out.push_str(&self.suffix);
        out
    }
}
