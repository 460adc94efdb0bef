use crate::error::{EngineError, EngineResult};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use docweave_model::{DataNode, Scalar};
use tracing::trace;

const CONCAT_SLOTS: [&str; 5] = ["a", "b", "c", "d", "e"];

/// `${Concat key:"all", $a:"first", @b:"more", type:"list"}`
///
/// Binds `key` to the values of `a` through `e`, skipping the ones that
/// do not resolve. `type:"list"` (the default) binds a list; `type:"string"`
/// binds the values' text joined together.
pub struct ConcatCommand;

impl CommandHandler for ConcatCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Concat"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let key = selection.require_str("key")?;
        let mut values = Vec::new();
        for slot in CONCAT_SLOTS {
            if let Some(value) = selection.resolve_value(slot)? {
                values.push(value);
            }
        }

        let parts = values.len();
        let bound = match selection.str_param("type").unwrap_or("list") {
            "list" => DataNode::List(values),
            "string" => {
                let mut text = String::new();
                for value in &values {
                    let DataNode::Leaf(scalar) = value else {
                        return Err(EngineError::invalid_value("Concat type:string takes scalar values only"));
                    };
                    text.push_str(&scalar.to_text());
                }
                DataNode::leaf(text)
            }
            other => {
                return Err(EngineError::invalid_value(format!(
                    "Concat type must be 'list' or 'string', not '{}'",
                    other
                )))
            }
        };

        trace!(key, parts, "concat");
        selection.model.scope_mut().push(key, bound)?;
        Ok(CommandResult::Consumed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl Operator {
    fn parse(symbol: &str) -> EngineResult<Self> {
        match symbol {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "%" => Ok(Operator::Remainder),
            other => Err(EngineError::invalid_value(format!("unknown Calc operator '{}'", other))),
        }
    }

    fn apply_int(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => a.checked_div(b),
            Operator::Remainder => a.checked_rem(b),
        }
    }

    fn apply_float(self, a: f64, b: f64) -> f64 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => a / b,
            Operator::Remainder => a % b,
        }
    }
}

/// `${Calc key:"total", $a:"price", b:3, operator:"*"}`
///
/// Binds `key` to `a <operator> b`. Two integers give an integer result;
/// a float on either side gives a float.
pub struct CalcCommand;

impl CommandHandler for CalcCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Calc"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let key = selection.require_str("key")?;
        let operator = Operator::parse(selection.str_param("operator").unwrap_or("+"))?;
        let a = number_operand(selection, "a")?;
        let b = number_operand(selection, "b")?;
        let result = calculate(operator, &a, &b)?;
        trace!(key, %result, "calc");
        selection.model.scope_mut().push(key, DataNode::Leaf(result))?;
        Ok(CommandResult::Consumed)
    }
}

fn number_operand(selection: &Selection<'_>, key: &str) -> EngineResult<Scalar> {
    match selection.resolve_value(key)? {
        Some(DataNode::Leaf(scalar @ (Scalar::Integer(_) | Scalar::Float(_)))) => Ok(scalar),
        Some(node) if !node.is_null() => Err(EngineError::invalid_value(format!(
            "Calc operand '{}' is not a number",
            key
        ))),
        _ => Err(EngineError::MissingValue(format!("Calc operand '{}'", key))),
    }
}

fn calculate(operator: Operator, a: &Scalar, b: &Scalar) -> EngineResult<Scalar> {
    if let (Scalar::Integer(a), Scalar::Integer(b)) = (a, b) {
        return operator
            .apply_int(*a, *b)
            .map(Scalar::Integer)
            .ok_or_else(|| EngineError::invalid_value(format!("cannot compute {} {:?} {}", a, operator, b)));
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => Ok(Scalar::Float(operator.apply_float(a, b))),
        _ => Err(EngineError::invalid_value("Calc operands must be numbers")),
    }
}
