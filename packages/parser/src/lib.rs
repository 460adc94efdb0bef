//! Placeholder language parser
//!
//! Turns the payload of a placeholder marker into [`CommandInvocation`]s and
//! writes invocations back as markers.

pub mod ast;
pub mod codec;
pub mod error;
pub mod lexer;
pub mod parser;

#[cfg(test)]
mod tests_parser;

pub use ast::{CommandInvocation, Payload};
pub use codec::{encode_command, Delimiters, MarkerMatch};
#[cfg(feature = "pretty-errors")]
pub use error::format_errors;
pub use error::{ParseError, ParseResult};
pub use lexer::Span;
pub use parser::{parse_command, parse_payload, Parser, SHORT_FORM_COMMAND};
