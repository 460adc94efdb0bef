//! Error types for the placeholder parser

use crate::lexer::Span;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location and context
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected token at {span:?}: expected {expected}, found {found}")]
    UnexpectedToken {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of placeholder: expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("Invalid syntax at {span:?}: {message}")]
    InvalidSyntax { span: Span, message: String },

    #[error("Lexer error at {span:?}: {message}")]
    LexError { span: Span, message: String },
}

impl ParseError {
    pub fn unexpected_token(span: Span, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(span: Span, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { pos, .. } => Span::new(*pos, *pos),
            ParseError::InvalidSyntax { span, .. } => *span,
            ParseError::LexError { span, .. } => *span,
        }
    }

    /// Move the error's location by `offset` bytes.
    pub fn shifted(self, offset: usize) -> Self {
        match self {
            ParseError::UnexpectedToken { span, expected, found } => ParseError::UnexpectedToken {
                span: span.shift(offset),
                expected,
                found,
            },
            ParseError::UnexpectedEof { pos, expected } => ParseError::UnexpectedEof {
                pos: pos + offset,
                expected,
            },
            ParseError::InvalidSyntax { span, message } => ParseError::InvalidSyntax {
                span: span.shift(offset),
                message,
            },
            ParseError::LexError { span, message } => ParseError::LexError {
                span: span.shift(offset),
                message,
            },
        }
    }
}

/// Pretty-print errors with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_errors(source: &str, filename: &str, errors: &[ParseError]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for error in errors {
        let mut span = error.span();
        if span.start >= span.end {
            span = Span::new(
                span.start.min(source.len().saturating_sub(1)),
                (span.start + 1).min(source.len()),
            );
        }

        let report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(error.to_string())
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_color(Color::Red)
                    .with_message(match error {
                        ParseError::UnexpectedToken { expected, .. } => {
                            format!("expected {}", expected)
                        }
                        ParseError::UnexpectedEof { expected, .. } => {
                            format!("expected {}", expected)
                        }
                        ParseError::InvalidSyntax { message, .. } => message.clone(),
                        ParseError::LexError { message, .. } => message.clone(),
                    }),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            output.extend_from_slice(error.to_string().as_bytes());
            output.push(b'\n');
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}
