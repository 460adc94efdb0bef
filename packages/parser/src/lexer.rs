//! Lexer for placeholder parameter lists using logos

use logos::Logos;

/// Token types of the lenient parameter syntax
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'src> {
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Bare keys, command names and unquoted string values. Keys may carry
    // a `$` (variable) or `@` (data path) marker.
    #[regex(r"[$@]?[A-Za-z_][A-Za-z0-9_\-]*", |lex| lex.slice())]
    Ident(&'src str),

    // Quotes are kept; the parser decodes escapes.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    SingleQuoteString(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
}

/// Byte span inside the placeholder payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn shift(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Lex source into tokens with spans
pub fn lex(source: &str) -> impl Iterator<Item = Result<SpannedToken<'_>, LexError>> + '_ {
    Token::lexer(source).spanned().map(|(result, span)| {
        let span = Span::new(span.start, span.end);
        match result {
            Ok(token) => Ok(SpannedToken { token, span }),
            Err(_) => Err(LexError {
                span,
                message: "Unexpected character".to_string(),
            }),
        }
    })
}
