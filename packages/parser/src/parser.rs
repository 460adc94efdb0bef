use crate::ast::{CommandInvocation, Payload};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{lex, Span, Token};
use serde_json::{Map, Number, Value};

/// Command name used for the `$path` / `@path` short forms
pub const SHORT_FORM_COMMAND: &str = "String";

/// Parse a placeholder payload (the text between the delimiters).
///
/// A payload holds one or more commands separated by `;`. A command is a
/// name followed by a lenient object body: `For $value:items, $as:"item"`.
/// `$path` and `@path` on their own are short for
/// `String $value:"path"` and `String @value:"path"`.
pub fn parse_payload(source: &str) -> ParseResult<Payload> {
    let mut commands = Vec::new();
    for (offset, segment) in split_commands(source) {
        let leading = segment.len() - segment.trim_start().len();
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        let command = parse_command(trimmed).map_err(|e| e.shifted(offset + leading))?;
        commands.push(command);
    }

    if commands.is_empty() {
        return Err(ParseError::unexpected_eof(source.len(), "command name"));
    }
    Ok(Payload { commands })
}

/// Parse exactly one command.
pub fn parse_command(source: &str) -> ParseResult<CommandInvocation> {
    let trimmed = source.trim();
    if let Some(short) = parse_short_form(trimmed)? {
        return Ok(short);
    }

    let mut parser = Parser::new(trimmed)?;
    parser.parse_command()
}

fn parse_short_form(source: &str) -> ParseResult<Option<CommandInvocation>> {
    let key = match source.chars().next() {
        Some('$') => "$value",
        Some('@') => "@value",
        _ => return Ok(None),
    };
    let path = source[1..].trim();
    if path.is_empty() {
        return Err(ParseError::invalid_syntax(
            Span::new(0, source.len()),
            "expected a path after the short form marker",
        ));
    }

    let mut invocation = CommandInvocation::new(SHORT_FORM_COMMAND).with_param(key, path);
    invocation.span = Some(Span::new(0, source.len()));
    Ok(Some(invocation))
}

/// Split at top-level `;`, ignoring separators inside quotes.
fn split_commands(source: &str) -> Vec<(usize, &str)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in source.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            ';' => {
                segments.push((start, &source[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push((start, &source[start..]));
    segments
}

/// Recursive-descent parser over the lexed parameter syntax
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Span)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for result in lex(source) {
            let token = result.map_err(|e| ParseError::LexError {
                span: e.span,
                message: e.message,
            })?;
            tokens.push((token.token, token.span));
        }
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    pub fn parse_command(&mut self) -> ParseResult<CommandInvocation> {
        let start = self.peek_span().start;
        let name = match self.peek() {
            Some((Token::Ident(name), _)) if !name.starts_with(['$', '@']) => name.to_string(),
            _ => {
                return Err(self.unexpected("command name"));
            }
        };
        self.advance();

        let params = self.parse_entries(None)?;
        if !self.is_at_end() {
            return Err(self.unexpected("',' or end of command"));
        }

        Ok(CommandInvocation {
            name,
            params,
            span: Some(Span::new(start, self.source.len())),
        })
    }

    /// Parse `key: value` entries until `closing` (or end of input when
    /// `closing` is `None`). Commas separate entries; a trailing comma is
    /// accepted.
    fn parse_entries(&mut self, closing: Option<Token<'src>>) -> ParseResult<Map<String, Value>> {
        let mut entries = Map::new();

        loop {
            if self.at_closing(&closing) {
                break;
            }

            let key = self.parse_key()?;
            self.expect(Token::Colon, "':'")?;
            let value = self.parse_value()?;
            entries.insert(key, value);

            if !self.match_token(Token::Comma) {
                if self.at_closing(&closing) {
                    break;
                }
                return Err(self.unexpected("','"));
            }
        }

        if let Some(token) = closing {
            self.expect(token, "closing '}'")?;
        }
        Ok(entries)
    }

    fn at_closing(&self, closing: &Option<Token<'src>>) -> bool {
        match closing {
            Some(token) => self.check(token),
            None => self.is_at_end(),
        }
    }

    fn parse_key(&mut self) -> ParseResult<String> {
        match self.peek().cloned() {
            Some((Token::Ident(name), _)) => {
                self.advance();
                Ok(name.to_string())
            }
            Some((Token::String(raw), span)) => {
                self.advance();
                decode_double_quoted(raw, span)
            }
            Some((Token::SingleQuoteString(raw), _)) => {
                self.advance();
                Ok(decode_single_quoted(raw))
            }
            // `true:`, `null:` and friends are valid keys in the lenient syntax.
            Some((Token::True, _)) => {
                self.advance();
                Ok("true".to_string())
            }
            Some((Token::False, _)) => {
                self.advance();
                Ok("false".to_string())
            }
            Some((Token::Null, _)) => {
                self.advance();
                Ok("null".to_string())
            }
            _ => Err(self.unexpected("parameter name")),
        }
    }

    fn parse_value(&mut self) -> ParseResult<Value> {
        let Some((token, span)) = self.peek().cloned() else {
            return Err(self.unexpected("value"));
        };

        match token {
            Token::True => {
                self.advance();
                Ok(Value::Bool(true))
            }
            Token::False => {
                self.advance();
                Ok(Value::Bool(false))
            }
            Token::Null => {
                self.advance();
                Ok(Value::Null)
            }
            Token::String(raw) => {
                self.advance();
                decode_double_quoted(raw, span).map(Value::String)
            }
            Token::SingleQuoteString(raw) => {
                self.advance();
                Ok(Value::String(decode_single_quoted(raw)))
            }
            // Unquoted words are strings.
            Token::Ident(word) => {
                self.advance();
                Ok(Value::String(word.to_string()))
            }
            Token::Number(raw) => {
                self.advance();
                parse_number(raw, span)
            }
            Token::LBrace => {
                self.advance();
                self.parse_entries(Some(Token::RBrace)).map(Value::Object)
            }
            Token::LBracket => {
                self.advance();
                self.parse_array()
            }
            _ => Err(self.unexpected("value")),
        }
    }

    fn parse_array(&mut self) -> ParseResult<Value> {
        let mut items = Vec::new();
        loop {
            if self.match_token(Token::RBracket) {
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            if !self.match_token(Token::Comma) {
                self.expect(Token::RBracket, "']'")?;
                return Ok(Value::Array(items));
            }
        }
    }

    fn peek(&self) -> Option<&(Token<'src>, Span)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&(Token<'src>, Span)> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: &Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(token)
        } else {
            false
        }
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> ParseResult<()> {
        if self.match_token(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn peek_span(&self) -> Span {
        self.tokens.get(self.pos).map(|(_, span)| *span).unwrap_or_else(|| {
            // At the end, point just past the last token
            let end = self.tokens.last().map(|(_, span)| span.end).unwrap_or(0);
            Span::new(end, end)
        })
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            None => ParseError::unexpected_eof(self.peek_span().end, expected),
            Some((_, span)) => ParseError::unexpected_token(
                *span,
                expected,
                format!("'{}'", &self.source[span.start..span.end]),
            ),
        }
    }
}

fn decode_double_quoted(raw: &str, span: Span) -> ParseResult<String> {
    serde_json::from_str::<String>(raw)
        .map_err(|e| ParseError::invalid_syntax(span, format!("invalid string literal: {}", e)))
}

fn decode_single_quoted(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_number(raw: &str, span: Span) -> ParseResult<Value> {
    if !raw.contains(['.', 'e', 'E']) {
        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Value::from(i));
        }
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ParseError::invalid_syntax(span, format!("invalid number '{}'", raw)))
}
