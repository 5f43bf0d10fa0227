//! Parser for the tag-invocation grammar.
//!
//! The body of a template is a sequence of invocations:
//!
//! ```text
//! name{ literal ${slot} more literal }
//! ```
//!
//! The `{` must directly follow the tag name. Inside a block, literal
//! text runs until an unescaped `}` (which closes the block) or `${`
//! (which opens a slot); `\{`, `\}`, `\$` and `\\` escape those
//! characters. Slots carry one expression: a scalar literal, an object
//! literal, a dotted context path, or a nested invocation. Top-level
//! trivia (`//` and `/* */` comments, stray `;`) is skipped, so a
//! comment-wrapped metadata header that survives extraction still
//! parses.
//!
//! Any failure is fatal and carries the byte offset of the offending
//! position.

use crate::ast::{Block, Expr, Invocation, Segment};
use crate::error::TemplateError;
use compact_str::CompactString;

/// Parse a template body into its invocation list.
pub fn parse_body(input: &str) -> Result<Vec<Invocation>, TemplateError> {
    Parser::new(input).parse()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    // ------------------------------------------------------------------
    // Cursor primitives
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax(message, self.pos, self.input)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip whitespace, comments and stray semicolons between
    /// top-level invocations.
    fn skip_trivia(&mut self) -> Result<(), TemplateError> {
        loop {
            self.skip_ws();
            if self.rest().starts_with("//") {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if self.rest().starts_with("/*") {
                match self.rest().find("*/") {
                    Some(end) => self.pos += end + 2,
                    None => return Err(self.error("unterminated block comment")),
                }
            } else if self.peek() == Some(';') {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    // ------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------

    fn parse(&mut self) -> Result<Vec<Invocation>, TemplateError> {
        let mut tree = Vec::new();
        self.skip_trivia()?;
        while self.pos < self.input.len() {
            tree.push(self.parse_invocation()?);
            self.skip_trivia()?;
        }
        Ok(tree)
    }

    fn parse_invocation(&mut self) -> Result<Invocation, TemplateError> {
        let name = self.parse_ident()?;
        if self.peek() != Some('{') {
            return Err(self.error(format!(
                "expected `{{` immediately after tag name `{name}`"
            )));
        }
        let block = self.parse_block()?;
        Ok(Invocation { name, block })
    }

    /// Identifiers admit `-` after the first character, for hyphenated
    /// SVG element names such as `font-face-src`.
    fn parse_ident(&mut self) -> Result<CompactString, TemplateError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.bump(),
            _ => return Err(self.error("expected identifier")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.bump();
        }
        Ok(CompactString::from(&self.input[start..self.pos]))
    }

    fn parse_block(&mut self) -> Result<Block, TemplateError> {
        self.bump(); // consume `{`
        let inner_start = self.pos;
        let mut segments = Vec::new();
        let mut slots = Vec::new();
        let mut raw = String::new();
        let mut cooked = String::new();

        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated content block"));
            };
            match c {
                '}' => {
                    let inner_end = self.pos;
                    self.bump();
                    segments.push(Segment { raw, cooked });
                    return Ok(Block {
                        segments,
                        slots,
                        inner: inner_start..inner_end,
                    });
                }
                '\\' => {
                    self.bump();
                    let Some(esc) = self.peek() else {
                        return Err(self.error("dangling escape at end of block"));
                    };
                    self.bump();
                    raw.push('\\');
                    raw.push(esc);
                    cooked.push(match esc {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                '$' if self.rest().starts_with("${") => {
                    segments.push(Segment {
                        raw: std::mem::take(&mut raw),
                        cooked: std::mem::take(&mut cooked),
                    });
                    self.pos += 2;
                    let expr = self.parse_expr(true)?;
                    self.skip_ws();
                    if self.peek() != Some('}') {
                        return Err(self.error("expected `}` to close interpolation slot"));
                    }
                    self.bump();
                    slots.push(expr);
                }
                other => {
                    self.bump();
                    raw.push(other);
                    cooked.push(other);
                }
            }
        }
    }

    /// Parse one slot expression. `allow_call` is false in object value
    /// position, where a nested invocation has no meaningful emission
    /// point.
    fn parse_expr(&mut self, allow_call: bool) -> Result<Expr, TemplateError> {
        self.skip_ws();
        let Some(c) = self.peek() else {
            return Err(self.error("expected expression"));
        };
        match c {
            '"' | '\'' => Ok(Expr::Str(self.parse_string()?)),
            '{' => self.parse_object(),
            c if c.is_ascii_digit() || c == '-' => self.parse_number(),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let ident = self.parse_ident()?;
                match ident.as_str() {
                    "true" => return Ok(Expr::Bool(true)),
                    "false" => return Ok(Expr::Bool(false)),
                    _ => {}
                }
                if self.peek() == Some('{') {
                    if allow_call {
                        let block = self.parse_block()?;
                        return Ok(Expr::Call(Invocation { name: ident, block }));
                    }
                    return Err(self.error("tag invocations are not allowed in this position"));
                }
                let mut path = vec![ident];
                while self.peek() == Some('.') {
                    self.bump();
                    path.push(self.parse_ident()?);
                }
                Ok(Expr::Path(path))
            }
            _ => Err(self.error("expected expression")),
        }
    }

    fn parse_string(&mut self) -> Result<String, TemplateError> {
        let Some(quote) = self.peek() else {
            return Err(self.error("expected string literal"));
        };
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated string literal"));
            };
            self.bump();
            match c {
                c if c == quote => return Ok(out),
                '\\' => {
                    let Some(esc) = self.peek() else {
                        return Err(self.error("unterminated string literal"));
                    };
                    self.bump();
                    out.push(match esc {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                other => out.push(other),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Expr, TemplateError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(self.error("expected number"));
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            self.bump();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("expected digits after decimal point"));
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map(Expr::Number)
            .map_err(|_| self.error(format!("invalid number literal `{text}`")))
    }

    fn parse_object(&mut self) -> Result<Expr, TemplateError> {
        self.bump(); // consume `{`
        self.skip_ws();
        let mut fields = Vec::new();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Expr::Object(fields));
        }
        loop {
            self.skip_ws();
            let key = match self.peek() {
                Some('"' | '\'') => self.parse_string()?,
                _ => self.parse_ident()?.to_string(),
            };
            self.skip_ws();
            if self.peek() != Some(':') {
                return Err(self.error("expected `:` after object key"));
            }
            self.bump();
            fields.push((key, self.parse_expr(false)?));
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    self.skip_ws();
                    if self.peek() == Some('}') {
                        self.bump();
                        break;
                    }
                }
                Some('}') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("expected `,` or `}` in object literal")),
            }
        }
        Ok(Expr::Object(fields))
    }
}
