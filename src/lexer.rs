//! Splits template source into [`Token`]s.
//!
//! The lexer has two modes. Outside a tag everything up to the next `{{` or
//! `{%` is a single `Text` token, verbatim. Inside a tag whitespace is skipped
//! and the input is split into identifiers, keywords and closing markers;
//! anything else comes out as an `Illegal` token so the parser can report it.
//! Nesting is not tracked here.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Position;
use crate::token::{Kind, Token};

static IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern is valid"));

/// Pull-based cursor over the tokens of a template.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: Position,
    in_tag: bool,
}

/// Start lexing `input`.
pub fn lex(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

/// Lex all of `input`, including the trailing `Eof` token.
pub fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token();
        let done = tok.kind == Kind::Eof;
        out.push(tok);
        if done {
            return out;
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: Position::default(),
            in_tag: false,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    fn advance(&mut self, n: usize) {
        let start = self.pos.offset;
        self.pos = self.pos.advanced_over(&self.input[start..start + n]);
    }

    /// Emit a token of `len` bytes starting at the cursor.
    fn emit(&mut self, kind: Kind, len: usize) -> Token {
        let pos = self.pos;
        let tok = if kind.is_valueable() {
            Token::new(kind, &self.input[pos.offset..pos.offset + len], pos)
        } else {
            Token::symbol(kind, pos)
        };
        self.advance(len);
        tok
    }

    /// The next token. Once the input is exhausted this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        if self.in_tag {
            self.tag_token()
        } else {
            self.text_token()
        }
    }

    fn text_token(&mut self) -> Token {
        let rest = self.remaining();
        if rest.is_empty() {
            return Token::symbol(Kind::Eof, self.pos);
        }

        match next_tag(rest) {
            Some(0) => {
                self.in_tag = true;
                if rest.starts_with("{{") {
                    self.emit(Kind::LExpr, 2)
                } else {
                    self.emit(Kind::LStmt, 2)
                }
            }
            Some(idx) => self.emit(Kind::Text, idx),
            None => self.emit(Kind::Text, rest.len()),
        }
    }

    fn tag_token(&mut self) -> Token {
        let rest = self.remaining();
        let trimmed = rest.trim_start();
        self.advance(rest.len() - trimmed.len());

        let rest = self.remaining();
        if rest.is_empty() {
            return Token::symbol(Kind::Eof, self.pos);
        }

        if rest.starts_with("}}") {
            self.in_tag = false;
            return self.emit(Kind::RExpr, 2);
        }
        if rest.starts_with("%}") {
            self.in_tag = false;
            return self.emit(Kind::RStmt, 2);
        }

        if let Some(m) = IDENT.find(rest) {
            let word = m.as_str();
            return match Kind::keyword(word) {
                Some(kw) => self.emit(kw, word.len()),
                None => self.emit(Kind::Ident, word.len()),
            };
        }

        let len = illegal_run(rest);
        self.emit(Kind::Illegal, len)
    }
}

/// Byte offset of the first `{{` or `{%` in `rest`.
fn next_tag(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    rest.match_indices('{')
        .map(|(i, _)| i)
        .find(|&i| matches!(bytes.get(i + 1), Some(b'{' | b'%')))
}

/// Length of the run of characters at the start of `rest` that cannot begin
/// any other in-tag token. Always at least one character.
fn illegal_run(rest: &str) -> usize {
    for (i, c) in rest.char_indices().skip(1) {
        let tail = &rest[i..];
        if c.is_whitespace()
            || c.is_ascii_alphabetic()
            || c == '_'
            || tail.starts_with("}}")
            || tail.starts_with("%}")
        {
            return i;
        }
    }
    rest.len()
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        let tok = self.next_token();
        (tok.kind != Kind::Eof).then_some(tok)
    }
}
