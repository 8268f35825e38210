use std::fmt;

use thiserror::Error;

use crate::analyzer::{TypeError, TypeMapError};
use crate::renderer::RenderError;

/// A 0-based position in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 0-based line number
    pub line: usize,
    /// 0-based column (character offset within the line)
    pub column: usize,
    /// 0-based absolute byte offset from the start of input
    pub offset: usize,
}

impl Position {
    /// The position just past `text`, when `text` starts at `self`.
    pub fn advanced_over(self, text: &str) -> Self {
        let mut pos = self;
        for ch in text.chars() {
            if ch == '\n' {
                pos.line += 1;
                pos.column = 0;
            } else {
                pos.column += 1;
            }
        }
        pos.offset += text.len();
        pos
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What kind of structural violation a [`ParseError`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken,
    IllegalCharacter,
    UnterminatedIf,
    UnexpectedEof,
    StrayBranch,
    TooDeep,
}

impl ParseErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedToken => "template-unexpected-token",
            ParseErrorKind::IllegalCharacter => "template-illegal-character",
            ParseErrorKind::UnterminatedIf => "template-unterminated-if",
            ParseErrorKind::UnexpectedEof => "template-unexpected-eof",
            ParseErrorKind::StrayBranch => "template-stray-branch",
            ParseErrorKind::TooDeep => "template-too-deep",
        }
    }
}

/// A parse error with span information (begin..end).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}: {message} ({})", span(.begin, .end), .kind.code())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Start of the offending region
    pub begin: Position,
    /// End of the offending region (exclusive)
    pub end: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: String, begin: Position, end: Position) -> Self {
        ParseError {
            kind,
            message,
            begin,
            end,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// `line:col` for a point, `line:col-line:col` for a range.
fn span(begin: &Position, end: &Position) -> String {
    if begin == end {
        begin.to_string()
    } else {
        format!("{}-{}", begin, end)
    }
}

/// Any failure of the one-shot helpers ([`crate::render_str`],
/// [`crate::analyzer::type_map_from_str`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    TypeMap(#[from] TypeMapError),
    #[error("{}", join_type_errors(.0))]
    Type(Vec<TypeError>),
    #[error(transparent)]
    Render(#[from] RenderError),
}

fn join_type_errors(errors: &[TypeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
