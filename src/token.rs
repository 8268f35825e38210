//! The vocabulary shared by the lexer and the parser.

use std::fmt;

use crate::error::Position;

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// End of input. Requested again, it is returned again.
    Eof,
    /// Literal output text.
    Text,
    /// A variable name inside a tag.
    Ident,
    /// Characters inside a tag that belong to no other kind.
    Illegal,
    /// `{{`
    LExpr,
    /// `}}`
    RExpr,
    /// `{%`
    LStmt,
    /// `%}`
    RStmt,
    If,
    Else,
    EndIf,
}

impl Kind {
    /// The canonical spelling of a fixed-symbol kind, `None` for kinds whose
    /// text comes from the source.
    pub const fn symbol(self) -> Option<&'static str> {
        match self {
            Kind::LExpr => Some("{{"),
            Kind::RExpr => Some("}}"),
            Kind::LStmt => Some("{%"),
            Kind::RStmt => Some("%}"),
            Kind::If => Some("if"),
            Kind::Else => Some("else"),
            Kind::EndIf => Some("endif"),
            Kind::Eof | Kind::Text | Kind::Ident | Kind::Illegal => None,
        }
    }

    /// Whether tokens of this kind carry their own value.
    pub const fn is_valueable(self) -> bool {
        matches!(self, Kind::Text | Kind::Ident | Kind::Illegal)
    }

    /// Whether this kind closes a tag.
    pub const fn is_closer(self) -> bool {
        matches!(self, Kind::RExpr | Kind::RStmt)
    }

    /// The keyword spelled `word`, if it is one.
    pub fn keyword(word: &str) -> Option<Kind> {
        match word {
            "if" => Some(Kind::If),
            "else" => Some(Kind::Else),
            "endif" => Some(Kind::EndIf),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(sym) => write!(f, "'{}'", sym),
            None => match self {
                Kind::Eof => f.write_str("end of input"),
                Kind::Text => f.write_str("text"),
                Kind::Ident => f.write_str("identifier"),
                _ => f.write_str("illegal character"),
            },
        }
    }
}

/// A lexed token. Fixed-symbol kinds hold their canonical spelling in `val`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,
    pub val: String,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: Kind, val: impl Into<String>, pos: Position) -> Self {
        Token {
            kind,
            val: val.into(),
            pos,
        }
    }

    /// A token whose text is derived from its kind.
    pub fn symbol(kind: Kind, pos: Position) -> Self {
        Token {
            kind,
            val: kind.symbol().unwrap_or_default().to_string(),
            pos,
        }
    }

    /// Position just past this token's text.
    pub fn end(&self) -> Position {
        self.pos.advanced_over(&self.val)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Ident => write!(f, "identifier '{}'", self.val),
            Kind::Illegal => write!(f, "illegal character '{}'", self.val),
            Kind::Text => write!(f, "text {:?}", self.val),
            _ => self.kind.fmt(f),
        }
    }
}
