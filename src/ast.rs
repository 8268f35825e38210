//! Tree produced by the parser and consumed by the analyzer and renderer.
use crate::error::Position;

/// A variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    /// Where the name appears in the source.
    pub pos: Position,
}

/// An expression. Variable lookup is the only form the language has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(Ident),
}

/// `{% if condition %} body [{% else %} else_body] {% endif %}`.
///
/// An `else if` chain is an `else_body` holding a single nested `IfStmt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: Vec<Node>,
    pub else_body: Option<Vec<Node>>,
}

/// A statement-level piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal output.
    Text(String),
    /// `{{ expr }}`
    ExprBlock(Expr),
    IfStmt(IfStmt),
}

pub type Template = Vec<Node>;

impl Expr {
    pub fn ident(name: impl Into<String>, pos: Position) -> Self {
        Expr::Ident(Ident {
            name: name.into(),
            pos,
        })
    }
}
