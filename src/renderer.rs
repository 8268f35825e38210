use thiserror::Error;
use tracing::debug;

use crate::ast::{Expr, Ident, IfStmt, Node};
use crate::error::Position;
use crate::scope::Scope;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("{name} not declared")]
    NotDeclared { name: String, pos: Position },
}

/// Evaluate `ast` against `scope`. Stops at the first unresolved variable.
pub fn render(ast: &[Node], scope: &Scope) -> Result<String, RenderError> {
    let mut out = String::new();
    render_into(ast, scope, &mut out)?;
    debug!(bytes = out.len(), "rendered template");
    Ok(out)
}

fn render_into(ast: &[Node], scope: &Scope, out: &mut String) -> Result<(), RenderError> {
    for node in ast {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::ExprBlock(expr) => out.push_str(&eval(expr, scope)?),
            Node::IfStmt(stmt) => render_if(stmt, scope, out)?,
        }
    }
    Ok(())
}

fn render_if(stmt: &IfStmt, scope: &Scope, out: &mut String) -> Result<(), RenderError> {
    let condition = eval(&stmt.condition, scope)?;
    // The body is taken for "", "false" and "0".
    if !is_falsy(&condition) {
        render_into(&stmt.body, scope, out)
    } else if let Some(else_body) = &stmt.else_body {
        render_into(else_body, scope, out)
    } else {
        Ok(())
    }
}

fn eval(expr: &Expr, scope: &Scope) -> Result<String, RenderError> {
    match expr {
        Expr::Ident(ident) => lookup(ident, scope),
    }
}

fn lookup(ident: &Ident, scope: &Scope) -> Result<String, RenderError> {
    scope
        .get(&ident.name)
        .map(|value| value.render())
        .ok_or_else(|| RenderError::NotDeclared {
            name: ident.name.clone(),
            pos: ident.pos,
        })
}

fn is_falsy(value: &str) -> bool {
    !matches!(value, "" | "false" | "0")
}
