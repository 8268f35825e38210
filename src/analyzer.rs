//! Static analysis of a template: which variables it reads and what type
//! each must have, and checking a [`Scope`] against that contract.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{Expr, Node};
use crate::error::Position;
use crate::parser::parse;
use crate::scope::Scope;
use crate::types::Type;

/// Variable name → required type.
pub type TypeMap = BTreeMap<String, Type>;

/// How far [`extract_type_map`] looks into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Only the top-level nodes. Variables used solely inside `if` bodies are
    /// not discovered.
    TopLevel,
    /// Every node, including `if` bodies and `else` branches.
    #[default]
    Nested,
}

/// The same variable used both as text and as a condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeMapError {
    #[error("Variable '{name}' used as {previous} and as {found} at {pos}")]
    Conflict {
        name: String,
        previous: Type,
        found: Type,
        pos: Position,
    },
}

/// A scope value that does not fit its inferred type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TypeError: Variable '{name}' expected type '{expected}'")]
pub struct TypeError {
    pub expected: Type,
    pub name: String,
    pub val: String,
}

/// Infer the type of every variable in `ast`.
///
/// A name recorded twice with different types yields a
/// [`TypeMapError::Conflict`]; the later usage is what ends up in the map.
pub fn extract_type_map(ast: &[Node], traversal: Traversal) -> (TypeMap, Vec<TypeMapError>) {
    let mut tm = TypeMap::new();
    let mut errors = Vec::new();
    collect(ast, traversal, &mut tm, &mut errors);
    debug!(
        variables = tm.len(),
        errors = errors.len(),
        "extracted type map"
    );
    (tm, errors)
}

fn collect(ast: &[Node], traversal: Traversal, tm: &mut TypeMap, errors: &mut Vec<TypeMapError>) {
    for node in ast {
        match node {
            Node::Text(_) => {}
            Node::ExprBlock(Expr::Ident(ident)) => {
                record(tm, &ident.name, Type::String, ident.pos, errors);
            }
            Node::IfStmt(stmt) => {
                let Expr::Ident(ident) = &stmt.condition;
                record(tm, &ident.name, Type::Boolean, ident.pos, errors);
                if traversal == Traversal::Nested {
                    collect(&stmt.body, traversal, tm, errors);
                    if let Some(else_body) = &stmt.else_body {
                        collect(else_body, traversal, tm, errors);
                    }
                }
            }
        }
    }
}

fn record(tm: &mut TypeMap, name: &str, typ: Type, pos: Position, errors: &mut Vec<TypeMapError>) {
    if let Some(previous) = tm.insert(name.to_string(), typ) {
        if previous != typ {
            errors.push(TypeMapError::Conflict {
                name: name.to_string(),
                previous,
                found: typ,
                pos,
            });
        }
    }
}

/// Parse `input` and extract its type map, failing on the first parse or
/// type-map error.
pub fn type_map_from_str(input: &str, traversal: Traversal) -> Result<TypeMap, crate::Error> {
    let ast = parse(input).into_result()?;
    let (tm, errors) = extract_type_map(&ast, traversal);
    match errors.into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(tm),
    }
}

/// A scope after [`typecheck`]: missing variables filled with defaults, plus
/// every value that failed its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Typechecked {
    pub scope: Scope,
    pub errors: Vec<TypeError>,
}

impl Typechecked {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The filled scope, or all type errors.
    pub fn into_result(self) -> Result<Scope, Vec<TypeError>> {
        if self.errors.is_empty() {
            Ok(self.scope)
        } else {
            Err(self.errors)
        }
    }
}

/// Check `scope` against `tm` and fill in defaults for absent variables.
///
/// Values already present are never replaced, so running this again on its
/// own output changes nothing.
pub fn typecheck(mut scope: Scope, tm: &TypeMap) -> Typechecked {
    let mut errors = Vec::new();
    for (name, &typ) in tm {
        if typ == Type::Any {
            continue;
        }

        match scope.get(name) {
            None => {
                if let Some(default) = typ.default_value() {
                    trace!(name = %name, typ = %typ, "filled default");
                    scope.insert(name.clone(), default);
                }
            }
            Some(value) => {
                let encoded = value.encode();
                if !typ.is_valid(&encoded) {
                    errors.push(TypeError {
                        expected: typ,
                        name: name.clone(),
                        val: encoded,
                    });
                }
            }
        }
    }
    debug!(errors = errors.len(), "typechecked scope");
    Typechecked { scope, errors }
}

