//! A small templating language for scaffolding files from components.
//!
//! Templates mix literal text with `{{ name }}` interpolations and
//! `{% if flag %} … {% else %} … {% endif %}` blocks. The pipeline is
//! [`lexer`] → [`parser`] → AST, which is then consumed independently by the
//! [`analyzer`] (what variables does the template need, and does a scope
//! provide them) and the [`renderer`].

pub mod analyzer;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod renderer;
pub mod scope;
pub mod token;
pub mod types;

pub use analyzer::{
    extract_type_map, type_map_from_str, typecheck, Traversal, TypeError, TypeMap, TypeMapError,
    Typechecked,
};
pub use error::{Error, ParseError, Position};
pub use parser::{parse, ParseOutput};
pub use renderer::{render, RenderError};
pub use scope::{Scope, Value};
pub use types::Type;

// ── Core API ───────────────────────────────────────────────────────

/// Run the whole pipeline: parse `input`, check `scope` against the variables
/// the template uses (filling defaults for missing ones) and render.
///
/// Fails on the first parse or type-map error, on any type errors (all of
/// them are returned together), or on an unresolved variable.
pub fn render_str(input: &str, scope: Scope) -> Result<String, Error> {
    let ast = parse(input).into_result()?;
    let (tm, tm_errors) = extract_type_map(&ast, Traversal::Nested);
    if let Some(err) = tm_errors.into_iter().next() {
        return Err(err.into());
    }
    let scope = typecheck(scope, &tm).into_result().map_err(Error::Type)?;
    Ok(render(&ast, &scope)?)
}
