use std::collections::VecDeque;

use tracing::debug;

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{lex, Lexer};
use crate::token::{Kind, Token};

/// The result of parsing: every well-formed construct, plus the errors for
/// the ones that were not. Check `errors` before trusting `ast` for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub ast: Template,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The AST, or the first error if there was any.
    pub fn into_result(self) -> Result<Template, ParseError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.ast),
        }
    }
}

/// How many `if` blocks may be open at once, `else if` links included.
pub const MAX_DEPTH: usize = 128;

/// Recursive-descent parser over a token stream.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    buffer: VecDeque<Token>,
    errors: Vec<ParseError>,
    depth: usize,
}

/// Parse template source.
pub fn parse(input: &str) -> ParseOutput {
    Parser::new(lex(input)).parse()
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Parser {
            lexer,
            buffer: VecDeque::new(),
            errors: Vec::new(),
            depth: 0,
        }
    }

    pub fn parse(mut self) -> ParseOutput {
        let mut ast = Vec::new();
        while self.peek_kind(0) != Kind::Eof {
            match self.parse_node() {
                Ok(node) => ast.push(node),
                Err(err) => self.fail(err),
            }
        }
        debug!(
            nodes = ast.len(),
            errors = self.errors.len(),
            "parsed template"
        );
        ParseOutput {
            ast,
            errors: self.errors,
        }
    }

    // ── Token cursor ────────────────────────────────────────────────

    fn peek(&mut self, n: usize) -> &Token {
        while self.buffer.len() <= n {
            let tok = self.lexer.next_token();
            self.buffer.push_back(tok);
        }
        &self.buffer[n]
    }

    fn peek_kind(&mut self, n: usize) -> Kind {
        self.peek(n).kind
    }

    fn consume(&mut self) -> Token {
        match self.buffer.pop_front() {
            Some(tok) => tok,
            None => self.lexer.next_token(),
        }
    }

    /// Consume the next token if it is `kind`; otherwise leave it in place
    /// and report it.
    fn expect(&mut self, kind: Kind) -> Result<Token, ParseError> {
        if self.peek_kind(0) == kind {
            return Ok(self.consume());
        }
        let found = self.peek(0).clone();
        Err(self.unexpected(&found, &kind.to_string()))
    }

    // ── Errors ──────────────────────────────────────────────────────

    fn unexpected(&self, found: &Token, expected: &str) -> ParseError {
        let kind = match found.kind {
            Kind::Eof => ParseErrorKind::UnexpectedEof,
            Kind::Illegal => ParseErrorKind::IllegalCharacter,
            _ => ParseErrorKind::UnexpectedToken,
        };
        ParseError::new(
            kind,
            format!("Expected {}, got {}", expected, found),
            found.pos,
            found.end(),
        )
    }

    /// Record `err` and skip past the closing marker of the broken tag.
    fn fail(&mut self, err: ParseError) {
        debug!(code = err.code(), "{}", err);
        self.errors.push(err);
        loop {
            let kind = self.peek_kind(0);
            if kind == Kind::Eof {
                return;
            }
            self.consume();
            if kind.is_closer() {
                return;
            }
        }
    }

    // ── Grammar ─────────────────────────────────────────────────────

    fn parse_node(&mut self) -> Result<Node, ParseError> {
        let tok = self.consume();
        match tok.kind {
            Kind::Text => Ok(Node::Text(tok.val)),
            Kind::LExpr => {
                let expr = self.parse_expr()?;
                self.expect(Kind::RExpr)?;
                Ok(Node::ExprBlock(expr))
            }
            Kind::LStmt => match self.peek_kind(0) {
                Kind::If => {
                    self.consume();
                    Ok(Node::IfStmt(self.parse_if(&tok)?))
                }
                Kind::Else | Kind::EndIf => {
                    let branch = self.peek(0).clone();
                    Err(ParseError::new(
                        ParseErrorKind::StrayBranch,
                        format!("Found {} without a matching 'if'", branch.kind),
                        tok.pos,
                        branch.end(),
                    ))
                }
                _ => {
                    let found = self.peek(0).clone();
                    Err(self.unexpected(&found, "'if'"))
                }
            },
            _ => Err(self.unexpected(&tok, "text or a tag")),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        if self.peek_kind(0) == Kind::Ident {
            let tok = self.consume();
            return Ok(Expr::ident(tok.val, tok.pos));
        }
        let found = self.peek(0).clone();
        Err(self.unexpected(&found, "identifier"))
    }

    /// Parse the rest of an if statement; `open` is the `{%` that started it
    /// and the `if` keyword has been consumed.
    fn parse_if(&mut self, open: &Token) -> Result<IfStmt, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new(
                ParseErrorKind::TooDeep,
                format!("'if' blocks nested deeper than {}", MAX_DEPTH),
                open.pos,
                open.end(),
            ));
        }
        self.depth += 1;
        let stmt = self.parse_if_rest(open);
        self.depth -= 1;
        stmt
    }

    fn parse_if_rest(&mut self, open: &Token) -> Result<IfStmt, ParseError> {
        let condition = self.parse_expr()?;
        self.expect(Kind::RStmt)?;
        let body = self.parse_body(open)?;

        // parse_body stops only in front of `{% else` or `{% endif`
        let branch_open = self.consume();
        let branch = self.consume();
        if branch.kind == Kind::EndIf {
            self.expect(Kind::RStmt)?;
            return Ok(IfStmt {
                condition,
                body,
                else_body: None,
            });
        }

        if self.peek_kind(0) == Kind::If {
            self.consume();
            let nested = self.parse_if(&branch_open)?;
            return Ok(IfStmt {
                condition,
                body,
                else_body: Some(vec![Node::IfStmt(nested)]),
            });
        }

        self.expect(Kind::RStmt)?;
        let else_body = self.parse_body(open)?;
        self.expect(Kind::LStmt)?;
        self.expect(Kind::EndIf)?;
        self.expect(Kind::RStmt)?;
        Ok(IfStmt {
            condition,
            body,
            else_body: Some(else_body),
        })
    }

    /// Parse nodes up to the `{% else` or `{% endif` closing the block opened
    /// at `open`. A broken node inside the block is recorded and skipped.
    fn parse_body(&mut self, open: &Token) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            match (self.peek_kind(0), self.peek_kind(1)) {
                (Kind::LStmt, Kind::Else | Kind::EndIf) => return Ok(nodes),
                (Kind::Eof, _) => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedIf,
                        "Unterminated 'if' block: missing '{% endif %}'".to_string(),
                        open.pos,
                        open.end(),
                    ))
                }
                _ => match self.parse_node() {
                    Ok(node) => nodes.push(node),
                    Err(err) => self.fail(err),
                },
            }
        }
    }
}
