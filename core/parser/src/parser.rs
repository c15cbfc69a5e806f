//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Precedence-climbing parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It pulls tokens
//! from the Lexer one at a time and builds an Expr tree. Precedence,
//! associativity, fixity and arity all come from the Registry, so the grammar
//! below is parameterized rather than fixed:
//!
//! GRAMMAR:
//!   expression(min) --> primary ( BINARY[prec >= min] expression(next(prec)) )*
//!   primary         --> ( NUMBER
//!                       | "(" expression(0) ")"
//!                       | PREFIX expression(prec(PREFIX))
//!                       | function_call ) POSTFIX*
//!   function_call   --> FUNCTION "(" ( expression(0) ( "," expression(0) )* )? ")"
//!
//!   next(prec) = prec + 1 for left-associative operators, prec for right-associative.
//!
//! LIMITS: `max_depth` bounds both the nesting of recursive calls and the
//! height of the finished tree, so long operator chains (1+1+...+1, 0!!!...)
//! fail with NestingTooDeep instead of producing a tree too tall to walk.

use crate::ast::Expr;
use crate::error::{ParseError, ParseResult};
use crate::lexer::Lexer;
use crate::registry::Registry;
use crate::token::{Span, SpannedToken, Token};
use serde::{Deserialize, Serialize};

/// Default bound on nesting depth and tree height.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables for a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Maximum number of nested sub-expressions (parentheses, prefix operands,
    /// right-hand sides, function arguments), and maximum height of the tree.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A sub-tree and its height; a lone number has height 1.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Node { expr, height: 1 }
    }
}

/// The Parser struct holds the lexer and current token state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    registry: &'a Registry,
    current: SpannedToken,
    options: ParserOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from an input string.
    /// Automatically advances to the first token.
    pub fn new(input: &'a str, registry: &'a Registry) -> ParseResult<Self> {
        Self::with_options(input, registry, ParserOptions::default())
    }

    pub fn with_options(
        input: &'a str,
        registry: &'a Registry,
        options: ParserOptions,
    ) -> ParseResult<Self> {
        let mut lexer = Lexer::new(input, registry);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            registry,
            current,
            options,
            depth: 0,
        })
    }

    /// Parses the entire input and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expr> {
        let node = self.parse_expression(0)?;

        // Ensure we consumed all tokens
        if self.current.token != Token::Eof {
            let span = self.current.span;
            return Err(ParseError::UnexpectedTrailingInput {
                found: describe(&self.current.token),
                span,
                snippet: self.lexer.snippet(span),
            });
        }

        log::trace!("parsed {:?} as {}", self.lexer.input(), node.expr);
        Ok(node.expr)
    }

    /// Advances to the next token.
    fn advance(&mut self) -> ParseResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn too_deep(&self, span: Span) -> ParseError {
        ParseError::NestingTooDeep {
            limit: self.options.max_depth,
            span,
            snippet: self.lexer.snippet(span),
        }
    }

    /// Wraps `expr` as a node of the given height. Operator chains grow the
    /// tree without nesting calls, so height is bounded separately.
    fn node(&self, expr: Expr, height: usize, span: Span) -> ParseResult<Node> {
        if height > self.options.max_depth {
            return Err(self.too_deep(span));
        }
        Ok(Node { expr, height })
    }

    /// Parses operands joined by binary operators binding at least as tightly
    /// as `min_precedence`.
    fn parse_expression(&mut self, min_precedence: i32) -> ParseResult<Node> {
        if self.depth >= self.options.max_depth {
            return Err(self.too_deep(self.current.span));
        }

        self.depth += 1;
        let result = self.parse_binary(min_precedence);
        self.depth -= 1;
        result
    }

    fn parse_binary(&mut self, min_precedence: i32) -> ParseResult<Node> {
        let registry = self.registry;
        let mut left = self.parse_primary()?;

        loop {
            let Token::Operator(identifier) = &self.current.token else {
                break;
            };
            let Some(operator) = registry.find_binary_operator(identifier) else {
                break;
            };
            if operator.precedence() < min_precedence {
                break;
            }

            let op = identifier.clone();
            let op_span = self.current.span;
            self.advance()?;
            let right = self.parse_expression(operator.next_min_precedence())?;
            let height = 1 + left.height.max(right.height);
            left = self.node(Expr::binary(left.expr, op, right.expr), height, op_span)?;
        }

        Ok(left)
    }

    /// Parses primary expressions (numbers, parentheses, prefix operations,
    /// function calls) followed by any postfix operators.
    fn parse_primary(&mut self) -> ParseResult<Node> {
        let registry = self.registry;

        let node = match self.current.token.clone() {
            Token::Number(n) => {
                self.advance()?;
                Node::leaf(Expr::Number(n))
            }

            // Parenthesized expression
            Token::LParen => {
                let open = self.current.span;
                self.advance()?;
                let inner = self.parse_expression(0)?;
                self.expect_closing(open)?;
                inner
            }

            Token::Operator(identifier) => {
                let Some(operator) = registry.find_prefix_operator(&identifier) else {
                    return Err(self.unexpected("an operand"));
                };
                let op_span = self.current.span;
                self.advance()?;
                let operand = self.parse_expression(operator.precedence())?;
                self.node(
                    Expr::prefix(identifier, operand.expr),
                    operand.height + 1,
                    op_span,
                )?
            }

            Token::Function(name) => self.parse_function_call(name)?,

            _ => return Err(self.unexpected("an operand")),
        };

        self.parse_postfix(node)
    }

    /// Wraps `node` in every postfix operator that follows it (e.g. `5!!`).
    fn parse_postfix(&mut self, mut node: Node) -> ParseResult<Node> {
        while let Token::Operator(identifier) = &self.current.token {
            if self.registry.find_postfix_operator(identifier).is_none() {
                break;
            }
            let op = identifier.clone();
            let op_span = self.current.span;
            self.advance()?;
            node = self.node(Expr::postfix(node.expr, op), node.height + 1, op_span)?;
        }
        Ok(node)
    }

    /// Parses a function call like max(1, 2).
    fn parse_function_call(&mut self, name: String) -> ParseResult<Node> {
        let registry = self.registry;
        let name_span = self.current.span;
        let function = registry
            .find_function(&name)
            .ok_or_else(|| self.unexpected("a known function"))?;
        self.advance()?;

        if self.current.token != Token::LParen {
            return Err(self.unexpected("'(' after function name"));
        }
        let open = self.current.span;
        self.advance()?;

        let mut args = Vec::new();
        if self.current.token != Token::RParen {
            args.push(self.parse_expression(0)?);

            // Parse remaining arguments separated by commas
            while self.current.token == Token::Comma {
                self.advance()?;
                args.push(self.parse_expression(0)?);
            }
        }

        let close = self.expect_closing(open)?;
        let span = name_span.merge(&close);

        if args.len() != function.arity() {
            return Err(ParseError::ArityMismatch {
                name,
                expected: function.arity(),
                actual: args.len(),
                span,
                snippet: self.lexer.snippet(span),
            });
        }

        let height = 1 + args.iter().map(|arg| arg.height).max().unwrap_or(0);
        let args = args.into_iter().map(|arg| arg.expr).collect();
        self.node(Expr::call(name, args), height, span)
    }

    /// Consumes the ')' matching the '(' at `open` and returns its span.
    fn expect_closing(&mut self, open: Span) -> ParseResult<Span> {
        if self.current.token == Token::RParen {
            let span = self.current.span;
            self.advance()?;
            Ok(span)
        } else {
            let span = self.current.span;
            Err(ParseError::UnmatchedParenthesis {
                open,
                found: describe(&self.current.token),
                span,
                snippet: self.lexer.snippet(span),
            })
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let span = self.current.span;
        ParseError::UnexpectedToken {
            found: describe(&self.current.token),
            expected,
            span,
            snippet: self.lexer.snippet(span),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Eof => token.to_string(),
        Token::Number(_) => format!("number {}", token),
        Token::Function(_) => format!("function '{}'", token),
        _ => format!("'{}'", token),
    }
}

/// Convenience function to parse an expression string directly.
pub fn parse(input: &str, registry: &Registry) -> ParseResult<Expr> {
    Parser::new(input, registry)?.parse()
}

pub fn parse_with_options(
    input: &str,
    registry: &Registry,
    options: ParserOptions,
) -> ParseResult<Expr> {
    Parser::with_options(input, registry, options)?.parse()
}
