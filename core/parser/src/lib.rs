//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the registry-driven expression parser.
//! CONTEXT: This crate exposes the operator registry, lexer, parser and AST
//! needed to convert expression strings into evaluatable trees. The set of
//! operators is not fixed: it is whatever the Registry holds at parse time.
//!
//! PIPELINE: Expression String --> Lexer --> Tokens --> Parser --> AST --> Evaluator
//!
//! SUPPORTED FEATURES:
//! - Binary operators with per-operator precedence and associativity
//! - Prefix and postfix unary operators (chained: -5!!)
//! - Word aliases for operators: 2 plus 3, 6 mod 4
//! - Function calls with fixed arity: max(1, 2)
//! - Digit grouping in literals: 1_000, 1,000
//! - Parentheses for grouping

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::Expr;
pub use error::{LexError, ParseError, ParseResult, SourceSnippet};
pub use lexer::Lexer;
pub use parser::{parse, parse_with_options, Parser, ParserOptions, DEFAULT_MAX_DEPTH};
pub use registry::{
    ArgumentError, Associativity, BinaryOperator, BinaryRule, Fixity, Function, FunctionRule,
    Namespace, Registry, RegistryError, RuleResult, UnaryOperator, UnaryRule,
};
pub use token::{Span, SpannedToken, Token};
