//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for arithmetic expressions.
//! CONTEXT: After the Lexer tokenizes an expression, the Parser converts those
//! tokens into this tree. The Evaluator then walks it, resolving every operator
//! and function name against the same registry the parser used.
//!
//! SUPPORTED EXPRESSIONS:
//! - Number literals: 42, 3.5, 1_000, 1,000
//! - Binary operations: any registered binary operator (2 + 3, 6 mod 4)
//! - Prefix operations: any registered prefix operator (-5)
//! - Postfix operations: any registered postfix operator (5!)
//! - Function calls: max(1, 2), abs(-3)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a parsed expression.
/// Operator and function names are kept as written; lookups are case-insensitive.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),

    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },

    Prefix {
        op: String,
        operand: Box<Expr>,
    },

    Postfix {
        operand: Box<Expr>,
        op: String,
    },

    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn binary(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
    }

    pub fn prefix(op: impl Into<String>, operand: Expr) -> Self {
        Expr::Prefix {
            op: op.into(),
            operand: Box::new(operand),
        }
    }

    pub fn postfix(operand: Expr, op: impl Into<String>) -> Self {
        Expr::Postfix {
            operand: Box::new(operand),
            op: op.into(),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Height of the tree; a lone number has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Number(_) => 1,
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expr::Prefix { operand, .. } | Expr::Postfix { operand, .. } => 1 + operand.depth(),
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::depth).max().unwrap_or(0),
        }
    }
}

/// Fully parenthesized rendering, e.g. `(2 ^ (3 ^ 2))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Binary { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Prefix { op, operand } => {
                if op.ends_with(char::is_alphabetic) {
                    write!(f, "({} {})", op, operand)
                } else {
                    write!(f, "({}{})", op, operand)
                }
            }
            Expr::Postfix { operand, op } => write!(f, "({}{})", operand, op),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
