//! FILENAME: core/parser/src/error.rs
//! PURPOSE: Lexer and parser error types.
//! CONTEXT: Every positional error carries the offending text, its byte span
//! and a `SourceSnippet` that renders the input with a marker under the span:
//!
//! ```text
//! unexpected character '$' at 4
//! 1 + $ 2
//!     ^
//! ```

use crate::token::Span;
use std::fmt;
use thiserror::Error;

/// The source text with a marker line under one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnippet {
    source: String,
    span: Span,
}

impl SourceSnippet {
    pub fn new(source: &str, span: Span) -> Self {
        SourceSnippet {
            source: source.to_string(),
            span,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The marker line: `^` under a single character, `~` under longer spans.
    /// Columns are counted in characters so multi-byte input stays aligned.
    pub fn marker(&self) -> String {
        let start = char_column(&self.source, self.span.start);
        let end = char_column(&self.source, self.span.end);
        let width = end.saturating_sub(start);
        let mark = if width > 1 {
            "~".repeat(width)
        } else {
            "^".to_string()
        };
        format!("{}{}", " ".repeat(start), mark)
    }
}

impl fmt::Display for SourceSnippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.source, self.marker())
    }
}

fn char_column(source: &str, byte_offset: usize) -> usize {
    let offset = byte_offset.min(source.len());
    source
        .char_indices()
        .take_while(|(i, _)| *i < offset)
        .count()
}

/// Errors raised while splitting the input into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("invalid number '{text}' at {span}\n{snippet}")]
    InvalidNumber {
        text: String,
        span: Span,
        snippet: SourceSnippet,
    },

    #[error("unexpected operator or function '{text}' at {span}\n{snippet}")]
    UnexpectedIdentifier {
        text: String,
        span: Span,
        snippet: SourceSnippet,
    },

    #[error("unexpected character '{character}' at {span}\n{snippet}")]
    UnexpectedCharacter {
        character: char,
        span: Span,
        snippet: SourceSnippet,
    },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidNumber { span, .. }
            | LexError::UnexpectedIdentifier { span, .. }
            | LexError::UnexpectedCharacter { span, .. } => *span,
        }
    }

    pub fn snippet(&self) -> &SourceSnippet {
        match self {
            LexError::InvalidNumber { snippet, .. }
            | LexError::UnexpectedIdentifier { snippet, .. }
            | LexError::UnexpectedCharacter { snippet, .. } => snippet,
        }
    }
}

/// Errors raised while building the syntax tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {found} at {span}, expected {expected}\n{snippet}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        span: Span,
        snippet: SourceSnippet,
    },

    #[error("function {name} requires {expected} argument(s) but {actual} found at {span}\n{snippet}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
        snippet: SourceSnippet,
    },

    #[error("unmatched '(' at {open}: found {found} instead of ')' at {span}\n{snippet}")]
    UnmatchedParenthesis {
        open: Span,
        found: String,
        span: Span,
        snippet: SourceSnippet,
    },

    #[error("unexpected trailing input {found} at {span}\n{snippet}")]
    UnexpectedTrailingInput {
        found: String,
        span: Span,
        snippet: SourceSnippet,
    },

    #[error("expression nested deeper than {limit} levels at {span}\n{snippet}")]
    NestingTooDeep {
        limit: usize,
        span: Span,
        snippet: SourceSnippet,
    },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span(),
            ParseError::UnexpectedToken { span, .. }
            | ParseError::ArityMismatch { span, .. }
            | ParseError::UnmatchedParenthesis { span, .. }
            | ParseError::UnexpectedTrailingInput { span, .. }
            | ParseError::NestingTooDeep { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
