//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw expression string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. Which operator
//! symbols and words exist is not fixed here; the lexer asks the registry.
//!
//! RULES (in priority order, after skipping whitespace):
//! - End of input: Eof (repeatedly)
//! - Digit: number literal with one optional '.' and one optional
//!   grouping separator ('_', or ',' before exactly three digits)
//! - Letter: a run of letters naming an operator alias or a function
//! - '(' ')' ',': punctuation
//! - Anything else: the longest registry identifier matching at this position

use crate::error::{LexError, SourceSnippet};
use crate::registry::Registry;
use crate::token::{Span, SpannedToken, Token};

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    registry: &'a Registry,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, registry: &'a Registry) -> Self {
        Lexer {
            input,
            pos: 0,
            registry,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_whitespace();

        let start = self.pos;
        let token = match self.peek() {
            None => Token::Eof,
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if ch.is_alphabetic() => self.read_identifier()?,
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some(',') => self.single(Token::Comma),
            Some(_) => self.read_operator()?,
        };

        let spanned = SpannedToken::new(token, Span::new(start, self.pos));
        log::trace!("token {:?} at {}", spanned.token, spanned.span);
        Ok(spanned)
    }

    /// Builds a snippet of the whole input marking `span`.
    pub fn snippet(&self, span: Span) -> SourceSnippet {
        SourceSnippet::new(self.input, span)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let mut number_str = String::new();
        let mut has_dot = false;
        let mut has_separator = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
            } else if ch == '.' {
                if has_dot {
                    break;
                }
                has_dot = true;
                number_str.push(ch);
            } else if ch == '_' || ch == ',' {
                if has_separator || (ch == ',' && !self.comma_groups_digits()) {
                    break;
                }
                has_separator = true;
            } else {
                break;
            }
            self.bump();
        }

        match number_str.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            _ => {
                let span = Span::new(start, self.pos);
                Err(LexError::InvalidNumber {
                    text: self.input[start..self.pos].to_string(),
                    span,
                    snippet: self.snippet(span),
                })
            }
        }
    }

    /// A ',' at the cursor is a thousands separator only when exactly three
    /// digits follow it. Anything else leaves the comma to separate arguments.
    fn comma_groups_digits(&self) -> bool {
        (1..=3).all(|i| self.peek_nth(i).is_some_and(|c| c.is_ascii_digit()))
            && !self.peek_nth(4).is_some_and(|c| c.is_ascii_digit())
    }

    fn read_identifier(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        while self.peek().is_some_and(char::is_alphabetic) {
            self.bump();
        }
        let text = &self.input[start..self.pos];

        if self.registry.is_operator(text) {
            Ok(Token::Operator(text.to_string()))
        } else if self.registry.find_function(text).is_some() {
            Ok(Token::Function(text.to_string()))
        } else {
            let span = Span::new(start, self.pos);
            Err(LexError::UnexpectedIdentifier {
                text: text.to_string(),
                span,
                snippet: self.snippet(span),
            })
        }
    }

    fn read_operator(&mut self) -> Result<Token, LexError> {
        let rest = self.rest();
        // Identifiers are sorted longest first, so the first hit is the longest match.
        let matched = self
            .registry
            .identifiers()
            .iter()
            .find(|identifier| rest.starts_with(identifier.as_str()));

        match matched {
            Some(identifier) => {
                self.pos += identifier.len();
                Ok(Token::Operator(identifier.clone()))
            }
            None => {
                let character = self.peek().unwrap_or_default();
                let span = Span::new(self.pos, self.pos + character.len_utf8());
                Err(LexError::UnexpectedCharacter {
                    character,
                    span,
                    snippet: self.snippet(span),
                })
            }
        }
    }
}
