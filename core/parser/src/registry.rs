//! FILENAME: core/parser/src/registry.rs
//! PURPOSE: Runtime table of binary operators, unary operators and functions.
//! CONTEXT: The registry is the grammar. The lexer reads its identifiers to
//! split the input, the parser reads precedence/associativity/arity, and the
//! evaluator looks up the rule attached to each node. It is built once and
//! only read during a parse/evaluate cycle.
//!
//! NAMESPACES:
//! - binary:   one namespace for all binary operator aliases
//! - prefix:   unary operators written before their operand
//! - postfix:  unary operators written after their operand
//! - function: named functions with a fixed arity
//!
//! Identifiers are case-insensitive; they are stored lowercase.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error reported by a rule whose argument lies outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ArgumentError(pub String);

impl ArgumentError {
    pub fn new(message: impl Into<String>) -> Self {
        ArgumentError(message.into())
    }
}

pub type RuleResult = Result<f64, ArgumentError>;

pub type BinaryRule = Arc<dyn Fn(f64, f64) -> RuleResult + Send + Sync>;
pub type UnaryRule = Arc<dyn Fn(f64) -> RuleResult + Send + Sync>;
pub type FunctionRule = Arc<dyn Fn(&[f64]) -> RuleResult + Send + Sync>;

/// Tie-break for binary operators of equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Associativity {
    #[default]
    Left,
    Right,
}

/// Position of a unary operator relative to its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fixity {
    Prefix,
    Postfix,
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fixity::Prefix => write!(f, "prefix"),
            Fixity::Postfix => write!(f, "postfix"),
        }
    }
}

/// The four identifier namespaces of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Binary,
    Prefix,
    Postfix,
    Function,
}

impl From<Fixity> for Namespace {
    fn from(fixity: Fixity) -> Self {
        match fixity {
            Fixity::Prefix => Namespace::Prefix,
            Fixity::Postfix => Namespace::Postfix,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Binary => write!(f, "binary operator"),
            Namespace::Prefix => write!(f, "prefix operator"),
            Namespace::Postfix => write!(f, "postfix operator"),
            Namespace::Function => write!(f, "function"),
        }
    }
}

/// Configuration errors raised while registering definitions.
/// A failed registration never modifies the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{namespace} identifier '{identifier}' is already registered")]
    DuplicateIdentifier {
        namespace: Namespace,
        identifier: String,
    },

    #[error("{namespace} declared without any identifier")]
    MissingIdentifier { namespace: Namespace },

    #[error("invalid {namespace} identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        namespace: Namespace,
        identifier: String,
        reason: &'static str,
    },
}

/// A binary operator: aliases, binding strength, associativity and rule.
#[derive(Clone)]
pub struct BinaryOperator {
    identifiers: Vec<String>,
    precedence: i32,
    associativity: Associativity,
    rule: BinaryRule,
}

impl BinaryOperator {
    /// Creates a left-associative operator from a total rule.
    pub fn new<I, S, F>(identifiers: I, precedence: i32, rule: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self::checked(identifiers, precedence, move |l, r| Ok(rule(l, r)))
    }

    /// Creates a left-associative operator from a rule that may reject its arguments.
    pub fn checked<I, S, F>(identifiers: I, precedence: i32, rule: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(f64, f64) -> RuleResult + Send + Sync + 'static,
    {
        Self::from_rule(identifiers, precedence, Arc::new(rule))
    }

    /// Creates an operator around an already shared rule.
    pub fn from_rule<I, S>(identifiers: I, precedence: i32, rule: BinaryRule) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        BinaryOperator {
            identifiers: normalize(identifiers),
            precedence,
            associativity: Associativity::Left,
            rule,
        }
    }

    pub fn with_associativity(mut self, associativity: Associativity) -> Self {
        self.associativity = associativity;
        self
    }

    pub fn right_associative(self) -> Self {
        self.with_associativity(Associativity::Right)
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    /// Minimum precedence for the right-hand operand during precedence climbing.
    pub fn next_min_precedence(&self) -> i32 {
        match self.associativity {
            Associativity::Left => self.precedence.saturating_add(1),
            Associativity::Right => self.precedence,
        }
    }

    pub fn apply(&self, left: f64, right: f64) -> RuleResult {
        (self.rule)(left, right)
    }
}

impl fmt::Debug for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryOperator")
            .field("identifiers", &self.identifiers)
            .field("precedence", &self.precedence)
            .field("associativity", &self.associativity)
            .finish_non_exhaustive()
    }
}

/// A prefix or postfix operator.
#[derive(Clone)]
pub struct UnaryOperator {
    identifiers: Vec<String>,
    fixity: Fixity,
    precedence: i32,
    rule: UnaryRule,
}

impl UnaryOperator {
    pub fn new<I, S, F>(identifiers: I, fixity: Fixity, precedence: i32, rule: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::checked(identifiers, fixity, precedence, move |x| Ok(rule(x)))
    }

    pub fn checked<I, S, F>(identifiers: I, fixity: Fixity, precedence: i32, rule: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(f64) -> RuleResult + Send + Sync + 'static,
    {
        Self::from_rule(identifiers, fixity, precedence, Arc::new(rule))
    }

    /// Creates an operator around an already shared rule.
    pub fn from_rule<I, S>(identifiers: I, fixity: Fixity, precedence: i32, rule: UnaryRule) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        UnaryOperator {
            identifiers: normalize(identifiers),
            fixity,
            precedence,
            rule,
        }
    }

    pub fn prefix<I, S, F>(identifiers: I, precedence: i32, rule: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::new(identifiers, Fixity::Prefix, precedence, rule)
    }

    pub fn postfix<I, S, F>(identifiers: I, precedence: i32, rule: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::new(identifiers, Fixity::Postfix, precedence, rule)
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn fixity(&self) -> Fixity {
        self.fixity
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn apply(&self, operand: f64) -> RuleResult {
        (self.rule)(operand)
    }
}

impl fmt::Debug for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnaryOperator")
            .field("identifiers", &self.identifiers)
            .field("fixity", &self.fixity)
            .field("precedence", &self.precedence)
            .finish_non_exhaustive()
    }
}

/// A named function taking exactly `arity` arguments.
#[derive(Clone)]
pub struct Function {
    name: String,
    arity: usize,
    rule: FunctionRule,
}

impl Function {
    pub fn new<F>(name: &str, arity: usize, rule: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::checked(name, arity, move |args| Ok(rule(args)))
    }

    pub fn checked<F>(name: &str, arity: usize, rule: F) -> Self
    where
        F: Fn(&[f64]) -> RuleResult + Send + Sync + 'static,
    {
        Self::from_rule(name, arity, Arc::new(rule))
    }

    /// Creates a function around an already shared rule.
    pub fn from_rule(name: &str, arity: usize, rule: FunctionRule) -> Self {
        Function {
            name: name.to_lowercase(),
            arity,
            rule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Applies the rule. Callers check the arity first.
    pub fn apply(&self, args: &[f64]) -> RuleResult {
        (self.rule)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Operator and function table shared by the lexer, parser and evaluator.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    binary: Vec<BinaryOperator>,
    unary: Vec<UnaryOperator>,
    functions: Vec<Function>,

    binary_index: FxHashMap<String, usize>,
    prefix_index: FxHashMap<String, usize>,
    postfix_index: FxHashMap<String, usize>,
    function_index: FxHashMap<String, usize>,

    /// Binary and unary identifiers, deduplicated, longest first.
    identifiers: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from complete definition lists.
    /// Fails on the first definition that collides or is malformed.
    pub fn build(
        binary: impl IntoIterator<Item = BinaryOperator>,
        unary: impl IntoIterator<Item = UnaryOperator>,
        functions: impl IntoIterator<Item = Function>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Registry::new();
        registry.add_binary_operators(binary)?;
        registry.add_unary_operators(unary)?;
        registry.add_functions(functions)?;
        Ok(registry)
    }

    pub fn add_binary_operator(&mut self, operator: BinaryOperator) -> Result<(), RegistryError> {
        check_identifiers(Namespace::Binary, &operator.identifiers, &self.binary_index)?;

        log::debug!(
            "registering binary operator {:?} (precedence {}, {:?})",
            operator.identifiers,
            operator.precedence,
            operator.associativity
        );

        let index = self.binary.len();
        for identifier in &operator.identifiers {
            self.binary_index.insert(identifier.clone(), index);
        }
        self.binary.push(operator);
        self.rebuild_identifiers();
        Ok(())
    }

    pub fn add_unary_operator(&mut self, operator: UnaryOperator) -> Result<(), RegistryError> {
        let namespace = Namespace::from(operator.fixity);
        let index_map = match operator.fixity {
            Fixity::Prefix => &self.prefix_index,
            Fixity::Postfix => &self.postfix_index,
        };
        check_identifiers(namespace, &operator.identifiers, index_map)?;

        log::debug!(
            "registering {} operator {:?} (precedence {})",
            operator.fixity,
            operator.identifiers,
            operator.precedence
        );

        let index = self.unary.len();
        let index_map = match operator.fixity {
            Fixity::Prefix => &mut self.prefix_index,
            Fixity::Postfix => &mut self.postfix_index,
        };
        for identifier in &operator.identifiers {
            index_map.insert(identifier.clone(), index);
        }
        self.unary.push(operator);
        self.rebuild_identifiers();
        Ok(())
    }

    pub fn add_function(&mut self, function: Function) -> Result<(), RegistryError> {
        let name = &function.name;
        if name.is_empty() || !name.chars().all(char::is_alphabetic) {
            return Err(RegistryError::InvalidIdentifier {
                namespace: Namespace::Function,
                identifier: name.clone(),
                reason: "function names must be a non-empty run of letters",
            });
        }
        if self.function_index.contains_key(name) {
            return Err(RegistryError::DuplicateIdentifier {
                namespace: Namespace::Function,
                identifier: name.clone(),
            });
        }

        log::debug!("registering function {}/{}", name, function.arity);

        self.function_index.insert(name.clone(), self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    pub fn add_binary_operators(
        &mut self,
        operators: impl IntoIterator<Item = BinaryOperator>,
    ) -> Result<(), RegistryError> {
        operators
            .into_iter()
            .try_for_each(|operator| self.add_binary_operator(operator))
    }

    pub fn add_unary_operators(
        &mut self,
        operators: impl IntoIterator<Item = UnaryOperator>,
    ) -> Result<(), RegistryError> {
        operators
            .into_iter()
            .try_for_each(|operator| self.add_unary_operator(operator))
    }

    pub fn add_functions(
        &mut self,
        functions: impl IntoIterator<Item = Function>,
    ) -> Result<(), RegistryError> {
        functions
            .into_iter()
            .try_for_each(|function| self.add_function(function))
    }

    pub fn find_binary_operator(&self, identifier: &str) -> Option<&BinaryOperator> {
        lookup(&self.binary_index, identifier).map(|i| &self.binary[i])
    }

    pub fn find_prefix_operator(&self, identifier: &str) -> Option<&UnaryOperator> {
        lookup(&self.prefix_index, identifier).map(|i| &self.unary[i])
    }

    pub fn find_postfix_operator(&self, identifier: &str) -> Option<&UnaryOperator> {
        lookup(&self.postfix_index, identifier).map(|i| &self.unary[i])
    }

    pub fn find_unary_operator(&self, identifier: &str, fixity: Fixity) -> Option<&UnaryOperator> {
        match fixity {
            Fixity::Prefix => self.find_prefix_operator(identifier),
            Fixity::Postfix => self.find_postfix_operator(identifier),
        }
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        lookup(&self.function_index, name).map(|i| &self.functions[i])
    }

    /// Returns true if `identifier` names an operator of any fixity.
    pub fn is_operator(&self, identifier: &str) -> bool {
        let key = identifier.to_lowercase();
        self.binary_index.contains_key(&key)
            || self.prefix_index.contains_key(&key)
            || self.postfix_index.contains_key(&key)
    }

    /// All operator identifiers, longest first.
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn binary_operators(&self) -> impl Iterator<Item = &BinaryOperator> {
        self.binary.iter()
    }

    pub fn unary_operators(&self) -> impl Iterator<Item = &UnaryOperator> {
        self.unary.iter()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.binary.is_empty() && self.unary.is_empty() && self.functions.is_empty()
    }

    fn rebuild_identifiers(&mut self) {
        let mut identifiers: Vec<String> = self
            .binary_index
            .keys()
            .chain(self.prefix_index.keys())
            .chain(self.postfix_index.keys())
            .cloned()
            .collect();
        // Ties are ordered lexicographically so the result never depends on
        // hash order or registration order.
        identifiers.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        identifiers.dedup();
        self.identifiers = identifiers;
    }
}

fn lookup(index: &FxHashMap<String, usize>, identifier: &str) -> Option<usize> {
    index.get(identifier.to_lowercase().as_str()).copied()
}

/// Lowercases aliases and drops repeats, keeping declaration order.
fn normalize<I, S>(identifiers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for identifier in identifiers {
        let identifier = identifier.as_ref().to_lowercase();
        if !out.contains(&identifier) {
            out.push(identifier);
        }
    }
    out
}

/// Validates every alias of one definition against its namespace.
fn check_identifiers(
    namespace: Namespace,
    identifiers: &[String],
    index: &FxHashMap<String, usize>,
) -> Result<(), RegistryError> {
    if identifiers.is_empty() {
        return Err(RegistryError::MissingIdentifier { namespace });
    }

    for identifier in identifiers {
        if let Some(reason) = invalid_operator_identifier(identifier) {
            return Err(RegistryError::InvalidIdentifier {
                namespace,
                identifier: identifier.clone(),
                reason,
            });
        }
        if index.contains_key(identifier) {
            return Err(RegistryError::DuplicateIdentifier {
                namespace,
                identifier: identifier.clone(),
            });
        }
    }
    Ok(())
}

/// Rejects aliases the lexer could never produce as an operator token.
fn invalid_operator_identifier(identifier: &str) -> Option<&'static str> {
    let Some(first) = identifier.chars().next() else {
        return Some("identifiers cannot be empty");
    };

    if identifier.chars().any(char::is_whitespace) {
        return Some("identifiers cannot contain whitespace");
    }
    if identifier.contains(['(', ')', ',']) {
        return Some("identifiers cannot contain parentheses or commas");
    }
    if first.is_ascii_digit() {
        return Some("identifiers cannot start with a digit");
    }
    if first.is_alphabetic() && !identifier.chars().all(char::is_alphabetic) {
        return Some("identifiers starting with a letter must consist of letters only");
    }
    // Symbol runs are matched byte for byte, so a cased letter inside one
    // could never match its other case.
    if !first.is_alphabetic()
        && identifier.chars().any(|c| c.is_lowercase() || c.is_uppercase())
    {
        return Some("symbolic identifiers cannot contain cased letters");
    }
    None
}
