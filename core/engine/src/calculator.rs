//! FILENAME: core/engine/src/calculator.rs
//! PURPOSE: One-call text to number evaluation.
//! CONTEXT: Ties the pipeline together. A `Calculator` owns its registry and
//! parser options; `calculate` is the borrowed-registry shortcut.

use crate::builtins::standard_registry;
use crate::config::{ConfigError, RegistryConfig};
use crate::evaluator::{EvalError, Evaluator};
use calc_parser::{parse_with_options, Expr, ParseError, ParserOptions, Registry, RegistryError};
use thiserror::Error;

/// Any failure of a text to number evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone)]
pub struct Calculator {
    registry: Registry,
    options: ParserOptions,
}

impl Calculator {
    pub fn new(registry: Registry) -> Self {
        Calculator {
            registry,
            options: ParserOptions::default(),
        }
    }

    /// A calculator over the standard operator table.
    pub fn standard() -> Result<Self, RegistryError> {
        Ok(Self::new(standard_registry()?))
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build()?))
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access for registering further definitions.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    pub fn parse(&self, input: &str) -> Result<Expr, ParseError> {
        parse_with_options(input, &self.registry, self.options)
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<f64, EvalError> {
        Evaluator::new(&self.registry).evaluate(expr)
    }

    pub fn calculate(&self, input: &str) -> Result<f64, CalcError> {
        log::debug!("calculating {:?}", input);
        let expr = self.parse(input)?;
        let value = self.evaluate(&expr)?;
        log::debug!("{:?} = {}", input, value);
        Ok(value)
    }
}

/// Parses and evaluates `input` with default parser options.
pub fn calculate(input: &str, registry: &Registry) -> Result<f64, CalcError> {
    let expr = parse_with_options(input, registry, ParserOptions::default())?;
    Ok(Evaluator::new(registry).evaluate(&expr)?)
}
