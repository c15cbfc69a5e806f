//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the calculator engine.
//! CONTEXT: Evaluates trees produced by calc-parser, ships the standard
//! operator table and loads tables from configuration. Re-exports public
//! types and modules for use by other crates.

pub mod builtins;
pub mod calculator;
pub mod config;
pub mod evaluator;

// Re-export commonly used types at the crate root
pub use builtins::standard_registry;
pub use calculator::{calculate, CalcError, Calculator};
pub use config::{
    BinaryOperatorConfig, ConfigError, FunctionConfig, RegistryConfig, UnaryOperatorConfig,
};
pub use evaluator::{evaluate, EvalError, EvalResult, Evaluator};
