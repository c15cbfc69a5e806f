//! FILENAME: core/engine/src/config.rs
//! PURPOSE: Declarative operator tables loaded from JSON.
//! CONTEXT: A `RegistryConfig` describes the same thing a hand-built
//! `Registry` does, but names its rules instead of holding closures. Rule
//! names resolve through the catalog in builtins.rs when the table is built.
//!
//! FORMAT:
//! ```json
//! {
//!   "binary":    [{"identifiers": ["+", "plus"], "precedence": 3, "rule": "add"}],
//!   "unary":     [{"identifiers": ["-"], "fixity": "prefix", "precedence": 6, "rule": "neg"}],
//!   "functions": [{"name": "abs"}]
//! }
//! ```
//!
//! Every section may be omitted. `associativity` defaults to "left" and a
//! function's `rule` defaults to its name. Arity comes from the rule.

use crate::builtins::{binary_rule, function_rule, unary_rule};
use calc_parser::{
    Associativity, BinaryOperator, Fixity, Function, Registry, RegistryError, UnaryOperator,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid registry configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown {kind} rule '{name}'")]
    UnknownRule { kind: &'static str, name: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryOperatorConfig {
    pub identifiers: Vec<String>,
    pub precedence: i32,
    #[serde(default)]
    pub associativity: Associativity,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnaryOperatorConfig {
    pub identifiers: Vec<String>,
    pub fixity: Fixity,
    pub precedence: i32,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl FunctionConfig {
    /// The catalog rule this function uses.
    pub fn rule_name(&self) -> &str {
        self.rule.as_deref().unwrap_or(&self.name)
    }
}

/// Serializable description of an operator table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub binary: Vec<BinaryOperatorConfig>,
    pub unary: Vec<UnaryOperatorConfig>,
    pub functions: Vec<FunctionConfig>,
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The standard calculator table as data.
    pub fn standard() -> Self {
        use crate::builtins::{
            ADDITIVE_PRECEDENCE as ADD, BITWISE_PRECEDENCE as BIT, COMPARISON_PRECEDENCE as CMP,
            MULTIPLICATIVE_PRECEDENCE as MUL, POWER_PRECEDENCE as POW, SHIFT_PRECEDENCE as SHIFT,
            UNARY_PRECEDENCE as UNARY,
        };

        let binary: [(&[&str], i32, &str); 19] = [
            (&["=="], CMP, "eq"),
            (&[">"], CMP, "gt"),
            (&[">="], CMP, "ge"),
            (&["<"], CMP, "lt"),
            (&["<="], CMP, "le"),
            (&["and"], BIT, "and"),
            (&["or"], BIT, "or"),
            (&["xor"], BIT, "xor"),
            (&["nand"], BIT, "nand"),
            (&["nor"], BIT, "nor"),
            (&[">>"], SHIFT, "shr"),
            (&["<<"], SHIFT, "shl"),
            (&[">>>"], SHIFT, "ushr"),
            (&["+", "plus"], ADD, "add"),
            (&["-", "minus"], ADD, "sub"),
            (&["*", "x", "mul", "times"], MUL, "mul"),
            (&["/", "div"], MUL, "div"),
            (&["%", "mod", "rem"], MUL, "rem"),
            (&["^", "pow"], POW, "pow"),
        ];
        let binary = binary
            .into_iter()
            .map(|(identifiers, precedence, rule)| BinaryOperatorConfig {
                identifiers: strings(identifiers),
                precedence,
                associativity: if rule == "pow" {
                    Associativity::Right
                } else {
                    Associativity::Left
                },
                rule: rule.to_string(),
            })
            .collect();

        let unary = [
            ("+", Fixity::Prefix, "identity"),
            ("-", Fixity::Prefix, "neg"),
            ("!", Fixity::Postfix, "factorial"),
        ]
        .into_iter()
        .map(|(identifier, fixity, rule)| UnaryOperatorConfig {
            identifiers: vec![identifier.to_string()],
            fixity,
            precedence: UNARY,
            rule: rule.to_string(),
        })
        .collect();

        let functions = ["abs", "not", "min", "max"]
            .into_iter()
            .map(|name| FunctionConfig {
                name: name.to_string(),
                rule: None,
            })
            .collect();

        RegistryConfig {
            binary,
            unary,
            functions,
        }
    }

    /// Resolves every rule name and registers the definitions in order.
    /// Fails on the first unknown rule or registration error.
    pub fn build(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::new();

        for def in &self.binary {
            let rule = binary_rule(&def.rule).ok_or_else(|| unknown_rule("binary", &def.rule))?;
            registry.add_binary_operator(
                BinaryOperator::from_rule(&def.identifiers, def.precedence, rule)
                    .with_associativity(def.associativity),
            )?;
        }

        for def in &self.unary {
            let rule = unary_rule(&def.rule).ok_or_else(|| unknown_rule("unary", &def.rule))?;
            registry.add_unary_operator(UnaryOperator::from_rule(
                &def.identifiers,
                def.fixity,
                def.precedence,
                rule,
            ))?;
        }

        for def in &self.functions {
            let name = def.rule_name();
            let (arity, rule) = function_rule(name).ok_or_else(|| unknown_rule("function", name))?;
            registry.add_function(Function::from_rule(&def.name, arity, rule))?;
        }

        Ok(registry)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn unknown_rule(kind: &'static str, name: &str) -> ConfigError {
    ConfigError::UnknownRule {
        kind,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_builds_empty_registry() {
        let config = RegistryConfig::from_json("{}").unwrap();
        assert!(config.build().unwrap().is_empty());
    }

    #[test]
    fn associativity_and_rule_defaults() {
        let config = RegistryConfig::from_json(
            r#"{
                "binary": [{"identifiers": ["+"], "precedence": 3, "rule": "add"}],
                "functions": [{"name": "biggest", "rule": "max"}, {"name": "abs"}]
            }"#,
        )
        .unwrap();

        assert_eq!(config.binary[0].associativity, Associativity::Left);
        assert_eq!(config.functions[0].rule_name(), "max");
        assert_eq!(config.functions[1].rule_name(), "abs");

        let registry = config.build().unwrap();
        assert_eq!(registry.find_function("biggest").unwrap().arity(), 2);
    }

    #[test]
    fn unknown_rule_is_reported() {
        let config = RegistryConfig::from_json(
            r#"{"unary": [{"identifiers": ["~"], "fixity": "prefix", "precedence": 6, "rule": "invert"}]}"#,
        )
        .unwrap();

        match config.build() {
            Err(ConfigError::UnknownRule { kind, name }) => {
                assert_eq!(kind, "unary");
                assert_eq!(name, "invert");
            }
            other => panic!("Expected UnknownRule, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = RegistryConfig::from_json(r#"{"binary": [{"identifiers": ["+"]}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn standard_config_matches_standard_registry() {
        let from_config = RegistryConfig::standard().build().unwrap();
        let standard = crate::builtins::standard_registry().unwrap();

        assert_eq!(from_config.identifiers(), standard.identifiers());
        for op in standard.binary_operators() {
            let other = from_config.find_binary_operator(&op.identifiers()[0]).unwrap();
            assert_eq!(other.identifiers(), op.identifiers());
            assert_eq!(other.precedence(), op.precedence());
            assert_eq!(other.associativity(), op.associativity());
        }
        for op in standard.unary_operators() {
            let other = from_config
                .find_unary_operator(&op.identifiers()[0], op.fixity())
                .unwrap();
            assert_eq!(other.precedence(), op.precedence());
        }
        for function in standard.functions() {
            assert_eq!(
                from_config.find_function(function.name()).unwrap().arity(),
                function.arity()
            );
        }
    }

    #[test]
    fn standard_config_survives_json() {
        let config = RegistryConfig::standard();
        let json = config.to_json().unwrap();
        assert_eq!(RegistryConfig::from_json(&json).unwrap(), config);
    }
}
