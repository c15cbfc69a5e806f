//! FILENAME: core/engine/src/evaluator.rs
//! PURPOSE: Evaluates AST expressions to a number.
//! CONTEXT: After an expression is parsed into an AST, this module traverses
//! the tree and computes the final result. Every operator and function node
//! is resolved again against the registry and its rule is applied.
//!
//! ORDER:
//! - Binary: left operand, right operand, then the rule
//! - Prefix/Postfix: operand, then the rule
//! - Call: arguments left to right, then the rule
//!
//! NaN is an ordinary value here and propagates through every rule.

use calc_parser::{Expr, Fixity, Namespace, Registry};
use thiserror::Error;

/// Errors raised while evaluating a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown {namespace} '{identifier}'")]
    UnknownOperator {
        namespace: Namespace,
        identifier: String,
    },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("function {name} requires {expected} argument(s) but {actual} given")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument for '{identifier}': {message}")]
    InvalidArgument { identifier: String, message: String },
}

pub type EvalResult<T> = Result<T, EvalError>;

/// The evaluator walks a tree using the rules of one registry.
pub struct Evaluator<'a> {
    registry: &'a Registry,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Evaluator { registry }
    }

    /// Evaluates an expression and returns its value.
    pub fn evaluate(&self, expr: &Expr) -> EvalResult<f64> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Binary { left, op, right } => self.eval_binary(left, op, right),
            Expr::Prefix { op, operand } => self.eval_unary(op, Fixity::Prefix, operand),
            Expr::Postfix { operand, op } => self.eval_unary(op, Fixity::Postfix, operand),
            Expr::Call { name, args } => self.eval_call(name, args),
        }
    }

    fn eval_binary(&self, left: &Expr, op: &str, right: &Expr) -> EvalResult<f64> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        let operator =
            self.registry
                .find_binary_operator(op)
                .ok_or_else(|| EvalError::UnknownOperator {
                    namespace: Namespace::Binary,
                    identifier: op.to_string(),
                })?;

        operator
            .apply(left, right)
            .map_err(|err| invalid_argument(op, err.0))
    }

    fn eval_unary(&self, op: &str, fixity: Fixity, operand: &Expr) -> EvalResult<f64> {
        let value = self.evaluate(operand)?;

        let operator = self
            .registry
            .find_unary_operator(op, fixity)
            .ok_or_else(|| EvalError::UnknownOperator {
                namespace: Namespace::from(fixity),
                identifier: op.to_string(),
            })?;

        operator
            .apply(value)
            .map_err(|err| invalid_argument(op, err.0))
    }

    fn eval_call(&self, name: &str, args: &[Expr]) -> EvalResult<f64> {
        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<EvalResult<Vec<f64>>>()?;

        let function = self
            .registry
            .find_function(name)
            .ok_or_else(|| EvalError::UnknownFunction {
                name: name.to_string(),
            })?;

        // The parser already checks arity; hand-built trees may not.
        if values.len() != function.arity() {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: function.arity(),
                actual: values.len(),
            });
        }

        function
            .apply(&values)
            .map_err(|err| invalid_argument(name, err.0))
    }
}

fn invalid_argument(identifier: &str, message: String) -> EvalError {
    EvalError::InvalidArgument {
        identifier: identifier.to_string(),
        message,
    }
}

/// Convenience function to evaluate a tree against a registry.
pub fn evaluate(expr: &Expr, registry: &Registry) -> EvalResult<f64> {
    Evaluator::new(registry).evaluate(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_parser::{ArgumentError, BinaryOperator, Function, UnaryOperator};

    fn registry() -> Registry {
        Registry::build(
            vec![
                BinaryOperator::new(["+"], 3, |l, r| l + r),
                BinaryOperator::new(["-"], 3, |l, r| l - r),
            ],
            vec![
                UnaryOperator::prefix(["-"], 6, |x| -x),
                UnaryOperator::checked(["!"], Fixity::Postfix, 6, |x| {
                    if x < 0.0 {
                        Err(ArgumentError::new("negative"))
                    } else {
                        Ok(x)
                    }
                }),
            ],
            vec![Function::new("max", 2, |a| a[0].max(a[1]))],
        )
        .unwrap()
    }

    #[test]
    fn evaluates_hand_built_tree() {
        let expr = Expr::binary(
            Expr::prefix("-", Expr::Number(2.0)),
            "+",
            Expr::call("MAX", vec![Expr::Number(1.0), Expr::Number(5.0)]),
        );
        assert_eq!(evaluate(&expr, &registry()), Ok(3.0));
    }

    #[test]
    fn unknown_operator_names_its_namespace() {
        // '-' exists as prefix and binary but not as postfix
        let expr = Expr::postfix(Expr::Number(1.0), "-");
        assert_eq!(
            evaluate(&expr, &registry()),
            Err(EvalError::UnknownOperator {
                namespace: Namespace::Postfix,
                identifier: "-".to_string(),
            })
        );

        let expr = Expr::binary(Expr::Number(1.0), "*", Expr::Number(2.0));
        assert!(matches!(
            evaluate(&expr, &registry()),
            Err(EvalError::UnknownOperator {
                namespace: Namespace::Binary,
                ..
            })
        ));
    }

    #[test]
    fn unknown_function() {
        let expr = Expr::call("sqrt", vec![Expr::Number(4.0)]);
        assert_eq!(
            evaluate(&expr, &registry()),
            Err(EvalError::UnknownFunction {
                name: "sqrt".to_string()
            })
        );
    }

    #[test]
    fn arity_is_checked_for_hand_built_calls() {
        let expr = Expr::call("max", vec![Expr::Number(4.0)]);
        assert_eq!(
            evaluate(&expr, &registry()),
            Err(EvalError::ArityMismatch {
                name: "max".to_string(),
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn rule_errors_become_invalid_argument() {
        let expr = Expr::postfix(Expr::prefix("-", Expr::Number(3.0)), "!");
        assert_eq!(
            evaluate(&expr, &registry()),
            Err(EvalError::InvalidArgument {
                identifier: "!".to_string(),
                message: "negative".to_string(),
            })
        );
    }

    #[test]
    fn nan_is_a_value() {
        let expr = Expr::binary(Expr::Number(f64::NAN), "+", Expr::Number(1.0));
        assert!(evaluate(&expr, &registry()).unwrap().is_nan());
    }
}
