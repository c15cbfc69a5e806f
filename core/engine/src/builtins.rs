//! FILENAME: core/engine/src/builtins.rs
//! PURPOSE: The standard operator table and the catalog of named rules.
//! CONTEXT: `standard_registry` is the ready-made table most callers want.
//! The catalog functions (`binary_rule`, `unary_rule`, `function_rule`) map
//! rule names to shared rules so tables can also be described as data
//! (see config.rs).
//!
//! STANDARD TABLE:
//! | precedence | binary operators                                   |
//! |------------|----------------------------------------------------|
//! | 0          | == > >= < <=                                       |
//! | 1          | and or xor nand nor                                |
//! | 2          | >> << >>>                                          |
//! | 3          | + plus, - minus                                    |
//! | 4          | * x mul times, / div, % mod rem                    |
//! | 5          | ^ pow (right-associative)                          |
//!
//! Prefix + and - and postfix ! (factorial) bind at 6.
//! Functions: abs/1, not/1, min/2, max/2.
//!
//! INTEGER RULES: bitwise operators, shifts, `not` and factorial work on
//! 32-bit integers. Operands are rounded to the nearest integer with ties
//! toward +infinity and shift counts are masked to 5 bits. A NaN operand
//! yields NaN.

use calc_parser::{
    ArgumentError, BinaryOperator, BinaryRule, Fixity, Function, FunctionRule, Registry,
    RegistryError, RuleResult, UnaryOperator, UnaryRule,
};
use std::sync::Arc;

pub const COMPARISON_PRECEDENCE: i32 = 0;
pub const BITWISE_PRECEDENCE: i32 = 1;
pub const SHIFT_PRECEDENCE: i32 = 2;
pub const ADDITIVE_PRECEDENCE: i32 = 3;
pub const MULTIPLICATIVE_PRECEDENCE: i32 = 4;
pub const POWER_PRECEDENCE: i32 = 5;
pub const UNARY_PRECEDENCE: i32 = 6;

/// Largest argument whose factorial is finite as an f64.
const MAX_FINITE_FACTORIAL: f64 = 170.0;

/// Builds the standard calculator table.
pub fn standard_registry() -> Result<Registry, RegistryError> {
    Registry::build(
        vec![
            // Comparison
            BinaryOperator::checked(["=="], COMPARISON_PRECEDENCE, eq),
            BinaryOperator::checked([">"], COMPARISON_PRECEDENCE, gt),
            BinaryOperator::checked([">="], COMPARISON_PRECEDENCE, ge),
            BinaryOperator::checked(["<"], COMPARISON_PRECEDENCE, lt),
            BinaryOperator::checked(["<="], COMPARISON_PRECEDENCE, le),
            // Bitwise
            BinaryOperator::checked(["and"], BITWISE_PRECEDENCE, and),
            BinaryOperator::checked(["or"], BITWISE_PRECEDENCE, or),
            BinaryOperator::checked(["xor"], BITWISE_PRECEDENCE, xor),
            BinaryOperator::checked(["nand"], BITWISE_PRECEDENCE, nand),
            BinaryOperator::checked(["nor"], BITWISE_PRECEDENCE, nor),
            // Shifts
            BinaryOperator::checked([">>"], SHIFT_PRECEDENCE, shr),
            BinaryOperator::checked(["<<"], SHIFT_PRECEDENCE, shl),
            BinaryOperator::checked([">>>"], SHIFT_PRECEDENCE, ushr),
            // Arithmetic
            BinaryOperator::checked(["+", "plus"], ADDITIVE_PRECEDENCE, add),
            BinaryOperator::checked(["-", "minus"], ADDITIVE_PRECEDENCE, sub),
            BinaryOperator::checked(["*", "x", "mul", "times"], MULTIPLICATIVE_PRECEDENCE, mul),
            BinaryOperator::checked(["/", "div"], MULTIPLICATIVE_PRECEDENCE, div),
            BinaryOperator::checked(["%", "mod", "rem"], MULTIPLICATIVE_PRECEDENCE, rem),
            BinaryOperator::checked(["^", "pow"], POWER_PRECEDENCE, pow).right_associative(),
        ],
        vec![
            UnaryOperator::checked(["+"], Fixity::Prefix, UNARY_PRECEDENCE, identity),
            UnaryOperator::checked(["-"], Fixity::Prefix, UNARY_PRECEDENCE, neg),
            UnaryOperator::checked(["!"], Fixity::Postfix, UNARY_PRECEDENCE, factorial),
        ],
        vec![
            Function::checked("abs", 1, abs),
            Function::checked("not", 1, not),
            Function::checked("min", 2, min),
            Function::checked("max", 2, max),
        ],
    )
}

// ========================================
// RULE CATALOG
// ========================================

/// Looks up a named binary rule (`add`, `sub`, `mul`, `div`, `rem`, `pow`,
/// `eq`, `gt`, `ge`, `lt`, `le`, `and`, `or`, `xor`, `nand`, `nor`, `shl`,
/// `shr`, `ushr`).
pub fn binary_rule(name: &str) -> Option<BinaryRule> {
    let rule: BinaryRule = match name.to_lowercase().as_str() {
        "add" => Arc::new(add),
        "sub" => Arc::new(sub),
        "mul" => Arc::new(mul),
        "div" => Arc::new(div),
        "rem" => Arc::new(rem),
        "pow" => Arc::new(pow),
        "eq" => Arc::new(eq),
        "gt" => Arc::new(gt),
        "ge" => Arc::new(ge),
        "lt" => Arc::new(lt),
        "le" => Arc::new(le),
        "and" => Arc::new(and),
        "or" => Arc::new(or),
        "xor" => Arc::new(xor),
        "nand" => Arc::new(nand),
        "nor" => Arc::new(nor),
        "shl" => Arc::new(shl),
        "shr" => Arc::new(shr),
        "ushr" => Arc::new(ushr),
        _ => return None,
    };
    Some(rule)
}

/// Looks up a named unary rule (`identity`, `neg`, `factorial`).
pub fn unary_rule(name: &str) -> Option<UnaryRule> {
    let rule: UnaryRule = match name.to_lowercase().as_str() {
        "identity" => Arc::new(identity),
        "neg" => Arc::new(neg),
        "factorial" => Arc::new(factorial),
        _ => return None,
    };
    Some(rule)
}

/// Looks up a named function rule and its arity (`abs`, `not`, `min`, `max`).
pub fn function_rule(name: &str) -> Option<(usize, FunctionRule)> {
    let entry: (usize, FunctionRule) = match name.to_lowercase().as_str() {
        "abs" => (1, Arc::new(abs)),
        "not" => (1, Arc::new(not)),
        "min" => (2, Arc::new(min)),
        "max" => (2, Arc::new(max)),
        _ => return None,
    };
    Some(entry)
}

// ========================================
// ARITHMETIC
// ========================================

fn add(left: f64, right: f64) -> RuleResult {
    Ok(left + right)
}

fn sub(left: f64, right: f64) -> RuleResult {
    Ok(left - right)
}

fn mul(left: f64, right: f64) -> RuleResult {
    Ok(left * right)
}

/// Division by exactly zero is NaN rather than an infinity.
fn div(left: f64, right: f64) -> RuleResult {
    if right == 0.0 {
        Ok(f64::NAN)
    } else {
        Ok(left / right)
    }
}

/// Remainder with the sign of the dividend; NaN for a zero divisor.
fn rem(left: f64, right: f64) -> RuleResult {
    if right == 0.0 {
        Ok(f64::NAN)
    } else {
        Ok(left % right)
    }
}

fn pow(left: f64, right: f64) -> RuleResult {
    Ok(left.powf(right))
}

fn identity(value: f64) -> RuleResult {
    Ok(value)
}

fn neg(value: f64) -> RuleResult {
    Ok(-value)
}

fn factorial(value: f64) -> RuleResult {
    if value.is_nan() {
        return Ok(f64::NAN);
    }
    if value < 0.0 || (value.is_finite() && value.fract() != 0.0) {
        return Err(ArgumentError::new(format!(
            "factorial is defined only for non-negative integers, got {}",
            value
        )));
    }
    if value > MAX_FINITE_FACTORIAL {
        return Ok(f64::INFINITY);
    }

    let n = value as u32;
    Ok((2..=n).map(f64::from).product())
}

// ========================================
// COMPARISON
// ========================================

fn truth(condition: bool) -> RuleResult {
    Ok(if condition { 1.0 } else { 0.0 })
}

fn eq(left: f64, right: f64) -> RuleResult {
    truth(left == right)
}

fn gt(left: f64, right: f64) -> RuleResult {
    truth(left > right)
}

fn ge(left: f64, right: f64) -> RuleResult {
    truth(left >= right)
}

fn lt(left: f64, right: f64) -> RuleResult {
    truth(left < right)
}

fn le(left: f64, right: f64) -> RuleResult {
    truth(left <= right)
}

// ========================================
// INTEGER RULES
// ========================================

/// Rounds to the nearest integer, ties toward +infinity. Out of range
/// values saturate.
fn to_int(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn integer_op(left: f64, right: f64, op: fn(i32, i32) -> i32) -> RuleResult {
    if left.is_nan() || right.is_nan() {
        return Ok(f64::NAN);
    }
    Ok(f64::from(op(to_int(left), to_int(right))))
}

fn and(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| a & b)
}

fn or(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| a | b)
}

fn xor(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| a ^ b)
}

fn nand(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| !(a & b))
}

fn nor(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| !(a | b))
}

fn shl(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| a.wrapping_shl(b as u32))
}

/// Arithmetic shift; the sign bit is copied in.
fn shr(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| a.wrapping_shr(b as u32))
}

/// Logical shift; zeros are shifted in.
fn ushr(left: f64, right: f64) -> RuleResult {
    integer_op(left, right, |a, b| (a as u32).wrapping_shr(b as u32) as i32)
}

// ========================================
// FUNCTIONS
// ========================================

fn abs(args: &[f64]) -> RuleResult {
    Ok(args[0].abs())
}

/// Bitwise complement of the rounded argument.
fn not(args: &[f64]) -> RuleResult {
    let value = args[0];
    if value.is_nan() {
        return Ok(f64::NAN);
    }
    Ok(f64::from(!to_int(value)))
}

fn min(args: &[f64]) -> RuleResult {
    Ok(args[0].min(args[1]))
}

fn max(args: &[f64]) -> RuleResult {
    Ok(args[0].max(args[1]))
}
