//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for calculator integration tests.

#![allow(dead_code)]

use calc_engine::{CalcError, Calculator};

/// Installs env_logger once per test binary. Set RUST_LOG=trace to see
/// every token and parsed tree.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Test harness wrapping a calculator over the standard table.
pub struct TestHarness {
    pub calculator: Calculator,
}

impl TestHarness {
    pub fn new() -> Self {
        init_logging();
        TestHarness {
            calculator: Calculator::standard().expect("standard table builds"),
        }
    }

    pub fn with_calculator(calculator: Calculator) -> Self {
        init_logging();
        TestHarness { calculator }
    }

    pub fn calc(&self, input: &str) -> Result<f64, CalcError> {
        self.calculator.calculate(input)
    }

    /// Evaluates `input` and asserts the result.
    pub fn assert_value(&self, input: &str, expected: f64) {
        match self.calc(input) {
            Ok(value) => assert_eq!(value, expected, "{} evaluated to {}", input, value),
            Err(err) => panic!("{} failed: {}", input, err),
        }
    }

    pub fn assert_nan(&self, input: &str) {
        match self.calc(input) {
            Ok(value) => assert!(value.is_nan(), "{} evaluated to {}", input, value),
            Err(err) => panic!("{} failed: {}", input, err),
        }
    }
}
