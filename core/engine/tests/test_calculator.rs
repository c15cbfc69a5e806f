//! FILENAME: tests/test_calculator.rs
//! Integration tests for text to number evaluation with the standard table.

mod common;

use calc_engine::{calculate, standard_registry, CalcError, Calculator, EvalError};
use calc_parser::{BinaryOperator, Function, ParseError, ParserOptions, RegistryError};
use common::TestHarness;

// ============================================================================
// PRECEDENCE AND ASSOCIATIVITY
// ============================================================================

#[test]
fn test_left_associative_subtraction() {
    TestHarness::new().assert_value("10-3-2", 5.0);
}

#[test]
fn test_right_associative_power() {
    let harness = TestHarness::new();
    harness.assert_value("2^3^2", 512.0);
    harness.assert_value("2 pow 3 pow 2", 512.0);
}

#[test]
fn test_parentheses() {
    let harness = TestHarness::new();
    harness.assert_value("(2+3)*4", 20.0);
    harness.assert_value("2+3*4", 14.0);
    harness.assert_value("((((7))))", 7.0);
}

#[test]
fn test_prefix_and_postfix_binding() {
    let harness = TestHarness::new();
    harness.assert_value("-2^2", 4.0);
    harness.assert_value("-3!", -6.0);
    harness.assert_value("3!!", 720.0);
    harness.assert_value("+5 - -5", 10.0);
    harness.assert_value("2^-1", 0.5);
}

#[test]
fn test_comparison_has_lowest_precedence() {
    let harness = TestHarness::new();
    harness.assert_value("1 + 1 == 2", 1.0);
    harness.assert_value("3 > 2", 1.0);
    harness.assert_value("3 < 2", 0.0);
    harness.assert_value("2 >= 3", 0.0);
    harness.assert_value("2 <= 2", 1.0);
    harness.assert_value("1 + 1 == 2 and 3", 1.0);
}

// ============================================================================
// FUNCTIONS AND WORD ALIASES
// ============================================================================

#[test]
fn test_functions() {
    let harness = TestHarness::new();
    harness.assert_value("max(10,5)+abs(-10)", 20.0);
    harness.assert_value("min(-5, 10)", -5.0);
    harness.assert_value("not(5)", -6.0);
    harness.assert_value("max(min(1, 2), abs(-3))", 3.0);
}

#[test]
fn test_word_aliases_ignore_case() {
    let harness = TestHarness::new();
    harness.assert_value("2 PLUS 3 Times 4", 14.0);
    harness.assert_value("7 mod 4", 3.0);
    harness.assert_value("7 rem 4", 3.0);
    harness.assert_value("9 div 3", 3.0);
    harness.assert_value("3 mul 4", 12.0);
    harness.assert_value("2x3", 6.0);
    harness.assert_value("10 minus 4", 6.0);
    harness.assert_value("ABS(-3)", 3.0);
}

#[test]
fn test_demo_expression() {
    TestHarness::new().assert_value(
        "max(10, 5) + abs(-10) + min(-5, 10) times 5 + 3 - 7 + (6 / 2 + (5 minus 2)) % 3 and 5 > 1",
        1.0,
    );
}

// ============================================================================
// NUMBER LITERALS
// ============================================================================

#[test]
fn test_grouping_separators() {
    let harness = TestHarness::new();
    harness.assert_value("1,000 + 1", 1001.0);
    harness.assert_value("1_000 * 2", 2000.0);
    harness.assert_value("max(1,000, 5)", 1000.0);
    harness.assert_value("2.5 * 2", 5.0);
}

// ============================================================================
// INTEGER RULES
// ============================================================================

#[test]
fn test_bitwise_operators() {
    let harness = TestHarness::new();
    harness.assert_value("6 and 3", 2.0);
    harness.assert_value("6 or 3", 7.0);
    harness.assert_value("6 xor 3", 5.0);
    harness.assert_value("6 nand 3", -3.0);
    harness.assert_value("6 nor 3", -8.0);
    // 2.5 rounds up to 3
    harness.assert_value("2.5 and 3", 3.0);
}

#[test]
fn test_shift_operators() {
    let harness = TestHarness::new();
    harness.assert_value("1 << 4", 16.0);
    harness.assert_value("-16 >> 2", -4.0);
    harness.assert_value("-1 >>> 28", 15.0);
    harness.assert_value("8 >>> 1", 4.0);
    harness.assert_value("1 + 1 << 2", 8.0);
}

#[test]
fn test_factorial() {
    let harness = TestHarness::new();
    harness.assert_value("0!", 1.0);
    harness.assert_value("5!", 120.0);
    harness.assert_value("171!", f64::INFINITY);
}

#[test]
fn test_factorial_domain_errors() {
    let harness = TestHarness::new();

    match harness.calc("(-1)!") {
        Err(CalcError::Eval(EvalError::InvalidArgument { identifier, .. })) => {
            assert_eq!(identifier, "!");
        }
        other => panic!("Expected InvalidArgument, got {:?}", other),
    }
    assert!(matches!(
        harness.calc("2.5!"),
        Err(CalcError::Eval(EvalError::InvalidArgument { .. }))
    ));
}

// ============================================================================
// NaN PROPAGATION
// ============================================================================

#[test]
fn test_division_by_zero_is_nan() {
    let harness = TestHarness::new();
    harness.assert_nan("10/0");
    harness.assert_nan("10/0+5");
    harness.assert_nan("10 % 0");
    harness.assert_nan("abs(1/0)");
}

#[test]
fn test_nan_flows_through_integer_rules() {
    let harness = TestHarness::new();
    harness.assert_nan("(1/0) and 1");
    harness.assert_nan("(1/0) >>> 1");
    harness.assert_nan("not(1/0)");
    harness.assert_nan("(1/0)!");
    // Comparisons against NaN are false
    harness.assert_value("1/0 == 1/0", 0.0);
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_arity_mismatch() {
    let harness = TestHarness::new();
    match harness.calc("abs(1,2)") {
        Err(CalcError::Parse(ParseError::ArityMismatch {
            name,
            expected,
            actual,
            ..
        })) => {
            assert_eq!(name, "abs");
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("Expected ArityMismatch, got {:?}", other),
    }
}

#[test]
fn test_parenthesis_errors() {
    let harness = TestHarness::new();
    assert!(matches!(
        harness.calc("(1+2"),
        Err(CalcError::Parse(ParseError::UnmatchedParenthesis { .. }))
    ));
    assert!(matches!(
        harness.calc("1+2)"),
        Err(CalcError::Parse(ParseError::UnexpectedTrailingInput { .. }))
    ));
}

#[test]
fn test_errors_render_a_marker() {
    let harness = TestHarness::new();

    let err = harness.calc("2 + $").unwrap_err();
    assert!(err.to_string().ends_with("2 + $\n    ^"), "{}", err);

    let err = harness.calc("2 * foo(1)").unwrap_err();
    assert!(err.to_string().contains("'foo' at 4:7"), "{}", err);
    assert!(err.to_string().ends_with("2 * foo(1)\n    ~~~"), "{}", err);
}

#[test]
fn test_nesting_bound() {
    let depth = 300;
    let input = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

    let harness = TestHarness::new();
    assert!(matches!(
        harness.calc(&input),
        Err(CalcError::Parse(ParseError::NestingTooDeep { .. }))
    ));

    let relaxed = Calculator::standard()
        .unwrap()
        .with_options(ParserOptions { max_depth: 1024 });
    assert_eq!(relaxed.calculate(&input), Ok(1.0));
}

#[test]
fn test_long_left_associative_chain() {
    let input = vec!["1"; 200].join(" + ");
    TestHarness::new().assert_value(&input, 200.0);
}

#[test]
fn test_overlong_chains_fail_cleanly() {
    let harness = TestHarness::new();

    let sum = vec!["1"; 20_000].join("+");
    assert!(matches!(
        harness.calc(&sum),
        Err(CalcError::Parse(ParseError::NestingTooDeep { .. }))
    ));

    let factorials = format!("0{}", "!".repeat(200_000));
    assert!(matches!(
        harness.calculator.parse(&factorials),
        Err(ParseError::NestingTooDeep { .. })
    ));
    assert!(harness.calc(&factorials).is_err());
}

#[test]
fn test_raised_limit_allows_longer_chains() {
    let calculator = Calculator::standard()
        .unwrap()
        .with_options(ParserOptions { max_depth: 1024 });
    let input = vec!["1"; 1000].join("+");
    assert_eq!(calculator.calculate(&input), Ok(1000.0));
}

// ============================================================================
// REGISTRY BEHAVIOR
// ============================================================================

#[test]
fn test_duplicate_registration_leaves_calculator_unchanged() {
    let mut calculator = Calculator::standard().unwrap();
    let before = calculator.registry().identifiers().to_vec();

    let err = calculator
        .registry_mut()
        .add_binary_operator(BinaryOperator::new(["+"], 9, |l, r| l * r))
        .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateIdentifier { .. }));
    assert_eq!(calculator.registry().identifiers(), before.as_slice());
    assert_eq!(calculator.calculate("2 + 3"), Ok(5.0));
}

#[test]
fn test_custom_definitions() {
    let mut calculator = Calculator::standard().unwrap();
    calculator
        .registry_mut()
        .add_binary_operator(BinaryOperator::new(["<>"], 0, |l, r| {
            if l != r {
                1.0
            } else {
                0.0
            }
        }))
        .unwrap();
    calculator
        .registry_mut()
        .add_function(Function::new("hypot", 2, |args| args[0].hypot(args[1])))
        .unwrap();

    let harness = TestHarness::with_calculator(calculator);
    harness.assert_value("1 <> 2", 1.0);
    harness.assert_value("hypot(3, 4)", 5.0);
    // '<' and '>' still lex on their own
    harness.assert_value("1 < 2", 1.0);
}

#[test]
fn test_evaluation_is_idempotent() {
    let harness = TestHarness::new();
    let input = "max(10, 5) * 3! - 2 ^ 3 ^ 2 / 7";
    let first = harness.calc(input).unwrap();
    let second = harness.calc(input).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn test_registry_is_shared_across_threads() {
    common::init_logging();
    let registry = standard_registry().unwrap();
    let registry = &registry;
    let inputs = ["10-3-2", "2^3^2", "(2+3)*4", "3!!"];
    let expected = [5.0, 512.0, 20.0, 720.0];

    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| scope.spawn(move || calculate(input, registry)))
            .collect();

        for (handle, expected) in handles.into_iter().zip(expected) {
            assert_eq!(handle.join().unwrap(), Ok(expected));
        }
    });
}

#[test]
fn test_parse_then_evaluate() {
    let harness = TestHarness::new();
    let expr = harness.calculator.parse("2 * (3 + 4)").unwrap();
    assert_eq!(expr.to_string(), "(2 * (3 + 4))");
    assert_eq!(harness.calculator.evaluate(&expr), Ok(14.0));
}
