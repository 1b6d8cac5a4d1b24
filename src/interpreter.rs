//! Tree-walking evaluator.
//!
//! Walks the parsed program directly, with a single flat environment and a
//! three-valued control-flow result standing in for `break`/`continue`
//! unwinding. Every runtime fault is fatal; `print` output is written to the
//! caller's sink as each statement executes.

use std::io::Write;

use crate::ast::Program;

mod error;
mod runtime;
mod value;

pub use error::{InterpreterError, RuntimeError};

use runtime::InterpreterRuntime;

pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Execute `program`, writing one line per `print` to `out`.
    pub fn run(&self, program: &Program, out: &mut dyn Write) -> Result<(), InterpreterError> {
        let mut runtime = InterpreterRuntime::new(out);
        runtime.exec_program(program)
    }

    /// Execute `program` and capture its output. Test and benchmark helper.
    pub fn run_to_string(&self, program: &Program) -> Result<String, InterpreterError> {
        let mut buffer = Vec::new();
        self.run(program, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser};
    use indoc::indoc;

    fn parse(source: &str) -> Program {
        let tokens = lexer::tokenize(source).expect("tokenize failed");
        parser::parse_tokens(tokens).expect("parse failed")
    }

    fn run_source(source: &str) -> Result<String, InterpreterError> {
        Interpreter::new().run_to_string(&parse(source))
    }

    fn expect_output(source: &str, expected: &str) {
        assert_eq!(run_source(source).expect("run failed"), expected);
    }

    fn expect_runtime_error(source: &str) -> RuntimeError {
        match run_source(source).expect_err("expected runtime error") {
            InterpreterError::Runtime(error) => error,
            InterpreterError::Io(error) => panic!("unexpected io error: {error}"),
        }
    }

    #[test]
    fn evaluates_arithmetic_with_precedence() {
        expect_output("x = 2\ny = 3\nprint(x + y * 2)\n", "8\n");
    }

    #[test]
    fn floor_division_truncates_toward_zero() {
        expect_output(
            "print(7 // 2)\nprint(-7 // 2)\nprint(7 // -2)\n",
            "3\n-3\n-3\n",
        );
    }

    #[test]
    fn double_negation_is_identity() {
        expect_output("print(-(-5))\nprint(-(-0))\n", "5\n0\n");
    }

    #[test]
    fn errors_on_division_by_zero() {
        assert_eq!(
            expect_runtime_error("print(1 // 0)\n"),
            RuntimeError::DivisionByZero
        );
    }

    #[test]
    fn errors_on_non_integer_arithmetic() {
        let error = expect_runtime_error("print(1 + True)\n");
        assert_eq!(
            error,
            RuntimeError::NonIntegerOperands {
                operation: "Addition"
            }
        );
        assert_eq!(error.to_string(), "Addition requires integer operands");

        assert_eq!(
            expect_runtime_error("print(True < False)\n"),
            RuntimeError::NonIntegerOperands {
                operation: "Comparison"
            }
        );
    }

    #[test]
    fn equality_requires_same_types() {
        expect_output("print(1 == 1)\nprint(True != False)\n", "True\nTrue\n");
        assert_eq!(
            expect_runtime_error("print(1 == True)\n"),
            RuntimeError::MixedTypeEquality
        );
    }

    #[test]
    fn equality_on_lists_is_rejected() {
        let source = indoc! {"
            a = list()
            b = list()
            print(a == b)
        "};
        assert_eq!(expect_runtime_error(source), RuntimeError::ListEquality);
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right operand would divide by zero if it were evaluated.
        let source = indoc! {"
            y = 0
            print(y != 0 and 10 // y == 0)
            print(y == 0 or 10 // y == 0)
        "};
        expect_output(source, "False\nTrue\n");
    }

    #[test]
    fn logical_operators_require_booleans_on_both_sides() {
        assert_eq!(
            expect_runtime_error("print(1 and True)\n"),
            RuntimeError::NonBooleanOperands {
                operation: "Logical AND"
            }
        );
        assert_eq!(
            expect_runtime_error("print(False or 1)\n"),
            RuntimeError::NonBooleanOperands {
                operation: "Logical OR"
            }
        );
    }

    #[test]
    fn errors_on_mistyped_unary_operands() {
        assert_eq!(
            expect_runtime_error("print(-True)\n"),
            RuntimeError::NonIntegerNegation
        );
        assert_eq!(
            expect_runtime_error("print(not 1)\n"),
            RuntimeError::NonBooleanNot
        );
    }

    #[test]
    fn errors_on_undefined_variable() {
        assert_eq!(
            expect_runtime_error("print(x)\n"),
            RuntimeError::UndefinedVariable {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn rebinding_may_change_type() {
        expect_output("x = 1\nx = True\nprint(x)\n", "True\n");
    }

    #[test]
    fn executes_if_elif_else_chain() {
        let source = indoc! {"
            x = 5
            if x > 10:
              print(1)
            elif x > 3:
              print(2)
            else:
              print(3)
        "};
        expect_output(source, "2\n");
    }

    #[test]
    fn conditions_must_be_boolean() {
        assert_eq!(
            expect_runtime_error("if 1:\n\tprint(1)\n"),
            RuntimeError::NonBooleanCondition
        );
        assert_eq!(
            expect_runtime_error("while 1:\n\tbreak\n"),
            RuntimeError::NonBooleanCondition
        );
        let source = indoc! {"
            if False:
              print(1)
            elif 2:
              print(2)
        "};
        assert_eq!(expect_runtime_error(source), RuntimeError::NonBooleanCondition);
    }

    #[test]
    fn while_loop_with_continue_skips_iteration() {
        let source = "i = 0\nwhile i < 5:\n\tif i == 2:\n\t\ti = i + 1\n\t\tcontinue\n\tprint(i)\n\ti = i + 1\n";
        expect_output(source, "0\n1\n3\n4\n");
    }

    #[test]
    fn break_exits_innermost_loop_only() {
        let source = indoc! {"
            i = 0
            while i < 3:
              while True:
                break
              i = i + 1
            print(i)
        "};
        expect_output(source, "3\n");
    }

    #[test]
    fn break_propagates_through_if_blocks() {
        let source = indoc! {"
            i = 0
            while True:
              if i == 2:
                break
              i = i + 1
            print(i)
        "};
        expect_output(source, "2\n");
    }

    #[test]
    fn errors_on_break_or_continue_outside_loop() {
        assert_eq!(
            expect_runtime_error("break\n"),
            RuntimeError::BreakOutsideLoop
        );
        assert_eq!(
            expect_runtime_error("continue\n"),
            RuntimeError::ContinueOutsideLoop
        );
        // Dynamic detection: an if block is not a loop.
        assert_eq!(
            expect_runtime_error("if True:\n\tbreak\n"),
            RuntimeError::BreakOutsideLoop
        );
    }

    #[test]
    fn loop_flag_is_restored_after_nested_loop() {
        let source = indoc! {"
            while True:
              while True:
                break
              break
            break
        "};
        assert_eq!(
            expect_runtime_error(source),
            RuntimeError::BreakOutsideLoop
        );
    }

    #[test]
    fn builds_and_mutates_lists() {
        let source = indoc! {"
            a = list()
            a.append(10)
            a.append(20)
            a.append(30)
            a[1] = 99
            print(a)
            print(a[2])
        "};
        expect_output(source, "[10, 99, 30]\n30\n");
    }

    #[test]
    fn prints_empty_list() {
        expect_output("a = list()\nprint(a)\n", "[]\n");
    }

    #[test]
    fn list_assignment_copies_by_value() {
        let source = indoc! {"
            a = list()
            a.append(1)
            b = a
            b.append(2)
            print(a)
            print(b)
        "};
        expect_output(source, "[1]\n[1, 2]\n");
    }

    #[test]
    fn appended_lists_are_independent_copies() {
        let source = indoc! {"
            a = list()
            b = list()
            b.append(1)
            a.append(b)
            b.append(2)
            print(a)
            print(b)
        "};
        expect_output(source, "[[1]]\n[1, 2]\n");
    }

    #[test]
    fn list_creation_overwrites_existing_binding() {
        expect_output("x = 5\nx = list()\nprint(x)\n", "[]\n");
    }

    #[test]
    fn errors_on_out_of_range_indices() {
        let error = expect_runtime_error("a = list()\nprint(a[0])\n");
        assert_eq!(error, RuntimeError::IndexOutOfRange { index: 0, len: 0 });
        assert_eq!(
            error.to_string(),
            "List index out of range (index: 0, size: 0)"
        );

        let source = indoc! {"
            a = list()
            a.append(1)
            print(a[-1])
        "};
        assert_eq!(
            expect_runtime_error(source),
            RuntimeError::IndexOutOfRange { index: -1, len: 1 }
        );
    }

    #[test]
    fn errors_on_non_integer_index() {
        let source = indoc! {"
            a = list()
            a.append(1)
            print(a[True])
        "};
        assert_eq!(expect_runtime_error(source), RuntimeError::NonIntegerIndex);
    }

    #[test]
    fn list_operations_require_a_list_binding() {
        assert_eq!(
            expect_runtime_error("x = 5\nx[0] = 1\n"),
            RuntimeError::NotAList {
                name: "x".to_string()
            }
        );
        assert_eq!(
            expect_runtime_error("x = 5\nx.append(1)\n"),
            RuntimeError::NotAList {
                name: "x".to_string()
            }
        );
        assert_eq!(
            expect_runtime_error("a.append(1)\n"),
            RuntimeError::UndefinedVariable {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn output_before_a_runtime_error_is_still_written() {
        let program = parse("print(1)\nprint(1 // 0)\n");
        let mut buffer = Vec::new();
        let result = Interpreter::new().run(&program, &mut buffer);
        assert!(matches!(
            result,
            Err(InterpreterError::Runtime(RuntimeError::DivisionByZero))
        ));
        assert_eq!(String::from_utf8_lossy(&buffer), "1\n");
    }
}
