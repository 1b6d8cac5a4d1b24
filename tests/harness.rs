use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, ensure};

use minipy::fixtures::{self, CaseClass};
use minipy::interpreter::Interpreter;
use minipy::{lexer, parser};

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim_end().to_string()
}

#[test]
fn runs_fixture_programs() -> Result<()> {
    let cases = fixtures::load_cases(Path::new("tests/programs"))?;

    for case in cases {
        let source = fs::read_to_string(&case.program_path)
            .with_context(|| format!("Reading {}", case.name))?;
        let tokenized = lexer::tokenize(&source);
        match case.spec.class {
            CaseClass::RuntimeSuccess => {
                ensure!(
                    case.spec.expected.exit_code == 0,
                    "Case {} expected exit code must be 0 for runtime_success",
                    case.name
                );
                let stdout_file = case
                    .spec
                    .expected
                    .stdout_file
                    .as_deref()
                    .with_context(|| format!("Missing stdout_file in {}", case.name))?;
                let expected = case.read_text(stdout_file)?;
                let tokens = tokenized.with_context(|| format!("Tokenizing {}", case.name))?;
                let program = parser::parse_tokens(tokens)
                    .with_context(|| format!("Parsing {}", case.name))?;
                let output = Interpreter::new()
                    .run_to_string(&program)
                    .with_context(|| format!("Running {}", case.name))?;
                assert_eq!(
                    normalize_output(&output),
                    normalize_output(&expected),
                    "Output mismatch for {}",
                    case.name
                );
            }
            CaseClass::FrontendError => {
                ensure!(
                    case.spec.expected.exit_code == 1,
                    "Case {} expected exit code must be 1 for frontend_error",
                    case.name
                );
                let expected_file = case
                    .spec
                    .expected
                    .stderr_contains_file
                    .as_deref()
                    .with_context(|| format!("Missing stderr expectation file in {}", case.name))?;
                let expected_error = case.read_text(expected_file)?;
                let expected_error = expected_error.trim();
                match tokenized {
                    Err(error) => {
                        let actual = error.to_string();
                        ensure!(
                            actual.contains(expected_error),
                            "Expected frontend error containing '{expected_error}' in {}, got '{actual}'",
                            case.name
                        );
                    }
                    Ok(tokens) => {
                        let parse_result = parser::parse_tokens(tokens);
                        ensure!(
                            parse_result.is_err(),
                            "Expected frontend error in {}, but parsing succeeded",
                            case.name
                        );
                        let actual = parse_result
                            .expect_err("parse_result checked as err")
                            .to_string();
                        ensure!(
                            actual.contains(expected_error),
                            "Expected frontend error containing '{expected_error}' in {}, got '{actual}'",
                            case.name
                        );
                    }
                }
            }
            CaseClass::RuntimeError => {
                ensure!(
                    case.spec.expected.exit_code == 1,
                    "Case {} expected exit code must be 1 for runtime_error",
                    case.name
                );
                let expected_file = case
                    .spec
                    .expected
                    .stderr_contains_file
                    .as_deref()
                    .with_context(|| format!("Missing stderr expectation file in {}", case.name))?;
                let expected_error = case.read_text(expected_file)?;
                let expected_error = expected_error.trim();
                let tokens = tokenized.with_context(|| format!("Tokenizing {}", case.name))?;
                let program = parser::parse_tokens(tokens)
                    .with_context(|| format!("Parsing {}", case.name))?;
                let result = Interpreter::new().run_to_string(&program);
                ensure!(
                    result.is_err(),
                    "Expected runtime error in {}",
                    case.name
                );
                let actual = result.expect_err("result checked as err").to_string();
                ensure!(
                    actual.contains(expected_error),
                    "Expected runtime error containing '{expected_error}' in {}, got '{actual}'",
                    case.name
                );
            }
        }
    }

    Ok(())
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_minipy"))
        .args(args)
        .output()
        .expect("failed to spawn interpreter binary")
}

#[test]
fn cli_prints_usage_without_arguments() {
    let output = run_cli(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"));
    assert!(stderr.contains("<source_file>"));
    assert!(output.stdout.is_empty());
}

#[test]
fn cli_runs_a_program_from_file() {
    let output = run_cli(&["tests/programs/arithmetic_precedence/program.src"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "8\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn cli_reports_runtime_errors_with_prefix_and_exit_code() {
    let output = run_cli(&["tests/programs/division_by_zero/program.src"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "Error: Division by zero\n"
    );
}

#[test]
fn cli_reports_missing_files() {
    let output = run_cli(&["no/such/file.src"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "Error: Cannot open file no/such/file.src\n"
    );
}
