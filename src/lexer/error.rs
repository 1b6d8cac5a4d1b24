use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Numbers cannot start with 0 unless they are just 0")]
    LeadingZero { line: usize, column: usize },
    #[error("Invalid integer literal '{literal}' at line {line}, column {column}")]
    InvalidIntegerLiteral {
        literal: String,
        line: usize,
        column: usize,
    },
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unknown operator '{character}' at line {line}, column {column}")]
    UnknownOperator {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Inconsistent use of tabs and spaces in indentation at line {line}")]
    MixedIndentation { line: usize },
    #[error("Unindent does not match any outer indentation level at line {line}")]
    InvalidDedent { line: usize },
    #[error("Lexer invariant violated: {message}")]
    InvariantViolation { message: &'static str },
}

pub type LexResult<T> = Result<T, LexError>;
