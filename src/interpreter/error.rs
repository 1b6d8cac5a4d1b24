use std::io;

use thiserror::Error;

/// Typed runtime faults. Every variant is fatal: the evaluator aborts the
/// program at the first one and the driver prints it behind `Error: `.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Variable '{name}' is not a list")]
    NotAList { name: String },
    #[error("List index must be an integer")]
    NonIntegerIndex,
    #[error("List index out of range (index: {index}, size: {len})")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("{operation} requires integer operands")]
    NonIntegerOperands { operation: &'static str },
    #[error("{operation} requires boolean operands")]
    NonBooleanOperands { operation: &'static str },
    #[error("Unary minus requires integer operand")]
    NonIntegerNegation,
    #[error("Logical not requires boolean operand")]
    NonBooleanNot,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Equality comparison requires same types")]
    MixedTypeEquality,
    #[error("Cannot compare lists")]
    ListEquality,
    #[error("Condition must be a boolean")]
    NonBooleanCondition,
    #[error("'break' outside loop")]
    BreakOutsideLoop,
    #[error("'continue' outside loop")]
    ContinueOutsideLoop,
}

#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("{0}")]
    Io(#[from] io::Error),
}
