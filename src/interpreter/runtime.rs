use std::collections::HashMap;
use std::io::Write;

use crate::ast::{BinaryOperator, Block, Expression, Program, Statement, UnaryOperator};

use super::error::{InterpreterError, RuntimeError};
use super::value::Value;

/// Control-flow result of statement execution.
///
/// `Break` and `Continue` travel upward through blocks and `if` arms until
/// the innermost `while` consumes them; they never unwind the Rust stack.
pub(super) enum Flow {
    Normal,
    Break,
    Continue,
}

/// Single flat name-to-value mapping. There are no nested scopes: control
/// structures share the enclosing environment, and a variable exists from its
/// first assignment onward.
pub(super) struct Environment {
    variables: HashMap<String, Value>,
}

impl Environment {
    fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    fn load(&self, name: &str) -> Result<Value, RuntimeError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    fn store(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    fn list(&self, name: &str) -> Result<&[Value], RuntimeError> {
        match self.variables.get(name) {
            None => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
            }),
            Some(Value::List(elements)) => Ok(elements),
            Some(_) => Err(RuntimeError::NotAList {
                name: name.to_string(),
            }),
        }
    }

    fn list_mut(&mut self, name: &str) -> Result<&mut Vec<Value>, RuntimeError> {
        match self.variables.get_mut(name) {
            None => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
            }),
            Some(Value::List(elements)) => Ok(elements),
            Some(_) => Err(RuntimeError::NotAList {
                name: name.to_string(),
            }),
        }
    }
}

/// Statement and expression walker.
///
/// `in_loop` tracks the dynamic extent of a `while` body so that `break` and
/// `continue` can be rejected at the statement itself when no loop encloses
/// them.
pub(super) struct InterpreterRuntime<'a> {
    environment: Environment,
    in_loop: bool,
    out: &'a mut dyn Write,
}

impl<'a> InterpreterRuntime<'a> {
    pub(super) fn new(out: &'a mut dyn Write) -> Self {
        Self {
            environment: Environment::new(),
            in_loop: false,
            out,
        }
    }

    pub(super) fn exec_program(&mut self, program: &Program) -> Result<(), InterpreterError> {
        for statement in &program.statements {
            // Break/Continue cannot surface here: outside a loop they fail
            // at their own statement.
            self.exec_statement(statement)?;
        }
        Ok(())
    }

    fn exec_block(&mut self, block: &Block) -> Result<Flow, InterpreterError> {
        for statement in &block.statements {
            match self.exec_statement(statement)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_statement(&mut self, statement: &Statement) -> Result<Flow, InterpreterError> {
        match statement {
            Statement::Assign { name, value } => {
                let value = self.eval_expression(value)?;
                self.environment.store(name, value);
                Ok(Flow::Normal)
            }
            Statement::ListCreate { name } => {
                self.environment.store(name, Value::List(Vec::new()));
                Ok(Flow::Normal)
            }
            Statement::ListAssign { name, index, value } => {
                let index = self.eval_list_index(name, index)?;
                let value = self.eval_expression(value)?;
                self.environment.list_mut(name)?[index] = value;
                Ok(Flow::Normal)
            }
            Statement::ListAppend { name, value } => {
                // The target must already be a list before the value runs.
                self.environment.list(name)?;
                let value = self.eval_expression(value)?;
                self.environment.list_mut(name)?.push(value);
                Ok(Flow::Normal)
            }
            Statement::Print(expression) => {
                let value = self.eval_expression(expression)?;
                writeln!(self.out, "{value}")?;
                Ok(Flow::Normal)
            }
            Statement::Break => {
                if !self.in_loop {
                    return Err(RuntimeError::BreakOutsideLoop.into());
                }
                Ok(Flow::Break)
            }
            Statement::Continue => {
                if !self.in_loop {
                    return Err(RuntimeError::ContinueOutsideLoop.into());
                }
                Ok(Flow::Continue)
            }
            Statement::If {
                condition,
                then_block,
                elif_clauses,
                else_block,
            } => {
                if self.eval_condition(condition)? {
                    return self.exec_block(then_block);
                }
                for clause in elif_clauses {
                    if self.eval_condition(&clause.condition)? {
                        return self.exec_block(&clause.body);
                    }
                }
                if let Some(else_block) = else_block {
                    return self.exec_block(else_block);
                }
                Ok(Flow::Normal)
            }
            Statement::While { condition, body } => {
                let was_in_loop = std::mem::replace(&mut self.in_loop, true);
                let outcome = self.exec_while(condition, body);
                self.in_loop = was_in_loop;
                outcome?;
                Ok(Flow::Normal)
            }
        }
    }

    fn exec_while(&mut self, condition: &Expression, body: &Block) -> Result<(), InterpreterError> {
        loop {
            if !self.eval_condition(condition)? {
                return Ok(());
            }
            match self.exec_block(body)? {
                Flow::Normal | Flow::Continue => {}
                Flow::Break => return Ok(()),
            }
        }
    }

    /// `if`/`elif`/`while` conditions must be boolean; there is no implicit
    /// conversion from other types.
    fn eval_condition(&mut self, condition: &Expression) -> Result<bool, RuntimeError> {
        match self.eval_expression(condition)? {
            Value::Boolean(value) => Ok(value),
            _ => Err(RuntimeError::NonBooleanCondition),
        }
    }

    fn eval_expression(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        match expression {
            Expression::Number(value) => Ok(Value::Integer(*value)),
            Expression::Boolean(value) => Ok(Value::Boolean(*value)),
            Expression::Identifier(name) => self.environment.load(name),
            Expression::ListAccess { name, index } => {
                let index = self.eval_list_index(name, index)?;
                Ok(self.environment.list(name)?[index].clone())
            }
            Expression::UnaryOp { op, operand } => {
                let operand = self.eval_expression(operand)?;
                match op {
                    UnaryOperator::Negate => match operand {
                        Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
                        _ => Err(RuntimeError::NonIntegerNegation),
                    },
                    UnaryOperator::Not => match operand {
                        Value::Boolean(value) => Ok(Value::Boolean(!value)),
                        _ => Err(RuntimeError::NonBooleanNot),
                    },
                }
            }
            Expression::BinaryOp { left, op, right } => match op {
                BinaryOperator::And => {
                    if !self.eval_logical_operand(left, "Logical AND")? {
                        return Ok(Value::Boolean(false));
                    }
                    let right = self.eval_logical_operand(right, "Logical AND")?;
                    Ok(Value::Boolean(right))
                }
                BinaryOperator::Or => {
                    if self.eval_logical_operand(left, "Logical OR")? {
                        return Ok(Value::Boolean(true));
                    }
                    let right = self.eval_logical_operand(right, "Logical OR")?;
                    Ok(Value::Boolean(right))
                }
                _ => {
                    let left = self.eval_expression(left)?;
                    let right = self.eval_expression(right)?;
                    apply_binary(*op, left, right)
                }
            },
        }
    }

    fn eval_logical_operand(
        &mut self,
        operand: &Expression,
        operation: &'static str,
    ) -> Result<bool, RuntimeError> {
        match self.eval_expression(operand)? {
            Value::Boolean(value) => Ok(value),
            _ => Err(RuntimeError::NonBooleanOperands { operation }),
        }
    }

    /// Resolve `name` as a list, evaluate the index expression, and
    /// bounds-check it. Shared by element reads and element writes.
    fn eval_list_index(
        &mut self,
        name: &str,
        index: &Expression,
    ) -> Result<usize, RuntimeError> {
        let len = self.environment.list(name)?.len();
        let index = match self.eval_expression(index)? {
            Value::Integer(value) => value,
            _ => return Err(RuntimeError::NonIntegerIndex),
        };
        if index < 0 || index as usize >= len {
            return Err(RuntimeError::IndexOutOfRange { index, len });
        }
        Ok(index as usize)
    }
}

fn apply_binary(op: BinaryOperator, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOperator::Add => {
            let (left, right) = integer_operands("Addition", left, right)?;
            Ok(Value::Integer(left.wrapping_add(right)))
        }
        BinaryOperator::Subtract => {
            let (left, right) = integer_operands("Subtraction", left, right)?;
            Ok(Value::Integer(left.wrapping_sub(right)))
        }
        BinaryOperator::Multiply => {
            let (left, right) = integer_operands("Multiplication", left, right)?;
            Ok(Value::Integer(left.wrapping_mul(right)))
        }
        BinaryOperator::Divide => {
            let (left, right) = integer_operands("Division", left, right)?;
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            // Native i64 division: truncation toward zero, wrapping on the
            // single i64::MIN / -1 overflow case.
            Ok(Value::Integer(left.wrapping_div(right)))
        }
        BinaryOperator::Less => {
            let (left, right) = integer_operands("Comparison", left, right)?;
            Ok(Value::Boolean(left < right))
        }
        BinaryOperator::LessEqual => {
            let (left, right) = integer_operands("Comparison", left, right)?;
            Ok(Value::Boolean(left <= right))
        }
        BinaryOperator::Greater => {
            let (left, right) = integer_operands("Comparison", left, right)?;
            Ok(Value::Boolean(left > right))
        }
        BinaryOperator::GreaterEqual => {
            let (left, right) = integer_operands("Comparison", left, right)?;
            Ok(Value::Boolean(left >= right))
        }
        BinaryOperator::Equal => equality(left, right).map(Value::Boolean),
        BinaryOperator::NotEqual => equality(left, right).map(|equal| Value::Boolean(!equal)),
        BinaryOperator::And | BinaryOperator::Or => {
            unreachable!("short-circuit operators are evaluated in eval_expression")
        }
    }
}

fn integer_operands(
    operation: &'static str,
    left: Value,
    right: Value,
) -> Result<(i64, i64), RuntimeError> {
    match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => Ok((left, right)),
        _ => Err(RuntimeError::NonIntegerOperands { operation }),
    }
}

/// Equality is only defined between two integers or two booleans.
fn equality(left: Value, right: Value) -> Result<bool, RuntimeError> {
    match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => Ok(left == right),
        (Value::Boolean(left), Value::Boolean(right)) => Ok(left == right),
        (left, right) if left.is_list() && right.is_list() => Err(RuntimeError::ListEquality),
        _ => Err(RuntimeError::MixedTypeEquality),
    }
}
