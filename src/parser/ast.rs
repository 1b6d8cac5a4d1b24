//! Syntax tree built by the parser and walked by the interpreter.
//!
//! Each node exclusively owns its children; the tree is never mutated after
//! construction. `Display` renders the canonical source form (compound
//! expressions fully parenthesized, one tab per block level), which re-parses
//! to a structurally equal tree.

use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(i64),
    Boolean(bool),
    Identifier(String),
    ListAccess {
        name: String,
        index: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "//",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ElifClause {
    pub condition: Expression,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Assign {
        name: String,
        value: Expression,
    },
    ListAssign {
        name: String,
        index: Expression,
        value: Expression,
    },
    ListCreate {
        name: String,
    },
    ListAppend {
        name: String,
        value: Expression,
    },
    Print(Expression),
    Break,
    Continue,
    If {
        condition: Expression,
        then_block: Block,
        elif_clauses: Vec<ElifClause>,
        else_block: Option<Block>,
    },
    While {
        condition: Expression,
        body: Block,
    },
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "{value}"),
            Expression::Boolean(true) => write!(f, "True"),
            Expression::Boolean(false) => write!(f, "False"),
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::ListAccess { name, index } => write!(f, "{name}[{index}]"),
            Expression::UnaryOp { op, operand } => match op {
                UnaryOperator::Negate => write!(f, "(-{operand})"),
                UnaryOperator::Not => write!(f, "(not {operand})"),
            },
            Expression::BinaryOp { left, op, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
        }
    }
}

impl Statement {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        let pad = "\t".repeat(level);
        match self {
            Statement::Assign { name, value } => writeln!(f, "{pad}{name} = {value}"),
            Statement::ListAssign { name, index, value } => {
                writeln!(f, "{pad}{name}[{index}] = {value}")
            }
            Statement::ListCreate { name } => writeln!(f, "{pad}{name} = list()"),
            Statement::ListAppend { name, value } => writeln!(f, "{pad}{name}.append({value})"),
            Statement::Print(expression) => writeln!(f, "{pad}print({expression})"),
            Statement::Break => writeln!(f, "{pad}break"),
            Statement::Continue => writeln!(f, "{pad}continue"),
            Statement::If {
                condition,
                then_block,
                elif_clauses,
                else_block,
            } => {
                writeln!(f, "{pad}if {condition}:")?;
                then_block.write_indented(f, level + 1)?;
                for clause in elif_clauses {
                    writeln!(f, "{pad}elif {}:", clause.condition)?;
                    clause.body.write_indented(f, level + 1)?;
                }
                if let Some(else_block) = else_block {
                    writeln!(f, "{pad}else:")?;
                    else_block.write_indented(f, level + 1)?;
                }
                Ok(())
            }
            Statement::While { condition, body } => {
                writeln!(f, "{pad}while {condition}:")?;
                body.write_indented(f, level + 1)
            }
        }
    }
}

impl Block {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        for statement in &self.statements {
            statement.write_indented(f, level)?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            statement.write_indented(f, 0)?;
        }
        Ok(())
    }
}
