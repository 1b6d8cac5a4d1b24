//! Recursive-descent parser over the lexer's token stream.
//!
//! One token of look-ahead everywhere, plus two tokens after an identifier to
//! tell the assignment forms apart. Fails fast: the first unexpected token
//! aborts the parse with a positioned message.

pub mod ast;

use anyhow::Result;

use crate::lexer::{Span, Token, TokenKind};
use ast::{BinaryOperator, Block, ElifClause, Expression, Program, Statement, UnaryOperator};

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    current: Token<'a>,
}

fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::EndMarker, Span::default()));
        }
        let current = tokens[0];
        Self {
            tokens,
            pos: 0,
            current,
        }
    }

    pub fn parse_program(mut self) -> Result<Program> {
        let mut statements = Vec::new();
        self.parse_stmts(&mut statements)?;

        // Skip trailing structure before the end marker.
        while matches!(self.current.kind, TokenKind::Dedent | TokenKind::Newline) {
            self.advance();
        }
        if !matches!(self.current.kind, TokenKind::EndMarker) {
            return Err(self.error("end of program"));
        }

        Ok(Program { statements })
    }

    fn parse_stmts(&mut self, statements: &mut Vec<Statement>) -> Result<()> {
        loop {
            while matches!(self.current.kind, TokenKind::Newline) {
                self.advance();
            }
            if matches!(
                self.current.kind,
                TokenKind::Dedent | TokenKind::EndMarker
            ) {
                return Ok(());
            }
            statements.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current.kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            _ => self.parse_simple_statement(),
        }
    }

    /// Simple statements are dispatched on the leading token; an identifier
    /// needs a look at the one or two tokens after it.
    fn parse_simple_statement(&mut self) -> Result<Statement> {
        match self.current.kind {
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Newline, "newline")?;
                Ok(Statement::Break)
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Newline, "newline")?;
                Ok(Statement::Continue)
            }
            TokenKind::Print => self.parse_print(),
            TokenKind::Identifier(_) => match self.peek_kind(1) {
                TokenKind::Assign => {
                    if matches!(self.peek_kind(2), TokenKind::List) {
                        self.parse_list_creation()
                    } else {
                        self.parse_assignment()
                    }
                }
                TokenKind::LBracket => self.parse_list_assignment(),
                TokenKind::Dot => self.parse_list_append(),
                _ => Err(self.statement_error()),
            },
            _ => Err(self.statement_error()),
        }
    }

    fn parse_assignment(&mut self) -> Result<Statement> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Newline, "newline")?;
        Ok(Statement::Assign { name, value })
    }

    fn parse_list_assignment(&mut self) -> Result<Statement> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LBracket, "'['")?;
        let index = self.parse_expression()?;
        self.expect(TokenKind::RBracket, "']'")?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Newline, "newline")?;
        Ok(Statement::ListAssign { name, index, value })
    }

    // The whole form is fixed: `id = list ( ) NEWLINE`.
    fn parse_list_creation(&mut self) -> Result<Statement> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Assign, "'='")?;
        self.expect(TokenKind::List, "'list'")?;
        self.expect(TokenKind::LParen, "'('")?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Newline, "newline")?;
        Ok(Statement::ListCreate { name })
    }

    fn parse_list_append(&mut self) -> Result<Statement> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Dot, "'.'")?;
        self.expect(TokenKind::Append, "'append'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Newline, "newline")?;
        Ok(Statement::ListAppend { name, value })
    }

    fn parse_print(&mut self) -> Result<Statement> {
        self.expect(TokenKind::Print, "'print'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let expression = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Newline, "newline")?;
        Ok(Statement::Print(expression))
    }

    fn parse_if(&mut self) -> Result<Statement> {
        self.expect(TokenKind::If, "'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let then_block = self.parse_block()?;

        let mut elif_clauses = Vec::new();
        while matches!(self.current.kind, TokenKind::Elif) {
            self.advance();
            let condition = self.parse_expression()?;
            self.expect(TokenKind::Colon, "':'")?;
            let body = self.parse_block()?;
            elif_clauses.push(ElifClause { condition, body });
        }

        let mut else_block = None;
        if matches!(self.current.kind, TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::Colon, "':'")?;
            else_block = Some(self.parse_block()?);
        }

        Ok(Statement::If {
            condition,
            then_block,
            elif_clauses,
            else_block,
        })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        self.expect(TokenKind::While, "'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block()?;
        Ok(Statement::While { condition, body })
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.expect(TokenKind::Newline, "newline before block")?;
        self.expect(TokenKind::Indent, "indentation")?;
        let mut statements = Vec::new();
        self.parse_stmts(&mut statements)?;
        self.expect(TokenKind::Dedent, "dedent to close block")?;
        Ok(Block { statements })
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        let mut expr = self.parse_and()?;
        while matches!(self.current.kind, TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            expr = binary(expr, BinaryOperator::Or, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut expr = self.parse_equality()?;
        while matches!(self.current.kind, TokenKind::And) {
            self.advance();
            let right = self.parse_equality()?;
            expr = binary(expr, BinaryOperator::And, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        let mut expr = self.parse_relational()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Equal => BinaryOperator::Equal,
                TokenKind::NotEqual => BinaryOperator::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    // Comparisons do not chain: at most one relational operator here, so
    // `a < b < c` fails on the second `<`.
    fn parse_relational(&mut self) -> Result<Expression> {
        let expr = self.parse_additive()?;
        let op = match self.current.kind {
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::LessEqual => BinaryOperator::LessEqual,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
            _ => return Ok(expr),
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(binary(expr, op, right))
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Multiply => BinaryOperator::Multiply,
                TokenKind::Divide => BinaryOperator::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        let op = match self.current.kind {
            TokenKind::Not => UnaryOperator::Not,
            TokenKind::Minus => UnaryOperator::Negate,
            _ => return self.parse_factor(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        match self.current.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')' after expression")?;
                Ok(expr)
            }
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expression::Number(value))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Boolean(false))
            }
            TokenKind::Identifier(_) => self.parse_location(),
            _ => Err(self.error_at_current("Expected expression")),
        }
    }

    fn parse_location(&mut self) -> Result<Expression> {
        let name = self.expect_identifier()?;
        if matches!(self.current.kind, TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expression()?;
            self.expect(TokenKind::RBracket, "']'")?;
            return Ok(Expression::ListAccess {
                name,
                index: Box::new(index),
            });
        }
        Ok(Expression::Identifier(name))
    }

    fn expect(&mut self, kind: TokenKind<'static>, expected: &str) -> Result<()> {
        if self.current.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        if let TokenKind::Identifier(name) = self.current.kind {
            self.advance();
            Ok(name.to_string())
        } else {
            Err(self.error("identifier"))
        }
    }

    fn advance(&mut self) -> Token<'a> {
        let next = self
            .tokens
            .get(self.pos + 1)
            .copied()
            .unwrap_or(Token::new(TokenKind::EndMarker, Span::default()));
        self.pos = self.pos.saturating_add(1);
        std::mem::replace(&mut self.current, next)
    }

    fn peek_kind(&self, offset: usize) -> TokenKind<'a> {
        self.tokens
            .get(self.pos + offset)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EndMarker)
    }

    fn error(&self, expected: &str) -> anyhow::Error {
        let span = self.current.span();
        anyhow::anyhow!(
            "Expected {expected}, got {:?} at line {}, column {}",
            self.current.kind(),
            span.line,
            span.column
        )
    }

    fn error_at_current(&self, message: &str) -> anyhow::Error {
        let span = self.current.span();
        anyhow::anyhow!("{message} at line {}, column {}", span.line, span.column)
    }

    fn statement_error(&self) -> anyhow::Error {
        self.error_at_current("Unexpected token in simple statement")
    }
}

pub fn parse_tokens<'a>(tokens: Vec<Token<'a>>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}
