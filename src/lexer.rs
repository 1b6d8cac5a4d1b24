//! Indentation-aware tokenizer.
//!
//! Produces a flat token stream in which block structure is already explicit:
//! each change of indentation depth at the start of a line becomes a synthetic
//! `Indent`/`Dedent` token, and the stream always ends with `EndMarker`.

pub mod error;
pub mod token;

pub use error::{LexError, LexResult};
pub use token::{Span, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerState {
    LineBegin,
    TokenStart,
}

enum StepOutcome<'a> {
    Emit(Token<'a>),
    Continue,
}

fn keyword(ident: &str) -> Option<TokenKind<'_>> {
    let kind = match ident {
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "list" => TokenKind::List,
        "print" => TokenKind::Print,
        "append" => TokenKind::Append,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        _ => return None,
    };
    Some(kind)
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    indent_stack: Vec<usize>,
    pending_tokens: Vec<Token<'a>>,
    state: LexerState,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            pending_tokens: Vec::new(),
            state: LexerState::LineBegin,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        loop {
            if let Some(token) = self.pending_tokens.pop() {
                return Ok(token);
            }

            match self.step_state()? {
                StepOutcome::Emit(token) => return Ok(token),
                StepOutcome::Continue => continue,
            }
        }
    }

    fn step_state(&mut self) -> LexResult<StepOutcome<'a>> {
        match self.state {
            LexerState::LineBegin => self.handle_line_begin(),
            LexerState::TokenStart => {
                self.skip_spaces();

                if self.peek_char().is_none() {
                    return self.handle_eof();
                }

                Ok(StepOutcome::Emit(self.read_token_from_current_position()?))
            }
        }
    }

    /// Measure the leading-whitespace prefix and translate any depth change
    /// into `Indent`/`Dedent` tokens.
    ///
    /// The prefix must be uniform: all tabs (one level each) or all spaces
    /// (two per level, even count required). Whitespace-only lines are
    /// skipped before those checks, so a blank line never changes depth and
    /// never fails.
    fn handle_line_begin(&mut self) -> LexResult<StepOutcome<'a>> {
        let mut tabs = 0usize;
        let mut spaces = 0usize;
        while let Some(c) = self.peek_char() {
            match c {
                '\t' => tabs += 1,
                ' ' => spaces += 1,
                _ => break,
            }
            self.consume_char();
        }

        match self.peek_char() {
            Some('\n') => {
                // Blank line: no Newline, no indentation change.
                self.consume_char();
                return Ok(StepOutcome::Continue);
            }
            None => {
                self.state = LexerState::TokenStart;
                return Ok(StepOutcome::Continue);
            }
            _ => {}
        }

        if tabs > 0 && spaces > 0 {
            return Err(LexError::MixedIndentation { line: self.line });
        }

        let level = if tabs > 0 {
            tabs
        } else {
            if spaces % 2 != 0 {
                return Err(LexError::InvalidDedent { line: self.line });
            }
            spaces / 2
        };

        self.state = LexerState::TokenStart;
        let top = self.current_indent()?;
        let span = self.here();

        if level > top {
            self.indent_stack.push(level);
            return Ok(StepOutcome::Emit(Token::new(TokenKind::Indent, span)));
        }

        if level < top {
            while let Some(&top) = self.indent_stack.last() {
                if top > level {
                    self.indent_stack.pop();
                    self.pending_tokens.push(Token::new(TokenKind::Dedent, span));
                } else {
                    break;
                }
            }
            if self.current_indent()? != level {
                return Err(LexError::InvalidDedent { line: self.line });
            }
        }

        Ok(StepOutcome::Continue)
    }

    fn handle_eof(&mut self) -> LexResult<StepOutcome<'a>> {
        // Close every open block before the end marker.
        let span = self.here();
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending_tokens.push(Token::new(TokenKind::Dedent, span));
        }
        if !self.pending_tokens.is_empty() {
            return Ok(StepOutcome::Continue);
        }

        Ok(StepOutcome::Emit(Token::new(TokenKind::EndMarker, span)))
    }

    fn read_token_from_current_position(&mut self) -> LexResult<Token<'a>> {
        let ch = self.peek_char().ok_or(LexError::InvariantViolation {
            message: "read_token_from_current_position called at EOF",
        })?;

        match ch {
            '\n' => {
                let span = self.here();
                self.consume_char();
                self.state = LexerState::LineBegin;
                Ok(Token::new(
                    TokenKind::Newline,
                    Span {
                        end: span.start + 1,
                        ..span
                    },
                ))
            }
            '=' | '!' | '<' | '>' | '/' => self.read_operator(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() => Ok(self.read_identifier()),
            _ => {
                if let Some(token) = self.try_consume_single_char_token(ch) {
                    Ok(token)
                } else {
                    Err(LexError::UnexpectedCharacter {
                        character: ch,
                        line: self.line,
                        column: self.column,
                    })
                }
            }
        }
    }

    fn try_consume_single_char_token(&mut self, ch: char) -> Option<Token<'a>> {
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Multiply,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            _ => return None,
        };

        let span = self.here();
        self.consume_char();
        Some(Token::new(
            kind,
            Span {
                end: span.start + 1,
                ..span
            },
        ))
    }

    /// Two-character operators win over their one-character prefixes; a `!`
    /// or `/` that is not followed by its second character is not a token.
    fn read_operator(&mut self) -> LexResult<Token<'a>> {
        let span = self.here();
        let first = self.consume_char().ok_or(LexError::InvariantViolation {
            message: "read_operator called at EOF",
        })?;

        let two_char = match (first, self.peek_char()) {
            ('=', Some('=')) => Some(TokenKind::Equal),
            ('!', Some('=')) => Some(TokenKind::NotEqual),
            ('<', Some('=')) => Some(TokenKind::LessEqual),
            ('>', Some('=')) => Some(TokenKind::GreaterEqual),
            ('/', Some('/')) => Some(TokenKind::Divide),
            _ => None,
        };
        if let Some(kind) = two_char {
            self.consume_char();
            return Ok(Token::new(kind, Span { end: self.pos, ..span }));
        }

        let kind = match first {
            '=' => TokenKind::Assign,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            _ => {
                return Err(LexError::UnknownOperator {
                    character: first,
                    line: span.line,
                    column: span.column,
                });
            }
        };
        Ok(Token::new(kind, Span { end: self.pos, ..span }))
    }

    fn read_number(&mut self) -> LexResult<Token<'a>> {
        let span = self.here();

        if self.peek_char() == Some('0') {
            self.consume_char();
            // Zero must stand alone.
            if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::LeadingZero {
                    line: span.line,
                    column: span.column,
                });
            }
            return Ok(Token::new(
                TokenKind::Number(0),
                Span { end: self.pos, ..span },
            ));
        }

        self.consume_while(|c| c.is_ascii_digit());
        let literal = &self.input[span.start..self.pos];
        let value = literal
            .parse::<i64>()
            .map_err(|_| LexError::InvalidIntegerLiteral {
                literal: literal.to_string(),
                line: span.line,
                column: span.column,
            })?;
        Ok(Token::new(
            TokenKind::Number(value),
            Span { end: self.pos, ..span },
        ))
    }

    fn read_identifier(&mut self) -> Token<'a> {
        let span = self.here();
        self.consume_while(|c| c.is_ascii_alphanumeric());

        let ident = &self.input[span.start..self.pos];
        let kind = keyword(ident).unwrap_or(TokenKind::Identifier(ident));
        Token::new(kind, Span { end: self.pos, ..span })
    }

    fn skip_spaces(&mut self) {
        self.consume_while(|c| c == ' ');
    }

    fn consume_while<P>(&mut self, keep_predicate: P) -> usize
    where
        P: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !keep_predicate(c) {
                break;
            }
            self.consume_char();
        }
        self.pos - start
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Zero-width span at the current position.
    fn here(&self) -> Span {
        Span {
            start: self.pos,
            end: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn current_indent(&self) -> LexResult<usize> {
        self.indent_stack
            .last()
            .copied()
            .ok_or(LexError::InvariantViolation {
                message: "indent stack is empty",
            })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) => Some(Ok(token)),
            Err(e) => Some(Err(e)),
        }
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_end = matches!(token.kind, TokenKind::EndMarker);
        tokens.push(token);
        if is_end {
            break;
        }
    }
    Ok(tokens)
}
