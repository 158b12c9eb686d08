//! Count quantity expressions (`CTD_QTY_Expr`).
//!
//! Counters record quantities as small arithmetic expressions such as `3*24+5` (three
//! full cartons of 24 plus five loose). Grammar:
//!
//! ```text
//!   expression     --> additive
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/") unary )*
//!   unary          --> ("-" | "+") unary | power
//!   power          --> primary ( ("^" | "**") unary )?
//!   primary        --> NUMBER | "(" expression ")"
//! ```
//!
//! A single leading `=` is accepted, as typed into a spreadsheet cell.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{0}'")]
    IllegalChar(char),
    #[error("malformed number '{0}'")]
    BadNumber(String),
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
    #[error("expression nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Deepest nesting of parentheses, signs and exponents the parser descends into.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Power,
    LParen,
    RParen,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Power => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
        }
    }

    fn next_token(&mut self) -> Result<Token, ExprError> {
        while self.input.peek().is_some_and(|c| c.is_whitespace()) {
            self.input.next();
        }
        match self.input.next() {
            None => Ok(Token::Eof),
            Some('+') => Ok(Token::Plus),
            Some('-') => Ok(Token::Minus),
            Some('*') => {
                if self.input.peek() == Some(&'*') {
                    self.input.next();
                    Ok(Token::Power)
                } else {
                    Ok(Token::Star)
                }
            }
            Some('/') => Ok(Token::Slash),
            Some('^') => Ok(Token::Power),
            Some('(') => Ok(Token::LParen),
            Some(')') => Ok(Token::RParen),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),
            Some(ch) => Err(ExprError::IllegalChar(ch)),
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token, ExprError> {
        let mut text = String::from(first);
        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.input.next();
            } else if (ch == 'e' || ch == 'E') && !text.contains(['e', 'E']) {
                text.push(ch);
                self.input.next();
                if let Some(&sign @ ('+' | '-')) = self.input.peek() {
                    text.push(sign);
                    self.input.next();
                }
            } else {
                break;
            }
        }
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ExprError::BadNumber(text))
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ExprError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ExprError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse(&mut self) -> Result<f64, ExprError> {
        if self.current == Token::Eof {
            return Err(ExprError::Empty);
        }
        let value = self.additive()?;
        if self.current != Token::Eof {
            return Err(ExprError::Unexpected {
                expected: "end of input",
                found: self.current.describe(),
            });
        }
        Ok(value)
    }

    fn additive(&mut self) -> Result<f64, ExprError> {
        let mut left = self.multiplicative()?;
        loop {
            match self.current {
                Token::Plus => {
                    self.advance()?;
                    left += self.multiplicative()?;
                }
                Token::Minus => {
                    self.advance()?;
                    left -= self.multiplicative()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn multiplicative(&mut self) -> Result<f64, ExprError> {
        let mut left = self.unary()?;
        loop {
            match self.current {
                Token::Star => {
                    self.advance()?;
                    left *= self.unary()?;
                }
                Token::Slash => {
                    self.advance()?;
                    let right = self.unary()?;
                    if right == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    left /= right;
                }
                _ => return Ok(left),
            }
        }
    }

    // Every nesting level passes through here, so the depth is counted once per level.
    fn unary(&mut self) -> Result<f64, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, ExprError> {
        match self.current {
            Token::Minus => {
                self.advance()?;
                Ok(-self.unary()?)
            }
            Token::Plus => {
                self.advance()?;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, ExprError> {
        let base = self.primary()?;
        if self.current == Token::Power {
            self.advance()?;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, ExprError> {
        match self.current {
            Token::Number(n) => {
                self.advance()?;
                Ok(n)
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.additive()?;
                if self.current != Token::RParen {
                    return Err(ExprError::Unexpected {
                        expected: "')'",
                        found: self.current.describe(),
                    });
                }
                self.advance()?;
                Ok(inner)
            }
            _ => Err(ExprError::Unexpected {
                expected: "a number or '('",
                found: self.current.describe(),
            }),
        }
    }
}

/// Strip surrounding whitespace and one leading `=`.
pub fn normalize(expr: &str) -> &str {
    let trimmed = expr.trim();
    trimmed.strip_prefix('=').unwrap_or(trimmed).trim()
}

/// Evaluate a count quantity expression.
pub fn evaluate(expr: &str) -> Result<f64, ExprError> {
    let value = Parser::new(normalize(expr))?.parse()?;
    if !value.is_finite() {
        return Err(ExprError::NotFinite);
    }
    Ok(value)
}
