//! `Calculate` action — evaluates arithmetic expressions.
//!
//! Supports `+`, `-`, `*`, `/`, parentheses, unary negation, and decimal
//! numbers, using a small recursive-descent parser.

use async_trait::async_trait;
use reagent_core::action::{Action, WorkedExample};
use reagent_core::error::ActionError;
use std::iter::Peekable;
use std::str::Chars;

/// Evaluation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unexpected character: '{0}'")]
    UnexpectedChar(char),

    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Expected closing parenthesis")]
    UnclosedParen,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Expression nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Nesting limit for parentheses and unary minus combined.
pub const MAX_DEPTH: usize = 256;

pub struct CalculateAction {
    example: WorkedExample,
}

impl CalculateAction {
    pub fn new() -> Self {
        Self {
            example: WorkedExample::new("How many minutes are there in a week?")
                .step(
                    "A week has 7 days of 24 hours of 60 minutes, I should multiply them.",
                    "Calculate[7 * 24 * 60]",
                    "10080",
                )
                .step(
                    "The last observation answers the question.",
                    "Finish[]",
                    "10080",
                ),
        }
    }
}

impl Default for CalculateAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for CalculateAction {
    fn name(&self) -> &str {
        "Calculate"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression such as '(2 + 3) * 4'. Supports +, -, *, /, parentheses and decimals."
    }

    fn example(&self) -> Option<&WorkedExample> {
        Some(&self.example)
    }

    async fn invoke(&self, arg: &str) -> Result<String, ActionError> {
        let value = evaluate(arg).map_err(|e| ActionError::ExecutionFailed {
            action: self.name().to_string(),
            reason: e.to_string(),
        })?;
        Ok(format_number(value))
    }
}

/// Render integers without a trailing `.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ── Recursive-descent evaluator ───────────────────────────────────────────

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    let tokens = Lexer::new(expr).collect::<Result<Vec<_>, _>>()?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        depth: 0,
    };
    let value = parser.expr()?;
    match parser.tokens.next() {
        None => Ok(value),
        Some(tok) => Err(CalcError::UnexpectedToken(tok.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    Open,
    Close,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{n}"),
            Token::Op(c) => write!(f, "{c}"),
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}

        let c = self.chars.next()?;
        Some(match c {
            '+' | '-' | '*' | '/' => Ok(Token::Op(c)),
            '(' => Ok(Token::Open),
            ')' => Ok(Token::Close),
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::from(c);
                while let Some(d) = self.chars.next_if(|d| d.is_ascii_digit() || *d == '.') {
                    literal.push(d);
                }
                literal
                    .parse()
                    .map(Token::Num)
                    .map_err(|_| CalcError::InvalidNumber(literal))
            }
            other => Err(CalcError::UnexpectedChar(other)),
        })
    }
}

struct Parser {
    tokens: Peekable<std::vec::IntoIter<Token>>,
    depth: usize,
}

impl Parser {
    /// Run `f` one nesting level deeper.
    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<f64, CalcError>,
    ) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // expr = term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.term()?;
        while let Some(Token::Op(op)) = self.tokens.next_if(|t| matches!(t, Token::Op('+' | '-'))) {
            let rhs = self.term()?;
            if op == '+' {
                acc += rhs;
            } else {
                acc -= rhs;
            }
        }
        Ok(acc)
    }

    // term = unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op)) = self.tokens.next_if(|t| matches!(t, Token::Op('*' | '/'))) {
            let rhs = self.unary()?;
            if op == '*' {
                acc *= rhs;
            } else if rhs == 0.0 {
                return Err(CalcError::DivisionByZero);
            } else {
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    // unary = '-' unary | primary
    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.tokens.next_if_eq(&Token::Op('-')).is_some() {
            return Ok(-self.nested(Self::unary)?);
        }
        self.primary()
    }

    // primary = NUMBER | '(' expr ')'
    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.tokens.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.nested(Self::expr)?;
                match self.tokens.next() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(CalcError::UnclosedParen),
                }
            }
            Some(tok) => Err(CalcError::UnexpectedToken(tok.to_string())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}
