//! Calculator: safe arithmetic over a restricted expression grammar.
//!
//! Supports `+`, `-`, `*`, `/`, `^` (or `**`) for power, parentheses,
//! decimals, unary signs, and `%` as a textual `/100`. Input is parsed by a
//! recursive-descent parser into an [`Expr`] tree and evaluated by
//! structural recursion, so nothing outside this grammar can ever run.
//!
//! Whole-number expressions are also evaluated exactly in `i128`, so large
//! integer results display without float rounding.

use std::fmt;
use thiserror::Error;

/// Calculator failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("unsupported operation '{0}'")]
    UnsupportedOperation(String),

    #[error("{0}")]
    Syntax(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

impl CalcError {
    /// The text shown to a learner for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCharacter(_) => "Error: Invalid characters in expression. Only numbers \
                 and basic operators (+, -, *, /, ^, %) are allowed."
                .into(),
            Self::DivisionByZero => "Error: Division by zero is not allowed.".into(),
            other => format!("Error calculating: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Deepest nesting of parentheses, signs, and exponents the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Most tokens one expression may contain. Bounds the height of
/// left-associative chains as well.
pub const MAX_TOKENS: usize = 1024;

/// A parsed arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal written without a decimal point
    Int(i128),
    Num(f64),
    Neg(Box<Expr>),
    Pos(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate the tree.
    pub fn eval(&self) -> Result<f64, CalcError> {
        let value = match self {
            Self::Int(n) => *n as f64,
            Self::Num(n) => *n,
            Self::Neg(inner) => -inner.eval()?,
            Self::Pos(inner) => inner.eval()?,
            Self::Binary { op, lhs, rhs } => {
                let l = lhs.eval()?;
                let r = rhs.eval()?;
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => {
                        if r == 0.0 {
                            return Err(CalcError::DivisionByZero);
                        }
                        l / r
                    }
                    BinOp::Pow => {
                        if l == 0.0 && r < 0.0 {
                            return Err(CalcError::DivisionByZero);
                        }
                        l.powf(r)
                    }
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(CalcError::NonFinite)
        }
    }

    /// Exact integer value, or `None` once any step leaves the integers
    /// (a decimal literal, an inexact division, a negative exponent) or
    /// overflows `i128`.
    pub fn eval_exact(&self) -> Option<i128> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Num(_) => None,
            Self::Neg(inner) => inner.eval_exact()?.checked_neg(),
            Self::Pos(inner) => inner.eval_exact(),
            Self::Binary { op, lhs, rhs } => {
                let l = lhs.eval_exact()?;
                let r = rhs.eval_exact()?;
                match op {
                    BinOp::Add => l.checked_add(r),
                    BinOp::Sub => l.checked_sub(r),
                    BinOp::Mul => l.checked_mul(r),
                    BinOp::Div => (r != 0 && l.checked_rem(r)? == 0).then(|| l.checked_div(r))?,
                    BinOp::Pow => l.checked_pow(u32::try_from(r).ok()?),
                }
            }
        }
    }
}

/// A successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    /// The cleaned expression, with `%` rewritten and `^` for power
    pub expression: String,
    pub value: f64,
    /// Set when every step stayed within the integers
    pub exact: Option<i128>,
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🧮 **Calculation Result:**\n\n`{}` = **{}**",
            self.expression,
            match self.exact {
                Some(n) => n.to_string(),
                None => format_value(self.value),
            }
        )
    }
}

/// Render a value, dropping the fraction from whole numbers.
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        // covers -0
        return "0".into();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

const ALLOWED_OPERATORS: &[char] = &['+', '-', '*', '/', '(', ')', '.', '^', '%'];

/// Evaluate `input`.
pub fn calculate(input: &str) -> Result<Calculation, CalcError> {
    let trimmed = input.trim();
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_digit() || c.is_whitespace() || ALLOWED_OPERATORS.contains(c)))
    {
        return Err(CalcError::InvalidCharacter(bad));
    }

    let rewritten = trimmed.replace('%', "/100");
    let tokens = tokenize(&rewritten)?;
    if tokens.len() > MAX_TOKENS {
        return Err(CalcError::Syntax("expression too long".into()));
    }
    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        return Err(CalcError::Syntax(format!(
            "unexpected {tok} at position {}",
            parser.pos
        )));
    }

    let value = expr.eval()?;
    Ok(Calculation {
        expression: rewritten.replace("**", "^"),
        value,
        exact: expr.eval_exact(),
    })
}

/// Evaluate `input` and return the text to show: the formatted result or
/// the error message.
pub fn calculate_message(input: &str) -> String {
    match calculate(input) {
        Ok(calc) => calc.to_string(),
        Err(e) => e.user_message(),
    }
}

// Tokenizer

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i128),
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "number {n}"),
            Self::Number(n) => write!(f, "number {n}"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Star => f.write_str("'*'"),
            Self::Slash => f.write_str("'/'"),
            Self::Caret => f.write_str("'^'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let next = chars.get(i + 1).copied();
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' if next == Some('*') => { tokens.push(Token::Caret); i += 2; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' if next == Some('/') => {
                return Err(CalcError::UnsupportedOperation("//".into()));
            }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '^' => { tokens.push(Token::Caret); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                if let Ok(int) = num_str.parse::<i128>() {
                    tokens.push(Token::Int(int));
                    continue;
                }
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| CalcError::Syntax(format!("invalid number '{num_str}'")))?;
                tokens.push(Token::Number(num));
            }
            c => return Err(CalcError::InvalidCharacter(c)),
        }
    }

    Ok(tokens)
}

// Parser

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Expr, CalcError>,
    ) -> Result<Expr, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::Syntax("expression nested too deeply".into()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr, CalcError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.consume();
            left = Expr::binary(op, left, self.parse_term()?);
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<Expr, CalcError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.consume();
            left = Expr::binary(op, left, self.parse_unary()?);
        }
        Ok(left)
    }

    // unary = ('-' | '+') unary | power
    fn parse_unary(&mut self) -> Result<Expr, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.consume();
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expr::Pos(Box::new(inner)))
            }
            _ => self.parse_power(),
        }
    }

    // power = primary ('^' unary)?
    // The exponent goes back through unary, which makes `^` right-associative.
    fn parse_power(&mut self) -> Result<Expr, CalcError> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let exponent = self.nested(Self::parse_unary)?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, CalcError> {
        match self.consume() {
            Some(Token::Int(n)) => Ok(Expr::Int(*n)),
            Some(Token::Number(n)) => Ok(Expr::Num(*n)),
            Some(Token::LParen) => {
                let inner = self.nested(Self::parse_expr)?;
                match self.consume() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(CalcError::Syntax("expected closing parenthesis".into())),
                }
            }
            Some(tok) => Err(CalcError::Syntax(format!("unexpected {tok}"))),
            None => Err(CalcError::Syntax("unexpected end of expression".into())),
        }
    }
}
