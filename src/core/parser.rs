//! Reads a rational function of the form `(a·x + b) / (c·x + d)` from text.
//!
//! The input goes through three steps:
//!
//! 1. [`tokenize`] turns text into tokens. It accepts the display glyphs students
//!    paste from worksheets (`−`, `×`, `·`, `÷`, `²`, `³`).
//! 2. [`Parser`] builds an [`Expr`] tree by recursive descent:
//!
//!    ```text
//!    input   := [ ("y" | "f" "(" "x" ")") "=" ] expr
//!    expr    := term (("+" | "-") term)*
//!    term    := unary (("*" | "/") unary | power)*      -- bare `power` is implicit `*`
//!    unary   := ("+" | "-") unary | power
//!    power   := primary ["^" unary]
//!    primary := number | "x" | "(" expr ")"
//!    ```
//!
//! 3. [`Expr::reduce`] folds the tree into a single ratio of polynomials. Common
//!    factors are never cancelled, so `(2x+4)/(x+2)` keeps its degree-(1,1) shape.
//!
//! Only then are the degrees checked: anything above 1 is rejected rather than
//! approximated.

use crate::domain::model::{LinearPolynomial, RationalFunctionInput};
use crate::utils::error::{LabError, Result};

/// A sum smaller than this fraction of its largest addend is cancellation noise.
const CANCELLATION_EPSILON: f64 = 1e-12;
const MAX_EXPONENT: u32 = 16;
const MAX_DEPTH: usize = 64;
/// Trees are folded left, so long inputs mean deep trees.
const MAX_TOKENS: usize = 1000;
/// Intermediate polynomials may exceed degree 1 and still cancel, but not by much.
const MAX_DEGREE: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Equals,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Ident(name) => format!("'{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Equals => "'='".to_string(),
        }
    }
}

/// Tokens paired with their character offset in the input.
pub fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let mut seen_dot = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    if chars[i] == '.' {
                        if seen_dot {
                            return Err(LabError::malformed(
                                input,
                                format!("second decimal point at position {}", i),
                            ));
                        }
                        seen_dot = true;
                    }
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| {
                    LabError::malformed(input, format!("invalid number '{}' at position {}", text, start))
                })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            c if c.is_alphabetic() => {
                while i < chars.len() && chars[i].is_alphabetic() {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                tokens.push((Token::Ident(name), start));
                continue;
            }
            '+' => tokens.push((Token::Plus, start)),
            '-' | '−' => tokens.push((Token::Minus, start)),
            '*' | '×' | '·' => tokens.push((Token::Star, start)),
            '/' | '÷' => tokens.push((Token::Slash, start)),
            '^' => tokens.push((Token::Caret, start)),
            '²' => {
                tokens.push((Token::Caret, start));
                tokens.push((Token::Number(2.0), start));
            }
            '³' => {
                tokens.push((Token::Caret, start));
                tokens.push((Token::Number(3.0), start));
            }
            '(' => tokens.push((Token::LParen, start)),
            ')' => tokens.push((Token::RParen, start)),
            '=' => tokens.push((Token::Equals, start)),
            other => {
                return Err(LabError::malformed(
                    input,
                    format!("unexpected character '{}' at position {}", other, start),
                ));
            }
        }
        i += 1;
    }

    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable,
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self> {
        let tokens = tokenize(input)?;
        if tokens.len() > MAX_TOKENS {
            return Err(LabError::malformed(
                input,
                format!(
                    "the expression has {} tokens; at most {} are allowed",
                    tokens.len(),
                    MAX_TOKENS
                ),
            ));
        }
        Ok(Self {
            input,
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    /// Parses the whole input, including an optional `y =` or `f(x) =` prefix.
    pub fn parse(mut self) -> Result<Expr> {
        if self.tokens.is_empty() {
            return Err(LabError::malformed(self.input, "the expression is empty"));
        }
        self.skip_assignment_prefix()?;
        let expr = self.parse_expr()?;
        match self.tokens.get(self.pos) {
            None => Ok(expr),
            Some((token, at)) => Err(self.error(format!(
                "unexpected {} at position {}",
                token.describe(),
                at
            ))),
        }
    }

    fn skip_assignment_prefix(&mut self) -> Result<()> {
        let Some(eq) = self.tokens.iter().position(|(t, _)| *t == Token::Equals) else {
            return Ok(());
        };
        let lhs: Vec<&Token> = self.tokens[..eq].iter().map(|(t, _)| t).collect();
        let accepted = match lhs.as_slice() {
            [Token::Ident(y)] => y == "y",
            [Token::Ident(f), Token::LParen, Token::Ident(x), Token::RParen] => {
                f == "f" && x == "x"
            }
            _ => false,
        };
        if !accepted {
            return Err(self.error("only 'y =' or 'f(x) =' may appear before '='".to_string()));
        }
        self.pos = eq + 1;
        if self.pos >= self.tokens.len() {
            return Err(self.error("nothing follows '='".to_string()));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, reason: String) -> LabError {
        LabError::malformed(self.input, reason)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("the expression is nested too deeply".to_string()));
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.enter()?;
        let mut left = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    left = Expr::Add(Box::new(left), Box::new(self.parse_term()?));
                }
                Some(Token::Minus) => {
                    self.advance();
                    left = Expr::Sub(Box::new(left), Box::new(self.parse_term()?));
                }
                _ => break,
            }
        }
        self.depth -= 1;
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    left = Expr::Mul(Box::new(left), Box::new(self.parse_unary()?));
                }
                Some(Token::Slash) => {
                    self.advance();
                    left = Expr::Div(Box::new(left), Box::new(self.parse_unary()?));
                }
                // 2x, 3(x + 1), (x + 1)(x - 2)
                Some(Token::Ident(_)) | Some(Token::LParen) => {
                    left = Expr::Mul(Box::new(left), Box::new(self.parse_power()?));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                self.enter()?;
                let operand = self.parse_unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(operand)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.enter()?;
                let operand = self.parse_unary()?;
                self.depth -= 1;
                Ok(operand)
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.advance();
            self.enter()?;
            let exponent = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let at = self.tokens.get(self.pos).map(|(_, at)| *at);
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) if name == "x" => Ok(Expr::Variable),
            Some(Token::Ident(name)) => Err(self.error(format!(
                "unknown symbol '{}' at position {}; only x is allowed",
                name,
                at.unwrap_or_default()
            ))),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.error(format!(
                        "unclosed '(' at position {}",
                        at.unwrap_or_default()
                    ))),
                }
            }
            Some(token) => Err(self.error(format!(
                "unexpected {} at position {}",
                token.describe(),
                at.unwrap_or_default()
            ))),
            None => Err(self.error("unexpected end of input".to_string())),
        }
    }
}

/// Dense polynomial in `x`, lowest power first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn constant(value: f64) -> Self {
        Self::from_coefficients(vec![value])
    }

    pub fn x() -> Self {
        Self::from_coefficients(vec![0.0, 1.0])
    }

    /// Only exact zeros are trimmed; `1e-13·x + 1` keeps its `x` term.
    pub fn from_coefficients(mut coefficients: Vec<f64>) -> Self {
        while coefficients.last().is_some_and(|c| *c == 0.0) {
            coefficients.pop();
        }
        Self { coefficients }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// The zero polynomial reports degree 0.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Coefficient of `x^power`; absent terms read as 0.
    pub fn coefficient(&self, power: usize) -> f64 {
        self.coefficients.get(power).copied().unwrap_or(0.0)
    }

    fn leading(&self) -> f64 {
        self.coefficients.last().copied().unwrap_or(0.0)
    }

    fn add(&self, other: &Self) -> Self {
        let len = self.coefficients.len().max(other.coefficients.len());
        Self::from_coefficients(
            (0..len)
                .map(|i| {
                    let (a, b) = (self.coefficient(i), other.coefficient(i));
                    cancel_noise(a + b, a.abs().max(b.abs()))
                })
                .collect(),
        )
    }

    fn scale(&self, factor: f64) -> Self {
        Self::from_coefficients(self.coefficients.iter().map(|c| c * factor).collect())
    }

    fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::constant(0.0);
        }
        let len = self.coefficients.len() + other.coefficients.len() - 1;
        let mut product = vec![0.0; len];
        let mut magnitude = vec![0.0_f64; len];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                product[i + j] += a * b;
                magnitude[i + j] = magnitude[i + j].max((a * b).abs());
            }
        }
        Self::from_coefficients(
            product
                .into_iter()
                .zip(magnitude)
                .map(|(p, m)| cancel_noise(p, m))
                .collect(),
        )
    }

    /// `Some(λ)` when `other = λ·self`.
    fn ratio_to(&self, other: &Self) -> Option<f64> {
        if self.is_zero() || self.coefficients.len() != other.coefficients.len() {
            return None;
        }
        let lambda = other.leading() / self.leading();
        let scale = other
            .coefficients
            .iter()
            .fold(1.0_f64, |acc, c| acc.max(c.abs()));
        let proportional = self
            .coefficients
            .iter()
            .zip(&other.coefficients)
            .all(|(a, b)| (a * lambda - b).abs() <= 1e-9 * scale);
        proportional.then_some(lambda)
    }

    fn to_linear(&self) -> LinearPolynomial {
        LinearPolynomial::new(self.coefficient(1), self.coefficient(0))
    }
}

fn cancel_noise(sum: f64, largest_term: f64) -> f64 {
    if sum.abs() <= CANCELLATION_EPSILON * largest_term {
        0.0
    } else {
        sum
    }
}

/// `numerator / denominator`, with a constant denominator always folded to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Ratio {
    pub numerator: Polynomial,
    pub denominator: Polynomial,
}

impl Ratio {
    fn polynomial(numerator: Polynomial) -> Self {
        Self {
            numerator,
            denominator: Polynomial::constant(1.0),
        }
    }

    fn normalized(numerator: Polynomial, denominator: Polynomial) -> Self {
        if denominator.degree() == 0 {
            let c = denominator.coefficient(0);
            return Self::polynomial(numerator.scale(1.0 / c));
        }
        Self {
            numerator,
            denominator,
        }
    }

    fn negate(self) -> Self {
        Self {
            numerator: self.numerator.scale(-1.0),
            denominator: self.denominator,
        }
    }

    fn add(self, other: Self) -> Self {
        // Shared (or proportional) denominators stay shared: 1/(x-3) + 2/(x-3).
        if let Some(lambda) = self.denominator.ratio_to(&other.denominator) {
            let numerator = self.numerator.add(&other.numerator.scale(1.0 / lambda));
            return Self::normalized(numerator, self.denominator);
        }
        let numerator = self
            .numerator
            .mul(&other.denominator)
            .add(&other.numerator.mul(&self.denominator));
        Self::normalized(numerator, self.denominator.mul(&other.denominator))
    }

    fn mul(self, other: Self) -> Self {
        Self::normalized(
            self.numerator.mul(&other.numerator),
            self.denominator.mul(&other.denominator),
        )
    }

    fn div(self, other: Self, input: &str) -> Result<Self> {
        if other.numerator.is_zero() {
            return Err(LabError::malformed(input, "division by zero"));
        }
        Ok(Self::normalized(
            self.numerator.mul(&other.denominator),
            self.denominator.mul(&other.numerator),
        ))
    }

    fn degree(&self) -> usize {
        self.numerator.degree().max(self.denominator.degree())
    }

    fn bounded(self, input: &str) -> Result<Self> {
        if self.degree() > MAX_DEGREE {
            return Err(degree_too_high(input, self.degree()));
        }
        Ok(self)
    }

    fn as_constant(&self) -> Option<f64> {
        (self.numerator.degree() == 0 && self.denominator.degree() == 0)
            .then(|| self.numerator.coefficient(0) / self.denominator.coefficient(0))
    }
}

fn degree_too_high(input: &str, degree: usize) -> LabError {
    LabError::malformed(
        input,
        format!("an intermediate term reaches degree {}; only degree 1 is supported", degree),
    )
}

impl Expr {
    /// Folds the tree into one ratio of polynomials without cancelling factors.
    pub fn reduce(&self, input: &str) -> Result<Ratio> {
        match self {
            Expr::Number(value) => Ok(Ratio::polynomial(Polynomial::constant(*value))),
            Expr::Variable => Ok(Ratio::polynomial(Polynomial::x())),
            Expr::Neg(inner) => Ok(inner.reduce(input)?.negate()),
            Expr::Add(l, r) => l.reduce(input)?.add(r.reduce(input)?).bounded(input),
            Expr::Sub(l, r) => l
                .reduce(input)?
                .add(r.reduce(input)?.negate())
                .bounded(input),
            Expr::Mul(l, r) => l.reduce(input)?.mul(r.reduce(input)?).bounded(input),
            Expr::Div(l, r) => l.reduce(input)?.div(r.reduce(input)?, input)?.bounded(input),
            Expr::Pow(base, exponent) => {
                let exponent = exponent.reduce(input)?.as_constant().ok_or_else(|| {
                    LabError::malformed(input, "exponents must be constant numbers")
                })?;
                if exponent < 0.0
                    || (exponent - exponent.round()).abs() > 1e-9
                    || exponent > MAX_EXPONENT as f64
                {
                    return Err(LabError::malformed(
                        input,
                        format!(
                            "exponent {} is not a whole number between 0 and {}",
                            exponent, MAX_EXPONENT
                        ),
                    ));
                }
                let base = base.reduce(input)?;
                let power = exponent.round() as usize;
                if base.degree() * power > MAX_DEGREE {
                    return Err(degree_too_high(input, base.degree() * power));
                }
                let mut result = Ratio::polynomial(Polynomial::constant(1.0));
                for _ in 0..exponent.round() as u32 {
                    result = result.mul(base.clone());
                }
                Ok(result)
            }
        }
    }
}

/// Parses text into `(a·x + b) / (c·x + d)`.
///
/// A degree above 1 on either side is a [`LabError::MalformedExpression`]; a
/// constant denominator is a [`LabError::NotARationalFunction`].
pub fn parse_rational(input: &str) -> Result<RationalFunctionInput> {
    let expr = Parser::new(input)?.parse()?;
    let ratio = expr.reduce(input)?;

    let numerator_degree = ratio.numerator.degree();
    let denominator_degree = ratio.denominator.degree();
    tracing::debug!(
        "Reduced '{}' to degree {}/{} ratio {:?}",
        input,
        numerator_degree,
        denominator_degree,
        ratio
    );

    if numerator_degree > 1 || denominator_degree > 1 {
        return Err(LabError::malformed(
            input,
            format!(
                "numerator has degree {} and denominator has degree {}; both must be at most 1",
                numerator_degree, denominator_degree
            ),
        ));
    }
    if ratio.numerator.coefficients.iter().any(|c| !c.is_finite())
        || ratio.denominator.coefficients.iter().any(|c| !c.is_finite())
    {
        return Err(LabError::malformed(input, "a coefficient is not a finite number"));
    }
    if denominator_degree == 0 {
        return Err(LabError::NotARationalFunction {
            reason: "the denominator does not contain x".to_string(),
        });
    }

    RationalFunctionInput::new(ratio.numerator.to_linear(), ratio.denominator.to_linear())
}
