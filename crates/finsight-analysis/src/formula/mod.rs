//! Ratio formulas.
//!
//! A formula is a small arithmetic expression over line-item names, e.g.
//! `(Current Assets - Inventory) / Current Liabilities`. Formulas are parsed
//! once into an [`Expr`] tree and evaluated against one table row at a time.
//! Field references are resolved by exact name, so `Total Assets` never
//! matches part of `Total Assets Growth`.

mod parser;

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula contains no tokens
    #[error("formula is empty")]
    Empty,

    /// Token that does not fit the grammar
    #[error("unexpected '{found}' at position {position}")]
    UnexpectedToken {
        /// Offending token
        found: String,
        /// Byte offset into the formula
        position: usize,
    },

    /// Formula ends where an operand is required
    #[error("unexpected end of formula")]
    UnexpectedEnd,

    /// Opening parenthesis without a match
    #[error("unclosed parenthesis opened at position {0}")]
    UnclosedParen(usize),

    /// Quoted name without a closing quote
    #[error("unterminated quoted name starting at position {0}")]
    UnterminatedQuote(usize),
}

/// Reasons a formula yields no value for a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Name is not a column of the table
    #[error("'{0}' is not a known line item")]
    UnknownField(String),

    /// Column exists but has no value in this row
    #[error("'{0}' has no value")]
    MissingField(String),

    /// Denominator evaluated to zero
    #[error("division by zero")]
    DivisionByZero,

    /// Result overflowed or is otherwise not finite
    #[error("result is not a finite number")]
    NonFinite,

    /// The formula itself never parsed
    #[error("formula is malformed: {0}")]
    InvalidFormula(FormulaError),
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// Operator symbol.
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Line-item reference
    Field(String),
    /// Negation
    Neg(Box<Expr>),
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Build a binary node.
    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Number(_) => {}
            Self::Field(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Self::Neg(inner) => inner.collect_fields(out),
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_fields(out);
                rhs.collect_fields(out);
            }
        }
    }

    fn eval<S: FieldSource + ?Sized>(&self, fields: &S) -> Result<f64, EvalError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Field(name) => match fields.field(name) {
                FieldValue::Present(value) => Ok(value),
                FieldValue::Missing => Err(EvalError::MissingField(name.clone())),
                FieldValue::Unknown => Err(EvalError::UnknownField(name.clone())),
            },
            Self::Neg(inner) => Ok(-inner.eval(fields)?),
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval(fields)?;
                let rhs = rhs.eval(fields)?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div if rhs == 0.0 => Err(EvalError::DivisionByZero),
                    BinaryOp::Div => Ok(lhs / rhs),
                }
            }
        }
    }
}

/// Value of a field as seen by a formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Field has a numeric value
    Present(f64),
    /// Field is a known column without a value
    Missing,
    /// Field is not a column at all
    Unknown,
}

/// Anything formulas can read fields from.
pub trait FieldSource {
    /// Look up a field by exact name.
    fn field(&self, name: &str) -> FieldValue;
}

impl<S: BuildHasher> FieldSource for HashMap<String, Option<f64>, S> {
    fn field(&self, name: &str) -> FieldValue {
        match self.get(name) {
            Some(Some(value)) => FieldValue::Present(*value),
            Some(None) => FieldValue::Missing,
            None => FieldValue::Unknown,
        }
    }
}

/// A parsed ratio formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse a formula.
    ///
    /// # Errors
    ///
    /// Returns a [`FormulaError`] describing the first syntax problem.
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// The formula text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The expression tree.
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Distinct field names referenced, in order of first appearance.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.expr.collect_fields(&mut out);
        out
    }

    /// Evaluate against one row of fields.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] if a field is unknown or missing, a
    /// denominator is zero, or the result is not finite.
    pub fn evaluate<S: FieldSource + ?Sized>(&self, fields: &S) -> Result<f64, EvalError> {
        let value = self.expr.eval(fields)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite)
        }
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
