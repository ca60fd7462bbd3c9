//! The scalar core: numbers, strings and booleans, and the coercions
//! between them.
//!
//! A [`Scalar`] remembers the kind it was created with (its preferred kind)
//! and can be read as any of the three. Binary operators coerce the right
//! operand toward the kind of the left one.

use std::cmp::Ordering;
use std::fmt;

use parley_decimal::{ArithmeticError, Decimal, RoundingMode};
use parley_ir::{BinaryOp, UnaryOp};

use crate::anomaly::{self, AnomalyResult};
use crate::config::Config;
use crate::list::MAX_LIST_LEN;

/// The three kinds a scalar can prefer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Number,
    String,
    Bool,
}

impl ScalarKind {
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Number => "Number",
            ScalarKind::String => "String",
            ScalarKind::Bool => "Bool",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decimal that carries its own precision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Number {
    value: Decimal,
    precision: u32,
}

impl Number {
    /// `value` rounded to `precision` significant digits.
    pub fn new(value: Decimal, precision: u32, mode: RoundingMode) -> Self {
        Number {
            value: value.round(precision, mode),
            precision,
        }
    }

    pub fn zero(precision: u32) -> Self {
        Number {
            value: Decimal::zero(),
            precision,
        }
    }

    /// An integer at the active precision.
    pub fn integer(value: i64, config: &Config) -> Self {
        Number::new(Decimal::from(value), config.precision, config.rounding)
    }

    pub fn from_bool(value: bool, config: &Config) -> Self {
        Number::integer(i64::from(value), config)
    }

    /// Read `text` in the active base. The empty string is zero.
    pub fn parse(text: &str, config: &Config) -> AnomalyResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Number::zero(config.precision));
        }
        let value = Decimal::parse_radix(trimmed, config.base, config.precision, config.rounding)
            .map_err(|_| anomaly::no_conversion(text, ScalarKind::Number.name()))?;
        Ok(Number {
            value,
            precision: config.precision,
        })
    }

    #[inline]
    pub fn value(&self) -> &Decimal {
        &self.value
    }

    #[inline]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Truncated integer value, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.value.to_i64()
    }

    /// The same value re-rounded to a new precision.
    #[must_use]
    pub fn with_precision(&self, precision: u32, mode: RoundingMode) -> Self {
        Number::new(self.value.clone(), precision, mode)
    }

    /// Text form: plain notation unless it needs more than
    /// `config.max_digits` digits.
    pub fn format(&self, config: &Config) -> String {
        self.value
            .round(self.precision, config.rounding)
            .to_string_with(config.max_digits)
    }
}

/// A scalar value in its preferred kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalar {
    Num(Number),
    Str(String),
    Bool(bool),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Num(_) => ScalarKind::Number,
            Scalar::Str(_) => ScalarKind::String,
            Scalar::Bool(_) => ScalarKind::Bool,
        }
    }

    pub fn as_string(&self, config: &Config) -> String {
        match self {
            Scalar::Num(number) => number.format(config),
            Scalar::Str(text) => text.clone(),
            Scalar::Bool(value) => value.to_string(),
        }
    }

    pub fn as_number(&self, config: &Config) -> AnomalyResult<Number> {
        match self {
            Scalar::Num(number) => Ok(number.clone()),
            Scalar::Str(text) => Number::parse(text, config),
            Scalar::Bool(value) => Ok(Number::from_bool(*value, config)),
        }
    }

    /// Truthiness. Text is false when empty, `false` in any case, or a
    /// numeric zero.
    pub fn as_bool(&self, config: &Config) -> bool {
        match self {
            Scalar::Num(number) => !number.is_zero(),
            Scalar::Str(text) => {
                let text = text.trim();
                !(text.is_empty()
                    || text.eq_ignore_ascii_case("false")
                    || Number::parse(text, config).is_ok_and(|n| n.is_zero()))
            }
            Scalar::Bool(value) => *value,
        }
    }

    /// Apply a binary operator, coercing `rhs` toward this scalar's kind.
    pub fn binary(&self, op: BinaryOp, rhs: &Scalar, config: &Config) -> AnomalyResult<Scalar> {
        match op {
            BinaryOp::And => {
                return Ok(Scalar::Bool(self.as_bool(config) && rhs.as_bool(config)));
            }
            BinaryOp::Or => {
                return Ok(Scalar::Bool(self.as_bool(config) || rhs.as_bool(config)));
            }
            _ => {}
        }
        match self {
            Scalar::Num(lhs) => numeric(op, lhs, &rhs.as_number(config)?, config),
            Scalar::Str(lhs) => textual(op, lhs, rhs, config),
            Scalar::Bool(lhs) => {
                if op.is_arithmetic() {
                    let lhs = Number::from_bool(*lhs, config);
                    numeric(op, &lhs, &rhs.as_number(config)?, config)
                } else {
                    Ok(Scalar::Bool(compare(op, lhs.cmp(&rhs.as_bool(config)))))
                }
            }
        }
    }

    pub fn unary(&self, op: UnaryOp, config: &Config) -> AnomalyResult<Scalar> {
        match op {
            UnaryOp::Not => Ok(Scalar::Bool(!self.as_bool(config))),
            UnaryOp::Neg => match self {
                Scalar::Num(number) => Ok(Scalar::Num(Number {
                    value: -number.value(),
                    precision: number.precision,
                })),
                Scalar::Bool(value) => {
                    let number = Number::from_bool(*value, config);
                    Ok(Scalar::Num(Number {
                        value: -number.value(),
                        precision: number.precision,
                    }))
                }
                Scalar::Str(_) => Err(anomaly::invalid_operation(
                    op.as_symbol(),
                    ScalarKind::String.name(),
                )),
            },
        }
    }
}

fn numeric(op: BinaryOp, lhs: &Number, rhs: &Number, config: &Config) -> AnomalyResult<Scalar> {
    let precision = lhs.precision.max(rhs.precision);
    let (a, b, mode) = (&lhs.value, &rhs.value, config.rounding);
    let value = match op {
        BinaryOp::Add => a.add(b, precision, mode),
        BinaryOp::Sub => a.sub(b, precision, mode),
        BinaryOp::Mul => a.mul(b, precision, mode),
        BinaryOp::Div => a.checked_div(b, precision, mode),
        BinaryOp::Rem => a.checked_rem(b),
        _ => return Ok(Scalar::Bool(compare(op, a.cmp(b)))),
    }
    .map_err(|err| match err {
        ArithmeticError::DivisionByZero => anomaly::division_by_zero(),
        ArithmeticError::Overflow => anomaly::number_out_of_range(op.as_symbol()),
    })?;
    Ok(Scalar::Num(Number::new(value, precision, mode)))
}

fn textual(op: BinaryOp, lhs: &str, rhs: &Scalar, config: &Config) -> AnomalyResult<Scalar> {
    match op {
        BinaryOp::Add => Ok(Scalar::Str(format!("{lhs}{}", rhs.as_string(config)))),
        BinaryOp::Mul => {
            let count = rhs
                .as_number(config)?
                .to_i64()
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| lhs.len().saturating_mul(*n) <= MAX_LIST_LEN)
                .ok_or_else(|| {
                    anomaly::invalid_operation(op.as_symbol(), ScalarKind::String.name())
                })?;
            Ok(Scalar::Str(lhs.repeat(count)))
        }
        BinaryOp::Sub | BinaryOp::Div | BinaryOp::Rem => Err(anomaly::invalid_operation(
            op.as_symbol(),
            ScalarKind::String.name(),
        )),
        _ => Ok(Scalar::Bool(compare(
            op,
            lhs.cmp(rhs.as_string(config).as_str()),
        ))),
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::NotEq => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::GtEq => ordering != Ordering::Less,
        _ => unreachable!("compare called with non-comparison operator {op:?}"),
    }
}
