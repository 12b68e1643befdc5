//! Dynamically typed values and the arithmetic coercion rules.
//!
//! Every binary operation normalizes both operands the same way before
//! computing:
//!
//! - `None` counts as integer `0`;
//! - a `String` is parsed as a double if it contains `.`, `e` or `E`,
//!   otherwise as an integer, and fails if it does not parse;
//! - if either side is a double the operation is carried out in floating
//!   point, otherwise in checked integer arithmetic.

use std::cmp::Ordering;
use std::fmt;

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueWrapper {
    #[default]
    None,
    Integer(i64),
    Double(f64),
    String(String),
}

/// A value after coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Integer(i64),
    Double(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Double(d) => d,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Integer(i) => i == 0,
            Number::Double(d) => d == 0.0,
        }
    }
}

impl From<Number> for ValueWrapper {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(i) => ValueWrapper::Integer(i),
            Number::Double(d) => ValueWrapper::Double(d),
        }
    }
}

impl From<i64> for ValueWrapper {
    fn from(value: i64) -> Self {
        ValueWrapper::Integer(value)
    }
}

impl From<f64> for ValueWrapper {
    fn from(value: f64) -> Self {
        ValueWrapper::Double(value)
    }
}

impl From<String> for ValueWrapper {
    fn from(value: String) -> Self {
        ValueWrapper::String(value)
    }
}

impl From<&str> for ValueWrapper {
    fn from(value: &str) -> Self {
        ValueWrapper::String(value.to_string())
    }
}

impl ValueWrapper {
    pub fn add(&mut self, other: &ValueWrapper) -> Result<(), EvalError> {
        self.apply(other, "+", i64::checked_add, |a, b| a + b)
    }

    pub fn subtract(&mut self, other: &ValueWrapper) -> Result<(), EvalError> {
        self.apply(other, "-", i64::checked_sub, |a, b| a - b)
    }

    pub fn multiply(&mut self, other: &ValueWrapper) -> Result<(), EvalError> {
        self.apply(other, "*", i64::checked_mul, |a, b| a * b)
    }

    /// Integer division truncates toward zero.
    pub fn divide(&mut self, other: &ValueWrapper) -> Result<(), EvalError> {
        if other.to_number()?.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        self.apply(other, "/", i64::checked_div, |a, b| a / b)
    }

    /// Integer result only for integer operands with a non-negative exponent.
    pub fn power(&mut self, other: &ValueWrapper) -> Result<(), EvalError> {
        let result = match (self.to_number()?, other.to_number()?) {
            (Number::Integer(base), Number::Integer(exp)) if exp >= 0 => {
                Number::Integer(integer_power(base, exp)?)
            }
            (base, exp) => Number::Double(base.as_f64().powf(exp.as_f64())),
        };
        *self = result.into();
        Ok(())
    }

    /// Three-way comparison under the same coercion; mutates neither side.
    pub fn compare(&self, other: &ValueWrapper) -> Result<Ordering, EvalError> {
        Ok(match (self.to_number()?, other.to_number()?) {
            (Number::Integer(a), Number::Integer(b)) => a.cmp(&b),
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
            }
        })
    }

    /// The coerced number as an `Integer` or `Double` wrapper.
    pub fn numeric(&self) -> Result<ValueWrapper, EvalError> {
        self.to_number().map(ValueWrapper::from)
    }

    /// Numeric value as a double, after coercion.
    pub fn as_f64(&self) -> Result<f64, EvalError> {
        self.to_number().map(Number::as_f64)
    }

    fn apply(
        &mut self,
        other: &ValueWrapper,
        op: &'static str,
        int_op: fn(i64, i64) -> Option<i64>,
        double_op: fn(f64, f64) -> f64,
    ) -> Result<(), EvalError> {
        let result = match (self.to_number()?, other.to_number()?) {
            (Number::Integer(a), Number::Integer(b)) => {
                Number::Integer(int_op(a, b).ok_or(EvalError::Overflow(op))?)
            }
            (a, b) => Number::Double(double_op(a.as_f64(), b.as_f64())),
        };
        *self = result.into();
        Ok(())
    }

    fn to_number(&self) -> Result<Number, EvalError> {
        match self {
            ValueWrapper::None => Ok(Number::Integer(0)),
            ValueWrapper::Integer(i) => Ok(Number::Integer(*i)),
            ValueWrapper::Double(d) => Ok(Number::Double(*d)),
            ValueWrapper::String(s) => parse_number(s),
        }
    }
}

/// `base^exp` for `exp >= 0`; bases 0 and ±1 never overflow.
fn integer_power(base: i64, exp: i64) -> Result<i64, EvalError> {
    match base {
        0 => Ok(i64::from(exp == 0)),
        1 => Ok(1),
        -1 => Ok(if exp % 2 == 0 { 1 } else { -1 }),
        _ => u32::try_from(exp)
            .ok()
            .and_then(|exp| base.checked_pow(exp))
            .ok_or(EvalError::Overflow("^")),
    }
}

fn parse_number(text: &str) -> Result<Number, EvalError> {
    let invalid = || EvalError::InvalidNumber(text.to_string());
    if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().map(Number::Double).map_err(|_| invalid())
    } else {
        text.parse::<i64>().map(Number::Integer).map_err(|_| invalid())
    }
}

impl fmt::Display for ValueWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueWrapper::None => Ok(()),
            ValueWrapper::Integer(i) => write!(f, "{i}"),
            ValueWrapper::Double(d) => f.write_str(&double_to_string(*d)),
            ValueWrapper::String(s) => f.write_str(s),
        }
    }
}

/// Canonical text of a double: always carries a fraction (`3.0`), switches
/// to `d.dddE±n` outside `[1e-3, 1e7)`.
pub fn double_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{value:?}");
    }
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{mantissa}E{exponent}")
    } else {
        format!("{mantissa}.0E{exponent}")
    }
}
