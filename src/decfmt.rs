//! Decimal format patterns for `@decfmt`.
//!
//! Supported pattern syntax: an optional literal prefix and suffix around a
//! number part made of `#` (optional digit), `0` (required digit), `,`
//! (grouping separator in the integer part) and a single `.` followed by the
//! fraction slots. Text in single quotes is literal and `''` is an
//! apostrophe. An unquoted `%` or `‰` in the prefix or suffix scales the
//! value by 100 or 1000. Rounding is half-even.

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    prefix: String,
    suffix: String,
    min_integer: usize,
    grouping: Option<usize>,
    min_fraction: usize,
    max_fraction: usize,
    multiplier: u32,
}

impl Pattern {
    fn parse(pattern: &str) -> Result<Self, EvalError> {
        let invalid = || EvalError::InvalidFormat(pattern.to_string());
        let is_number_char = |c: char| matches!(c, '#' | '0' | ',' | '.');

        let mut prefix = String::new();
        let mut number = String::new();
        let mut suffix = String::new();
        let mut multiplier = 1;
        let mut quoted = false;
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            let literal = match c {
                '\'' if chars.next_if_eq(&'\'').is_some() => '\'',
                '\'' => {
                    quoted = !quoted;
                    continue;
                }
                _ if quoted => c,
                _ if is_number_char(c) => {
                    if !suffix.is_empty() {
                        return Err(invalid());
                    }
                    number.push(c);
                    continue;
                }
                '%' | '‰' => {
                    if multiplier != 1 {
                        return Err(invalid());
                    }
                    multiplier = if c == '%' { 100 } else { 1000 };
                    c
                }
                _ => c,
            };
            if number.is_empty() {
                prefix.push(literal);
            } else {
                suffix.push(literal);
            }
        }
        if quoted || !number.contains(['#', '0']) {
            return Err(invalid());
        }

        let (integer, fraction) = match number.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (number.as_str(), ""),
        };
        if fraction.contains(['.', ',']) {
            return Err(invalid());
        }
        // Required fraction digits must come before optional ones.
        if fraction.trim_start_matches('0').contains('0') {
            return Err(invalid());
        }

        let grouping = integer
            .rfind(',')
            .map(|idx| integer.len() - idx - 1)
            .filter(|size| *size > 0);
        if integer.contains(',') && grouping.is_none() {
            return Err(invalid());
        }

        Ok(Self {
            prefix,
            suffix,
            min_integer: integer.matches('0').count(),
            grouping,
            min_fraction: fraction.matches('0').count(),
            max_fraction: fraction.len(),
            multiplier,
        })
    }

    fn format_digits(&self, negative: bool, integer: &str, fraction: &str) -> String {
        let mut fraction = fraction.to_string();
        while fraction.len() > self.min_fraction && fraction.ends_with('0') {
            fraction.pop();
        }
        while fraction.len() < self.min_fraction {
            fraction.push('0');
        }

        let mut integer = integer.trim_start_matches('0').to_string();
        while integer.len() < self.min_integer {
            integer.insert(0, '0');
        }
        if integer.is_empty() && fraction.is_empty() {
            integer.push('0');
        }
        if let Some(size) = self.grouping {
            integer = group(&integer, size);
        }

        let is_zero = !integer.chars().chain(fraction.chars()).any(|c| c.is_ascii_digit() && c != '0');
        let mut out = self.prefix.clone();
        if negative && !is_zero {
            out.push('-');
        }
        out.push_str(&integer);
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(&fraction);
        }
        out.push_str(&self.suffix);
        out
    }
}

fn group(digits: &str, size: usize) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / size);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % size == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_integer(value: i64, pattern: &str) -> Result<String, EvalError> {
    let pattern = Pattern::parse(pattern)?;
    let scaled = i128::from(value) * i128::from(pattern.multiplier);
    let digits = scaled.unsigned_abs().to_string();
    Ok(pattern.format_digits(value < 0, &digits, ""))
}

pub fn format_double(value: f64, pattern: &str) -> Result<String, EvalError> {
    let pattern = Pattern::parse(pattern)?;
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return Ok(format!("{}{sign}∞{}", pattern.prefix, pattern.suffix));
    }
    let scaled = value.abs() * f64::from(pattern.multiplier);
    let rounded = format!("{:.*}", pattern.max_fraction, scaled);
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    Ok(pattern.format_digits(value.is_sign_negative(), integer, fraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_fraction() {
        assert_eq!(format_double(3.14159, "0.000").unwrap(), "3.142");
        assert_eq!(format_double(2.0, "0.00").unwrap(), "2.00");
        assert_eq!(format_integer(7, "0.0").unwrap(), "7.0");
    }

    #[test]
    fn optional_digits() {
        assert_eq!(format_double(2.5, "#.##").unwrap(), "2.5");
        assert_eq!(format_double(0.5, "#.##").unwrap(), ".5");
        assert_eq!(format_double(0.0, "#.##").unwrap(), "0");
        assert_eq!(format_double(1.0, "0.##").unwrap(), "1");
    }

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(format_double(0.126, "0.00").unwrap(), "0.13");
        assert_eq!(format_double(0.124, "0.00").unwrap(), "0.12");
        assert_eq!(format_double(7.6, "0").unwrap(), "8");
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(format_double(0.125, "0.00").unwrap(), "0.12");
        assert_eq!(format_double(2.5, "0").unwrap(), "2");
    }

    #[test]
    fn percent_and_per_mille_scale_the_value() {
        assert_eq!(format_double(0.5, "0%").unwrap(), "50%");
        assert_eq!(format_double(0.1234, "#0.0 %").unwrap(), "12.3 %");
        assert_eq!(format_integer(-3, "0‰").unwrap(), "-3000‰");
        assert_eq!(format_integer(i64::MIN, "0%").unwrap(), "-922337203685477580800%");
        assert_eq!(format_double(0.5, "0 '%'").unwrap(), "0 %");
        assert!(matches!(format_double(0.5, "%0%"), Err(EvalError::InvalidFormat(_))));
    }

    #[test]
    fn doubled_quote_is_an_apostrophe() {
        assert_eq!(format_integer(5, "0 'it''s'").unwrap(), "5 it's");
        assert_eq!(format_integer(5, "0''").unwrap(), "5'");
    }

    #[test]
    fn grouping_and_padding() {
        assert_eq!(format_integer(1234567, "#,##0").unwrap(), "1,234,567");
        assert_eq!(format_double(-1234.5, "#,##0.00").unwrap(), "-1,234.50");
        assert_eq!(format_integer(5, "000").unwrap(), "005");
    }

    #[test]
    fn prefix_and_suffix() {
        assert_eq!(format_double(9.5, "$0.00 'each'").unwrap(), "$9.50 each");
        assert_eq!(format_integer(-3, "(0)").unwrap(), "(-3)");
    }

    #[test]
    fn negative_zero_drops_sign() {
        assert_eq!(format_double(-0.001, "0.00").unwrap(), "0.00");
    }

    #[test]
    fn invalid_patterns() {
        for pattern in ["", "abc", "0.0.0", "0.#0", "0,", "'0"] {
            assert!(
                matches!(format_double(1.0, pattern), Err(EvalError::InvalidFormat(_))),
                "pattern {pattern:?} should be rejected"
            );
        }
    }
}
