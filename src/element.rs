//! Leaf values of a tag body.

use std::fmt;

use crate::value::double_to_string;

/// Doubles closer than this compare equal.
const DOUBLE_EPSILON: f64 = 1e-9;

/// Binary operators usable inside an echo tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            '^' => Some(Operator::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Pow => '^',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An immutable tag-body element.
///
/// `Display` yields the canonical source text of the element, so a tag
/// body can be re-emitted and lexed back to the same elements.
#[derive(Debug, Clone)]
pub enum Element {
    StringConst(String),
    IntegerConst(i64),
    DoubleConst(f64),
    Variable(String),
    Function(String),
    Operator(Operator),
}

impl Element {
    /// Short description used in parser diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Element::StringConst(_) => format!("string {self}"),
            Element::IntegerConst(_) | Element::DoubleConst(_) => format!("number {self}"),
            Element::Variable(name) => format!("variable `{name}`"),
            Element::Function(name) => format!("function `@{name}`"),
            Element::Operator(op) => format!("operator `{op}`"),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::StringConst(a), Element::StringConst(b)) => a == b,
            (Element::IntegerConst(a), Element::IntegerConst(b)) => a == b,
            (Element::DoubleConst(a), Element::DoubleConst(b)) => {
                a == b || (a - b).abs() < DOUBLE_EPSILON
            }
            (Element::Variable(a), Element::Variable(b)) => a == b,
            (Element::Function(a), Element::Function(b)) => a == b,
            (Element::Operator(a), Element::Operator(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::StringConst(value) => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '"' => f.write_str("\\\"")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Element::IntegerConst(value) => write!(f, "{value}"),
            Element::DoubleConst(value) => f.write_str(&double_to_string(*value)),
            Element::Variable(name) => f.write_str(name),
            Element::Function(name) => write!(f, "@{name}"),
            Element::Operator(op) => write!(f, "{op}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_const_renders_quoted_and_escaped() {
        let element = Element::StringConst("a \"b\"\\\n\t\r".into());
        assert_eq!(element.to_string(), r#""a \"b\"\\\n\t\r""#);
    }

    #[test]
    fn references_render_bare() {
        assert_eq!(Element::Variable("i".into()).to_string(), "i");
        assert_eq!(Element::Function("sin".into()).to_string(), "@sin");
        assert_eq!(Element::Operator(Operator::Div).to_string(), "/");
        assert_eq!(Element::IntegerConst(-42).to_string(), "-42");
        assert_eq!(Element::DoubleConst(2.5).to_string(), "2.5");
    }

    #[test]
    fn doubles_compare_within_epsilon() {
        assert_eq!(Element::DoubleConst(0.1 + 0.2), Element::DoubleConst(0.3));
        assert_ne!(Element::DoubleConst(1.0), Element::DoubleConst(1.1));
        assert_ne!(Element::DoubleConst(1.0), Element::IntegerConst(1));
    }

    #[test]
    fn operator_symbols_round_trip() {
        for symbol in ['+', '-', '*', '/', '^'] {
            let op = Operator::from_symbol(symbol).unwrap();
            assert_eq!(op.symbol(), symbol);
        }
        assert_eq!(Operator::from_symbol('%'), None);
    }
}
