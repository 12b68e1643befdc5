//! Error types for the three pipeline stages.
//!
//! Lexing errors carry no position; the parser wraps them into a
//! [`ParseError`] together with the line the lexer stopped on. Evaluation
//! errors abort the current `execute()` and leave already-written output
//! in the sink.

use std::io;
use thiserror::Error;

/// Malformed input detected while tokenizing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),

    #[error("backslash at end of input")]
    TrailingBackslash,

    #[error("`{{` must be followed by `$` (write `\\{{` for a literal brace)")]
    BraceWithoutDollar,

    #[error("`$` must be followed by `}}` inside a tag")]
    DollarWithoutBrace,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("tag is not closed before end of input")]
    UnclosedTag,

    #[error("illegal character `{0}` inside tag")]
    IllegalCharacter(char),

    #[error("numeric literal `{0}` is out of range")]
    NumberOutOfRange(String),

    #[error("lexer already produced end of input")]
    Exhausted,
}

/// Template structure errors. No partial tree is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {line}: {source}")]
    Lex {
        line: usize,
        #[source]
        source: LexError,
    },

    #[error("line {line}: expected tag name, found {found}")]
    MissingTagName { line: usize, found: String },

    #[error("line {line}: unknown tag `{name}`")]
    UnknownTag { line: usize, name: String },

    #[error("line {line}: FOR expects a variable, found {found}")]
    ForVariable { line: usize, found: String },

    #[error("line {line}: FOR takes 2 or 3 arguments after the variable, found {count}")]
    ForArity { line: usize, count: usize },

    #[error("line {line}: {found} cannot be used as a FOR argument")]
    ForElement { line: usize, found: String },

    #[error("line {line}: END without an open FOR")]
    UnmatchedEnd { line: usize },

    #[error("line {line}: {open} FOR tag(s) left open at end of input")]
    UnclosedFor { line: usize, open: usize },

    #[error("line {line}: expected `$}}`, found {found}")]
    TagNotClosed { line: usize, found: String },
}

impl ParseError {
    /// Line the error was detected on (1-based).
    pub fn line(&self) -> usize {
        match self {
            ParseError::Lex { line, .. }
            | ParseError::MissingTagName { line, .. }
            | ParseError::UnknownTag { line, .. }
            | ParseError::ForVariable { line, .. }
            | ParseError::ForArity { line, .. }
            | ParseError::ForElement { line, .. }
            | ParseError::UnmatchedEnd { line }
            | ParseError::UnclosedFor { line, .. }
            | ParseError::TagNotClosed { line, .. } => *line,
        }
    }
}

/// Failure while executing a parsed document.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("stack `{0}` is empty")]
    EmptyStack(String),

    #[error("`{0}` is not a number")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in `{0}`")]
    Overflow(&'static str),

    #[error("unknown function `@{0}`")]
    UnknownFunction(String),

    #[error("{0} cannot be used as a value")]
    NotAValue(String),

    #[error("`{0}` needs more operands than the expression stack holds")]
    OperandUnderflow(String),

    #[error("invalid decimal format pattern `{0}`")]
    InvalidFormat(String),

    #[error("FOR `{variable}` exceeded {limit} iterations")]
    IterationLimit { variable: String, limit: u64 },

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Any failure of [`crate::render`].
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
