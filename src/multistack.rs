//! Named stacks of values, one per loop variable.

use std::collections::HashMap;

use crate::error::EvalError;
use crate::value::ValueWrapper;

/// Maps a name to an independent stack of [`ValueWrapper`]s.
///
/// A name whose stack has been popped empty is forgotten, so it behaves
/// exactly like a name that was never pushed.
#[derive(Debug, Default)]
pub struct Multistack {
    stacks: HashMap<String, Vec<ValueWrapper>>,
}

impl Multistack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: ValueWrapper) {
        self.stacks.entry(name.into()).or_default().push(value);
    }

    pub fn pop(&mut self, name: &str) -> Result<ValueWrapper, EvalError> {
        let stack = self
            .stacks
            .get_mut(name)
            .ok_or_else(|| EvalError::EmptyStack(name.to_string()))?;
        let value = stack
            .pop()
            .ok_or_else(|| EvalError::EmptyStack(name.to_string()))?;
        if stack.is_empty() {
            self.stacks.remove(name);
        }
        Ok(value)
    }

    pub fn peek(&self, name: &str) -> Result<&ValueWrapper, EvalError> {
        self.stacks
            .get(name)
            .and_then(|stack| stack.last())
            .ok_or_else(|| EvalError::EmptyStack(name.to_string()))
    }

    /// Top of the stack for in-place updates (loop counter increments).
    pub fn peek_mut(&mut self, name: &str) -> Result<&mut ValueWrapper, EvalError> {
        self.stacks
            .get_mut(name)
            .and_then(|stack| stack.last_mut())
            .ok_or_else(|| EvalError::EmptyStack(name.to_string()))
    }

    pub fn is_empty(&self, name: &str) -> bool {
        self.stacks.get(name).map_or(true, Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn push_pop_is_lifo() {
        let mut stack = Multistack::new();
        stack.push("i", ValueWrapper::Integer(1));
        stack.push("i", ValueWrapper::Integer(2));
        assert_eq!(stack.peek("i").unwrap(), &ValueWrapper::Integer(2));
        assert_eq!(stack.pop("i").unwrap(), ValueWrapper::Integer(2));
        assert_eq!(stack.pop("i").unwrap(), ValueWrapper::Integer(1));
        assert!(stack.is_empty("i"));
    }

    #[test]
    fn absent_and_drained_names_fail() {
        let mut stack = Multistack::new();
        assert!(stack.is_empty("x"));
        assert!(matches!(stack.pop("x"), Err(EvalError::EmptyStack(name)) if name == "x"));
        assert!(stack.peek("x").is_err());

        stack.push("x", ValueWrapper::None);
        stack.pop("x").unwrap();
        assert!(stack.peek("x").is_err());
        assert!(stack.peek_mut("x").is_err());
    }

    #[test]
    fn names_are_independent() {
        let mut stack = Multistack::new();
        stack.push("a", ValueWrapper::Integer(1));
        stack.push("b", ValueWrapper::from("two"));
        stack.push("a", ValueWrapper::Integer(3));
        assert_eq!(stack.pop("b").unwrap(), ValueWrapper::from("two"));
        assert!(stack.is_empty("b"));
        assert_eq!(stack.peek("a").unwrap(), &ValueWrapper::Integer(3));
    }

    #[test]
    fn peek_mut_updates_in_place() {
        let mut stack = Multistack::new();
        stack.push("i", ValueWrapper::Integer(1));
        stack.peek_mut("i").unwrap().add(&ValueWrapper::Integer(1)).unwrap();
        assert_eq!(stack.pop("i").unwrap(), ValueWrapper::Integer(2));
    }
}
