use std::cmp::Ordering;

use tracing::trace;

use crate::ast::{ForLoop, Node};
use crate::builtins;
use crate::context::RequestContext;
use crate::element::{Element, Operator};
use crate::error::EvalError;
use crate::multistack::Multistack;
use crate::value::ValueWrapper;

/// Knobs the host can set around an execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Abort a FOR loop once it has run this many iterations.
    pub max_loop_iterations: Option<u64>,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_loop_iterations(mut self, limit: u64) -> Self {
        self.max_loop_iterations = Some(limit);
        self
    }
}

/// Walks a parsed document once, writing to a [`RequestContext`].
///
/// The tree is only read, so one document can be executed by several
/// engines, each with its own context.
pub struct Engine<'a, C: RequestContext + ?Sized> {
    document: &'a Node,
    context: &'a mut C,
    options: EngineOptions,
    variables: Multistack,
}

impl<'a, C: RequestContext + ?Sized> Engine<'a, C> {
    pub fn new(document: &'a Node, context: &'a mut C) -> Self {
        Self {
            document,
            context,
            options: EngineOptions::default(),
            variables: Multistack::new(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn execute(&mut self) -> Result<(), EvalError> {
        self.variables = Multistack::new();
        let document = self.document;
        self.visit(document)
    }

    fn visit(&mut self, node: &Node) -> Result<(), EvalError> {
        match node {
            Node::Document(children) => children.iter().try_for_each(|child| self.visit(child)),
            Node::Text(text) => Ok(self.context.write(text)?),
            Node::ForLoop(for_loop) => self.run_loop(for_loop),
            Node::Echo(elements) => self.echo(elements),
        }
    }

    fn run_loop(&mut self, for_loop: &ForLoop) -> Result<(), EvalError> {
        let name = for_loop.variable.as_str();
        let start = self.value_of(&for_loop.start)?;
        let end = self.value_of(&for_loop.end)?;
        let step = match &for_loop.step {
            Some(step) => self.value_of(step)?,
            None => ValueWrapper::Integer(1),
        };

        self.variables.push(name, start);
        let mut iterations = 0u64;
        while self.variables.peek(name)?.compare(&end)? != Ordering::Greater {
            if let Some(limit) = self.options.max_loop_iterations {
                if iterations >= limit {
                    return Err(EvalError::IterationLimit {
                        variable: name.to_string(),
                        limit,
                    });
                }
            }
            iterations += 1;
            trace!(variable = name, iteration = iterations, "loop iteration");

            for child in &for_loop.children {
                self.visit(child)?;
            }
            self.variables.peek_mut(name)?.add(&step)?;
        }
        self.variables.pop(name)?;
        Ok(())
    }

    fn echo(&mut self, elements: &[Element]) -> Result<(), EvalError> {
        let mut stack: Vec<ValueWrapper> = Vec::new();
        for element in elements {
            match element {
                Element::Operator(op) => {
                    let underflow = || EvalError::OperandUnderflow(op.to_string());
                    let rhs = stack.pop().ok_or_else(underflow)?;
                    let mut lhs = stack.pop().ok_or_else(underflow)?;
                    apply(*op, &mut lhs, &rhs)?;
                    stack.push(lhs);
                }
                Element::Function(name) => builtins::call(name, &mut stack, &mut *self.context)?,
                value => stack.push(self.value_of(value)?),
            }
        }

        for value in &stack {
            self.context.write(&value.to_string())?;
        }
        Ok(())
    }

    /// Constants become fresh values; variables are copied off their stack
    /// so a later loop increment cannot reach them.
    fn value_of(&self, element: &Element) -> Result<ValueWrapper, EvalError> {
        match element {
            Element::StringConst(value) => Ok(ValueWrapper::String(value.clone())),
            Element::IntegerConst(value) => Ok(ValueWrapper::Integer(*value)),
            Element::DoubleConst(value) => Ok(ValueWrapper::Double(*value)),
            Element::Variable(name) => self.variables.peek(name).cloned(),
            Element::Function(_) | Element::Operator(_) => {
                Err(EvalError::NotAValue(element.describe()))
            }
        }
    }
}

fn apply(op: Operator, lhs: &mut ValueWrapper, rhs: &ValueWrapper) -> Result<(), EvalError> {
    match op {
        Operator::Add => lhs.add(rhs),
        Operator::Sub => lhs.subtract(rhs),
        Operator::Mul => lhs.multiply(rhs),
        Operator::Div => lhs.divide(rhs),
        Operator::Pow => lhs.power(rhs),
    }
}
