//! smartscript: a small `{$ ... $}` templating engine.
//!
//! A template is plain text with embedded tags. The pipeline is a
//! mode-driven lexer, a parser building a [`Node`] tree, and an [`Engine`]
//! walking that tree against a [`RequestContext`] that receives all output
//! and owns the parameter scopes.
//!
//! Syntax:
//! - Text outside tags; `\\`, `\{` and `\}` are the only escapes.
//! - `{$= expr ... $}` evaluates a postfix expression: constants and
//!   variables push, `+ - * / ^` pop two and push one, `@name` calls a
//!   built-in. Whatever is left on the stack is written out, bottom first.
//! - `{$ FOR var start end [step] $} ... {$END$}` counts `var` from `start`
//!   up to and including `end`. Tag names are case-insensitive.
//! - Strings are `"..."` with `\\`, `\"`, `\n`, `\t` and `\r` escapes.
//!
//! Arithmetic is dynamically typed: numeric strings are parsed on use and
//! integer operands stay integers (see [`ValueWrapper`]).
//!
//! Built-ins: `@sin` (degrees), `@decfmt`, `@dup`, `@swap`, `@setMimeType`,
//! `@paramGet`, `@pparamGet`, `@tparamGet`, `@pparamSet`, `@tparamSet`,
//! `@pparamDel`, `@tparamDel`.
//!
//! ```
//! let output = smartscript::render_to_string("{$FOR i 1 3 $}{$= i i * $} {$END$}").unwrap();
//! assert_eq!(output, "1 4 9 ");
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod ast;
pub mod builtins;
pub mod context;
pub mod decfmt;
pub mod element;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod multistack;
pub mod parser;
pub mod value;

pub use ast::{ForLoop, Node};
pub use context::{RenderContext, RequestContext};
pub use element::{Element, Operator};
pub use error::{Error, EvalError, LexError, ParseError};
pub use eval::{Engine, EngineOptions};
pub use lexer::{Lexer, LexerMode, Token};
pub use multistack::Multistack;
pub use parser::{parse, Parser};
pub use value::ValueWrapper;

/// Parse `template` and execute it once against `context`.
///
/// Output written before an evaluation error stays in the context.
pub fn render<C: RequestContext + ?Sized>(template: &str, context: &mut C) -> Result<(), Error> {
    let document = parse(template)?;
    Engine::new(&document, context).execute()?;
    Ok(())
}

/// Render with an empty in-memory context and return the output.
pub fn render_to_string(template: &str) -> Result<String, Error> {
    let mut context = RenderContext::buffered();
    render(template, &mut context)?;
    Ok(context.output())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_reports_parse_errors() {
        assert!(matches!(render_to_string("{$END$}"), Err(Error::Parse(_))));
    }

    #[test]
    fn render_reports_eval_errors() {
        assert!(matches!(render_to_string("{$= 1 0 / $}"), Err(Error::Eval(_))));
    }

    #[test]
    fn render_uses_given_context() {
        let mut ctx = RenderContext::buffered().with_parameter("who", "world");
        render("Hello {$= \"who\" \"?\" @paramGet $}!", &mut ctx).unwrap();
        assert_eq!(ctx.output(), "Hello world!");
    }
}
