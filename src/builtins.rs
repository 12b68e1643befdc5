//! Functions callable as `@name` inside an echo tag.
//!
//! Each function pops its arguments off the expression stack (last argument
//! on top) and pushes at most one result.

use tracing::trace;

use crate::context::RequestContext;
use crate::decfmt;
use crate::error::EvalError;
use crate::value::ValueWrapper;

#[derive(Clone, Copy)]
enum Scope {
    Request,
    Persistent,
    Transient,
}

pub fn call<C: RequestContext + ?Sized>(
    name: &str,
    stack: &mut Vec<ValueWrapper>,
    context: &mut C,
) -> Result<(), EvalError> {
    trace!(function = name, depth = stack.len(), "builtin");
    let take = |stack: &mut Vec<ValueWrapper>| pop(stack, name);

    match name {
        "sin" => {
            let degrees = take(stack)?.as_f64()?;
            stack.push(ValueWrapper::Double(degrees.to_radians().sin()));
        }
        "decfmt" => {
            let pattern = take(stack)?.to_string();
            let formatted = match take(stack)?.numeric()? {
                ValueWrapper::Integer(value) => decfmt::format_integer(value, &pattern)?,
                other => decfmt::format_double(other.as_f64()?, &pattern)?,
            };
            stack.push(ValueWrapper::String(formatted));
        }
        "dup" => {
            let top = take(stack)?;
            stack.push(top.clone());
            stack.push(top);
        }
        "swap" => {
            let top = take(stack)?;
            let below = take(stack)?;
            stack.push(top);
            stack.push(below);
        }
        "setMimeType" => {
            let mime_type = take(stack)?.to_string();
            context.set_mime_type(mime_type);
        }
        "paramGet" => param_get(name, Scope::Request, stack, context)?,
        "pparamGet" => param_get(name, Scope::Persistent, stack, context)?,
        "tparamGet" => param_get(name, Scope::Transient, stack, context)?,
        "pparamSet" | "tparamSet" => {
            let key = take(stack)?.to_string();
            let value = take(stack)?.to_string();
            if name == "pparamSet" {
                context.set_persistent_parameter(key, value);
            } else {
                context.set_transient_parameter(key, value);
            }
        }
        "pparamDel" => context.remove_persistent_parameter(&take(stack)?.to_string()),
        "tparamDel" => context.remove_transient_parameter(&take(stack)?.to_string()),
        _ => return Err(EvalError::UnknownFunction(name.to_string())),
    }
    Ok(())
}

fn pop(stack: &mut Vec<ValueWrapper>, function: &str) -> Result<ValueWrapper, EvalError> {
    stack
        .pop()
        .ok_or_else(|| EvalError::OperandUnderflow(format!("@{function}")))
}

fn param_get<C: RequestContext + ?Sized>(
    function: &str,
    scope: Scope,
    stack: &mut Vec<ValueWrapper>,
    context: &C,
) -> Result<(), EvalError> {
    let default = pop(stack, function)?;
    let key = pop(stack, function)?.to_string();
    let found = match scope {
        Scope::Request => context.parameter(&key),
        Scope::Persistent => context.persistent_parameter(&key),
        Scope::Transient => context.transient_parameter(&key),
    };
    stack.push(found.map_or(default, ValueWrapper::String));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderContext;
    use pretty_assertions::assert_eq;

    fn run(name: &str, stack: &[ValueWrapper]) -> Result<Vec<ValueWrapper>, EvalError> {
        let mut ctx = RenderContext::buffered();
        let mut stack = stack.to_vec();
        call(name, &mut stack, &mut ctx)?;
        Ok(stack)
    }

    #[test]
    fn sin_takes_degrees() {
        let result = run("sin", &[ValueWrapper::Integer(30)]).unwrap();
        let ValueWrapper::Double(value) = result[0] else {
            panic!("expected double, got {result:?}");
        };
        assert!((value - 0.5).abs() < 1e-12);
        assert_eq!(run("sin", &["0".into()]).unwrap(), vec![ValueWrapper::Double(0.0)]);
    }

    #[test]
    fn decfmt_formats_value_below_pattern() {
        let result = run("decfmt", &[ValueWrapper::Double(2.0 / 3.0), "0.000".into()]).unwrap();
        assert_eq!(result, vec![ValueWrapper::from("0.667")]);
        let result = run("decfmt", &["12".into(), "0.0".into()]).unwrap();
        assert_eq!(result, vec![ValueWrapper::from("12.0")]);
    }

    #[test]
    fn dup_and_swap() {
        let a = ValueWrapper::Integer(1);
        let b = ValueWrapper::from("b");
        assert_eq!(run("dup", &[a.clone()]).unwrap(), vec![a.clone(), a.clone()]);
        assert_eq!(run("swap", &[a.clone(), b.clone()]).unwrap(), vec![b, a]);
    }

    #[test]
    fn param_get_falls_back_to_default() {
        let mut ctx = RenderContext::buffered().with_parameter("name", "Ana");
        let mut stack = vec!["name".into(), "nobody".into(), "missing".into(), "nobody".into()];
        call("paramGet", &mut stack, &mut ctx).unwrap();
        assert_eq!(stack.pop(), Some("nobody".into()));
        call("paramGet", &mut stack, &mut ctx).unwrap();
        assert_eq!(stack, vec![ValueWrapper::from("Ana")]);
    }

    #[test]
    fn persistent_and_transient_scopes() {
        let mut ctx = RenderContext::buffered();
        let mut stack = vec![ValueWrapper::Integer(3), "count".into()];
        call("pparamSet", &mut stack, &mut ctx).unwrap();
        assert!(stack.is_empty());
        assert_eq!(ctx.persistent_parameter("count").as_deref(), Some("3"));

        stack.push("x".into());
        stack.push("t".into());
        call("tparamSet", &mut stack, &mut ctx).unwrap();
        assert_eq!(ctx.transient_parameter("t").as_deref(), Some("x"));

        stack.push("count".into());
        call("pparamDel", &mut stack, &mut ctx).unwrap();
        stack.push("t".into());
        call("tparamDel", &mut stack, &mut ctx).unwrap();
        assert_eq!(ctx.persistent_parameter("count"), None);
        assert_eq!(ctx.transient_parameter("t"), None);
    }

    #[test]
    fn set_mime_type_consumes_argument() {
        let mut ctx = RenderContext::buffered();
        let mut stack = vec!["text/plain".into()];
        call("setMimeType", &mut stack, &mut ctx).unwrap();
        assert!(stack.is_empty());
        assert_eq!(ctx.mime_type(), "text/plain");
    }

    #[test]
    fn errors() {
        assert!(matches!(run("dup", &[]), Err(EvalError::OperandUnderflow(name)) if name == "@dup"));
        assert!(matches!(run("swap", &["a".into()]), Err(EvalError::OperandUnderflow(_))));
        assert!(matches!(run("nope", &[]), Err(EvalError::UnknownFunction(name)) if name == "nope"));
        assert!(matches!(run("sin", &["abc".into()]), Err(EvalError::InvalidNumber(_))));
    }
}
