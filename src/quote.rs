// ABOUTME: Quote/unquote — the special form and its AST rewrite

use crate::ast::Expression;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval_expression;
use crate::modify::{modify_expression, no_post, PreOutcome};
use crate::value::Value;
use std::rc::Rc;

/// `QuoteArgument(arg, env)` (§4.4) — rewrites every `unquote(expr)` call site in `arg`
/// with a synthesized AST node representing `expr`'s evaluated value, then wraps the
/// result as a `Quote`. Does not descend into nested `quote(...)` subtrees.
pub fn quote_argument(arg: &Expression, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let rewritten = modify_expression(arg, env, &quote_pre, &no_post)?;
    Ok(Value::Quote(rewritten))
}

/// The pre-visit hook driving the shared `modify` walker (`crate::modify`): stop at a
/// nested `quote(...)` call (leave it untouched, do not descend), and substitute an
/// `unquote(...)` call site with its evaluated argument before the walker ever looks at
/// that argument's own structure.
fn quote_pre(expr: &Expression, env: &Rc<Environment>) -> Result<PreOutcome, EvalError> {
    if let Expression::Call { function, .. } = expr {
        if function.as_identifier() == Some("quote") {
            return Ok(PreOutcome::Stop(expr.clone()));
        }
    }

    if let Some(arg) = as_unquote_call(expr) {
        let value = eval_expression(arg, env)?;
        return Ok(PreOutcome::Stop(value_to_ast(value)?));
    }

    Ok(PreOutcome::Continue)
}

/// Converts an evaluated `unquote` argument back into an AST node, per §4.4's
/// value-to-AST conversion table.
fn value_to_ast(value: Value) -> Result<Expression, EvalError> {
    match value {
        Value::Integer(n) => Ok(Expression::IntegerLiteral(n)),
        Value::Boolean(b) => Ok(Expression::Boolean(b)),
        Value::Quote(node) => Ok(node),
        other => Err(EvalError::Custom(format!(
            "unquote produced a non-AST value: {}",
            other.type_name()
        ))),
    }
}

/// True iff `expr` is a call to the bare identifier `unquote`.
fn as_unquote_call(expr: &Expression) -> Option<&Expression> {
    match expr {
        Expression::Call {
            function,
            arguments,
        } if function.as_identifier() == Some("unquote") && arguments.len() == 1 => {
            Some(&arguments[0])
        }
        _ => None,
    }
}
