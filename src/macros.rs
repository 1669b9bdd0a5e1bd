// ABOUTME: Macro definition extraction and call-site expansion

use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval_expression;
use crate::modify::{modify_program, no_pre};
use crate::value::Value;
use std::rc::Rc;

/// `DefineMacros(program, env)` (§4.5) — extracts every top-level `let name = macro(...)
/// {...};` statement into a `Macro` binding in `env`, removing those statements from
/// `program` while preserving the relative order of what remains. Nested macro
/// definitions (inside a block, function, etc.) are not top-level and are left alone.
pub fn define_macros(program: &mut Program, env: &Rc<Environment>) {
    let mut remaining = Vec::with_capacity(program.statements.len());

    for stmt in program.statements.drain(..) {
        match stmt {
            Statement::Let {
                name,
                value:
                    Expression::MacroLiteral {
                        parameters,
                        body,
                    },
            } => {
                env.set(
                    name,
                    Value::Macro {
                        parameters,
                        body: Rc::new(body),
                        env: env.clone(),
                    },
                );
            }
            other => remaining.push(other),
        }
    }

    program.statements = remaining;
}

/// `ExpandMacros(program, env) → program` (§4.5) — a single AST rewrite pass, built on
/// the shared `modify` walker (`crate::modify`), replacing every call site that resolves
/// to a `Macro` in `env` with the AST node its body evaluates to. Because the walker
/// rewrites a `CallExpression`'s arguments before handing the rebuilt call to `expand_post`,
/// a macro call nested inside another macro's argument is already expanded by the time the
/// outer call site is inspected, so it is expanded in this same pass too.
pub fn expand_macros(program: &Program, env: &Rc<Environment>) -> Result<Program, EvalError> {
    modify_program(program, env, &no_pre, &expand_post)
}

/// The post-visit hook driving the shared `modify` walker: once a node's children have
/// been rewritten, check whether the node itself is now a macro call site and, if so,
/// replace it with the AST its body evaluates to.
fn expand_post(expr: Expression, env: &Rc<Environment>) -> Result<Expression, EvalError> {
    if let Expression::Call {
        function,
        arguments,
    } = &expr
    {
        if let Some(name) = function.as_identifier() {
            if let Some(Value::Macro {
                parameters,
                body,
                env: def_env,
            }) = env.get(name)
            {
                return expand_macro_call(&parameters, &body, &def_env, arguments);
            }
        }
    }

    Ok(expr)
}

fn expand_macro_call(
    parameters: &[String],
    body: &Rc<BlockStatement>,
    def_env: &Rc<Environment>,
    arguments: &[Expression],
) -> Result<Expression, EvalError> {
    let call_env = Environment::enclosed(def_env.clone());
    for (param, arg) in parameters.iter().zip(arguments) {
        call_env.set(param.clone(), Value::Quote(arg.clone()));
    }

    let mut result = Value::Null;
    for stmt in &body.statements {
        result = eval_macro_body_statement(stmt, &call_env)?;
    }

    match result {
        Value::Quote(node) => Ok(node),
        _ => Err(EvalError::MacroShape),
    }
}

/// A macro body is evaluated like any block, except it is always a closed, self
/// contained evaluation — the result only needs to be a `Quote` at the end.
fn eval_macro_body_statement(stmt: &Statement, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match stmt {
        Statement::Expression(expr) => eval_expression(expr, env),
        Statement::Let { name, value } => {
            let value = eval_expression(value, env)?;
            env.set(name.clone(), value);
            Ok(Value::Null)
        }
        Statement::Return { value } => eval_expression(value, env),
    }
}
