// ABOUTME: Generic post-order AST rewriter shared by unquote substitution and macro expansion

use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::env::Environment;
use crate::error::EvalError;
use std::rc::Rc;

/// The result of visiting a node before its children are walked.
pub enum PreOutcome {
    /// Use this node as-is; do not descend into its children at all. Quote uses this to
    /// avoid walking into a nested `quote(...)` subtree, and to substitute `unquote(...)`
    /// directly rather than recurse into its argument.
    Stop(Expression),
    /// Walk the node's children as usual.
    Continue,
}

/// Pre-visit hook that never stops the walk. Used by callers with nothing to do before
/// descending (macro expansion only needs a post-visit hook).
pub fn no_pre(_expr: &Expression, _env: &Rc<Environment>) -> Result<PreOutcome, EvalError> {
    Ok(PreOutcome::Continue)
}

/// Post-visit hook that leaves the rebuilt node untouched. Used by callers with nothing
/// to do after descending (quote/unquote only needs a pre-visit hook).
pub fn no_post(expr: Expression, _env: &Rc<Environment>) -> Result<Expression, EvalError> {
    Ok(expr)
}

/// `Modify(node, f)` (§9) — walks every `Expression` variant exactly once, in one place,
/// so unquote substitution (`quote.rs`) and macro expansion (`macros.rs`) share a single
/// AST rewriter instead of maintaining two hand-written copies.
///
/// `pre` runs on a node before its children are walked; returning `PreOutcome::Stop` skips
/// recursion into that subtree entirely. Otherwise every child is walked first (post-order),
/// the node is rebuilt from the walked children, and `post` is given the rebuilt node to
/// transform. Walking children before `post` sees the parent means a macro call nested
/// inside another macro's argument is already expanded by the time the outer call is
/// inspected.
pub fn modify_expression<P, Q>(
    expr: &Expression,
    env: &Rc<Environment>,
    pre: &P,
    post: &Q,
) -> Result<Expression, EvalError>
where
    P: Fn(&Expression, &Rc<Environment>) -> Result<PreOutcome, EvalError>,
    Q: Fn(Expression, &Rc<Environment>) -> Result<Expression, EvalError>,
{
    if let PreOutcome::Stop(node) = pre(expr, env)? {
        return Ok(node);
    }

    let rebuilt = match expr {
        Expression::Prefix { operator, right } => Expression::Prefix {
            operator: operator.clone(),
            right: Box::new(modify_expression(right, env, pre, post)?),
        },
        Expression::Infix {
            operator,
            left,
            right,
        } => Expression::Infix {
            operator: operator.clone(),
            left: Box::new(modify_expression(left, env, pre, post)?),
            right: Box::new(modify_expression(right, env, pre, post)?),
        },
        Expression::If {
            condition,
            consequence,
            alternative,
        } => Expression::If {
            condition: Box::new(modify_expression(condition, env, pre, post)?),
            consequence: modify_block(consequence, env, pre, post)?,
            alternative: alternative
                .as_ref()
                .map(|block| modify_block(block, env, pre, post))
                .transpose()?,
        },
        Expression::FunctionLiteral { parameters, body } => Expression::FunctionLiteral {
            parameters: parameters.clone(),
            body: modify_block(body, env, pre, post)?,
        },
        Expression::MacroLiteral { parameters, body } => Expression::MacroLiteral {
            parameters: parameters.clone(),
            body: modify_block(body, env, pre, post)?,
        },
        Expression::Call {
            function,
            arguments,
        } => Expression::Call {
            function: Box::new(modify_expression(function, env, pre, post)?),
            arguments: arguments
                .iter()
                .map(|a| modify_expression(a, env, pre, post))
                .collect::<Result<Vec<_>, _>>()?,
        },
        Expression::ArrayLiteral(elements) => Expression::ArrayLiteral(
            elements
                .iter()
                .map(|e| modify_expression(e, env, pre, post))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Expression::Index { left, index } => Expression::Index {
            left: Box::new(modify_expression(left, env, pre, post)?),
            index: Box::new(modify_expression(index, env, pre, post)?),
        },
        Expression::HashLiteral(pairs) => Expression::HashLiteral(
            pairs
                .iter()
                .map(|(k, v)| {
                    Ok((
                        modify_expression(k, env, pre, post)?,
                        modify_expression(v, env, pre, post)?,
                    ))
                })
                .collect::<Result<Vec<_>, EvalError>>()?,
        ),
        Expression::Identifier(_)
        | Expression::IntegerLiteral(_)
        | Expression::Boolean(_)
        | Expression::StringLiteral(_) => expr.clone(),
    };

    post(rebuilt, env)
}

pub fn modify_statement<P, Q>(
    stmt: &Statement,
    env: &Rc<Environment>,
    pre: &P,
    post: &Q,
) -> Result<Statement, EvalError>
where
    P: Fn(&Expression, &Rc<Environment>) -> Result<PreOutcome, EvalError>,
    Q: Fn(Expression, &Rc<Environment>) -> Result<Expression, EvalError>,
{
    Ok(match stmt {
        Statement::Let { name, value } => Statement::Let {
            name: name.clone(),
            value: modify_expression(value, env, pre, post)?,
        },
        Statement::Return { value } => Statement::Return {
            value: modify_expression(value, env, pre, post)?,
        },
        Statement::Expression(expr) => {
            Statement::Expression(modify_expression(expr, env, pre, post)?)
        }
    })
}

pub fn modify_block<P, Q>(
    block: &BlockStatement,
    env: &Rc<Environment>,
    pre: &P,
    post: &Q,
) -> Result<BlockStatement, EvalError>
where
    P: Fn(&Expression, &Rc<Environment>) -> Result<PreOutcome, EvalError>,
    Q: Fn(Expression, &Rc<Environment>) -> Result<Expression, EvalError>,
{
    Ok(BlockStatement {
        statements: block
            .statements
            .iter()
            .map(|stmt| modify_statement(stmt, env, pre, post))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

pub fn modify_program<P, Q>(
    program: &Program,
    env: &Rc<Environment>,
    pre: &P,
    post: &Q,
) -> Result<Program, EvalError>
where
    P: Fn(&Expression, &Rc<Environment>) -> Result<PreOutcome, EvalError>,
    Q: Fn(Expression, &Rc<Environment>) -> Result<Expression, EvalError>,
{
    Ok(Program {
        statements: program
            .statements
            .iter()
            .map(|stmt| modify_statement(stmt, env, pre, post))
            .collect::<Result<Vec<_>, _>>()?,
    })
}
