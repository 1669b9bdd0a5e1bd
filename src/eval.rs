// ABOUTME: The core evaluator — Eval(node, env) dispatch over every AST node variant

use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::env::Environment;
use crate::error::EvalError;
use crate::quote::quote_argument;
use crate::value::Value;
use std::rc::Rc;

/// Evaluates a whole program. A top-level `return` unwraps immediately (§4.1's Program
/// rule); an empty program produces `Null`.
pub fn eval_program(program: &Program, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Null;
    for stmt in &program.statements {
        result = eval_statement(stmt, env)?;
        if let Value::ReturnValue(inner) = result {
            return Ok(*inner);
        }
    }
    Ok(result)
}

/// Evaluates a single expression in `env`. The entry point most tests and the quote
/// machinery use directly, since they rarely need a whole `Program` wrapper.
pub fn eval_expression(expr: &Expression, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match expr {
        Expression::IntegerLiteral(n) => Ok(Value::Integer(*n)),
        Expression::Boolean(b) => Ok(Value::Boolean(*b)),
        Expression::StringLiteral(s) => Ok(Value::String(s.clone())),

        Expression::Identifier(name) => eval_identifier(name, env),

        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env)?;
            eval_prefix_expression(operator, &right)
        }

        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, env)?;
            let right = eval_expression(right, env)?;
            eval_infix_expression(operator, &left, &right)
        }

        Expression::If {
            condition,
            consequence,
            alternative,
        } => eval_if_expression(condition, consequence, alternative.as_ref(), env),

        Expression::FunctionLiteral { parameters, body } => Ok(Value::Function {
            parameters: parameters.clone(),
            body: Rc::new(body.clone()),
            env: env.clone(),
        }),

        Expression::MacroLiteral { parameters, body } => Ok(Value::Macro {
            parameters: parameters.clone(),
            body: Rc::new(body.clone()),
            env: env.clone(),
        }),

        Expression::Call {
            function,
            arguments,
        } => eval_call_expression(function, arguments, env),

        Expression::ArrayLiteral(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(eval_expression(element, env)?);
            }
            Ok(Value::Array(values))
        }

        Expression::Index { left, index } => {
            let left = eval_expression(left, env)?;
            let index = eval_expression(index, env)?;
            eval_index_expression(&left, &index)
        }

        Expression::HashLiteral(pairs) => eval_hash_literal(pairs, env),
    }
}

fn eval_statement(stmt: &Statement, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match stmt {
        Statement::Expression(expr) => eval_expression(expr, env),

        Statement::Let { name, value } => {
            let value = eval_expression(value, env)?;
            env.set(name.clone(), value);
            Ok(Value::Null)
        }

        Statement::Return { value } => {
            let value = eval_expression(value, env)?;
            Ok(Value::ReturnValue(Box::new(value)))
        }
    }
}

/// Same as `eval_program`'s statement loop, except a `ReturnValue` is passed through
/// unwrapped — it is the enclosing function call's job to unwrap it at the boundary.
fn eval_block_statement(
    block: &BlockStatement,
    env: &Rc<Environment>,
) -> Result<Value, EvalError> {
    let mut result = Value::Null;
    for stmt in &block.statements {
        result = eval_statement(stmt, env)?;
        if matches!(result, Value::ReturnValue(_)) {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_identifier(name: &str, env: &Rc<Environment>) -> Result<Value, EvalError> {
    if let Some(value) = env.get(name) {
        return Ok(value);
    }
    if let Some(builtin) = lookup_builtin(name) {
        return Ok(builtin);
    }
    Err(EvalError::IdentifierNotFound(name.to_string()))
}

/// Consulted only when `Environment::get` fails (§9's decided Open Question on builtin
/// registration) — names here must stay in lockstep with `config::BUILTIN_NAMES`.
fn lookup_builtin(name: &str) -> Option<Value> {
    use crate::builtins::{
        builtin_first, builtin_last, builtin_len, builtin_push, builtin_puts, builtin_rest,
    };
    match name {
        "len" => Some(Value::Builtin(builtin_len)),
        "puts" => Some(Value::Builtin(builtin_puts)),
        "first" => Some(Value::Builtin(builtin_first)),
        "last" => Some(Value::Builtin(builtin_last)),
        "rest" => Some(Value::Builtin(builtin_rest)),
        "push" => Some(Value::Builtin(builtin_push)),
        _ => None,
    }
}

fn eval_prefix_expression(operator: &str, right: &Value) -> Result<Value, EvalError> {
    match operator {
        "!" => Ok(Value::Boolean(!right.is_truthy())),
        "-" => match right {
            Value::Integer(n) => Ok(Value::Integer(-n)),
            _ => Err(EvalError::unknown_prefix(operator, right)),
        },
        _ => Err(EvalError::unknown_prefix(operator, right)),
    }
}

fn eval_infix_expression(operator: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Value::String(l), Value::String(r)) => eval_string_infix(operator, l, r),
        (Value::Boolean(l), Value::Boolean(r)) => match operator {
            "==" => Ok(Value::Boolean(l == r)),
            "!=" => Ok(Value::Boolean(l != r)),
            _ => Err(EvalError::unknown_infix(left, operator, right)),
        },
        (Value::Null, Value::Null) => match operator {
            "==" => Ok(Value::Boolean(true)),
            "!=" => Ok(Value::Boolean(false)),
            _ => Err(EvalError::unknown_infix(left, operator, right)),
        },
        _ if left.type_name() != right.type_name() => {
            Err(EvalError::type_mismatch(left, operator, right))
        }
        _ => Err(EvalError::unknown_infix(left, operator, right)),
    }
}

fn eval_integer_infix(operator: &str, left: i64, right: i64) -> Result<Value, EvalError> {
    match operator {
        "+" => Ok(Value::Integer(left + right)),
        "-" => Ok(Value::Integer(left - right)),
        "*" => Ok(Value::Integer(left * right)),
        "/" => {
            if right == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Integer(left / right))
            }
        }
        "<" => Ok(Value::Boolean(left < right)),
        ">" => Ok(Value::Boolean(left > right)),
        "==" => Ok(Value::Boolean(left == right)),
        "!=" => Ok(Value::Boolean(left != right)),
        _ => Err(EvalError::unknown_infix(
            &Value::Integer(left),
            operator,
            &Value::Integer(right),
        )),
    }
}

fn eval_string_infix(operator: &str, left: &str, right: &str) -> Result<Value, EvalError> {
    match operator {
        "+" => Ok(Value::String(format!("{}{}", left, right))),
        _ => Err(EvalError::unknown_infix(
            &Value::String(left.to_string()),
            operator,
            &Value::String(right.to_string()),
        )),
    }
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &BlockStatement,
    alternative: Option<&BlockStatement>,
    env: &Rc<Environment>,
) -> Result<Value, EvalError> {
    let condition = eval_expression(condition, env)?;
    if condition.is_truthy() {
        eval_block_statement(consequence, env)
    } else if let Some(alternative) = alternative {
        eval_block_statement(alternative, env)
    } else {
        Ok(Value::Null)
    }
}

fn eval_call_expression(
    function: &Expression,
    arguments: &[Expression],
    env: &Rc<Environment>,
) -> Result<Value, EvalError> {
    if function.as_identifier() == Some("quote") {
        if arguments.len() != 1 {
            return Err(EvalError::Custom(
                "quote takes exactly one argument".to_string(),
            ));
        }
        return quote_argument(&arguments[0], env);
    }

    let callee = eval_expression(function, env)?;

    let mut args = Vec::with_capacity(arguments.len());
    for argument in arguments {
        args.push(eval_expression(argument, env)?);
    }

    apply_function(&callee, &args)
}

fn apply_function(callee: &Value, args: &[Value]) -> Result<Value, EvalError> {
    match callee {
        Value::Function {
            parameters,
            body,
            env,
        } => {
            if parameters.len() != args.len() {
                return Err(EvalError::FunctionArity {
                    want: parameters.len(),
                    got: args.len(),
                });
            }
            let call_env = Environment::enclosed(env.clone());
            for (param, arg) in parameters.iter().zip(args) {
                call_env.set(param.clone(), arg.clone());
            }
            let result = eval_block_statement(body, &call_env)?;
            Ok(unwrap_return_value(result))
        }
        Value::Builtin(builtin) => builtin(args),
        other => Err(EvalError::NotAFunction(other.type_name().to_string())),
    }
}

fn unwrap_return_value(value: Value) -> Value {
    match value {
        Value::ReturnValue(inner) => *inner,
        other => other,
    }
}

fn eval_index_expression(left: &Value, index: &Value) -> Result<Value, EvalError> {
    match (left, index) {
        (Value::Array(items), Value::Integer(i)) => {
            if *i < 0 || *i as usize >= items.len() {
                Ok(Value::Null)
            } else {
                Ok(items[*i as usize].clone())
            }
        }
        (Value::Hash(pairs), key) => match key.hash_key() {
            Ok(hash_key) => Ok(pairs
                .get(&hash_key)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null)),
            Err(err) => Err(err),
        },
        _ => Err(EvalError::IndexNotSupported(left.type_name().to_string())),
    }
}

fn eval_hash_literal(
    pairs: &[(Expression, Expression)],
    env: &Rc<Environment>,
) -> Result<Value, EvalError> {
    let mut map = std::collections::HashMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env)?;
        let hash_key = key.hash_key()?;
        let value = eval_expression(value_expr, env)?;
        map.insert(hash_key, (key, value));
    }
    Ok(Value::Hash(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;

    fn eval_expr(expr: Expression) -> Result<Value, EvalError> {
        let env = Environment::new();
        eval_expression(&expr, &env)
    }

    fn int(n: i64) -> Expression {
        Expression::IntegerLiteral(n)
    }

    fn infix(op: &str, l: Expression, r: Expression) -> Expression {
        Expression::Infix {
            operator: op.to_string(),
            left: Box::new(l),
            right: Box::new(r),
        }
    }

    #[test]
    fn integer_arithmetic_precedence() {
        // (5 + 10 * 2 + 15 / 3) * 2 + -10 => 50
        let expr = infix(
            "+",
            infix(
                "*",
                infix(
                    "+",
                    infix("+", int(5), infix("*", int(10), int(2))),
                    infix("/", int(15), int(3)),
                ),
                int(2),
            ),
            Expression::Prefix {
                operator: "-".to_string(),
                right: Box::new(int(10)),
            },
        );
        assert_eq!(eval_expr(expr).unwrap(), Value::Integer(50));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let expr = infix("/", int(1), int(0));
        let err = eval_expr(expr).unwrap_err();
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn integer_division_truncates_toward_zero() {
        let expr = infix("/", int(7), int(2));
        assert_eq!(eval_expr(expr).unwrap(), Value::Integer(3));
        let expr = infix("/", int(-7), int(2));
        assert_eq!(eval_expr(expr).unwrap(), Value::Integer(-3));
    }

    #[test]
    fn type_mismatch_message() {
        let expr = infix("+", int(5), Expression::Boolean(true));
        let err = eval_expr(expr).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: INTEGER + BOOLEAN");
    }

    #[test]
    fn boolean_equality_uses_identity_semantics() {
        let expr = infix("==", Expression::Boolean(true), Expression::Boolean(true));
        assert_eq!(eval_expr(expr).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn string_concatenation() {
        let expr = infix(
            "+",
            Expression::StringLiteral("foo".to_string()),
            Expression::StringLiteral("bar".to_string()),
        );
        assert_eq!(
            eval_expr(expr).unwrap(),
            Value::String("foobar".to_string())
        );
    }

    #[test]
    fn string_subtraction_is_unknown_operator() {
        let expr = infix(
            "-",
            Expression::StringLiteral("foo".to_string()),
            Expression::StringLiteral("bar".to_string()),
        );
        let err = eval_expr(expr).unwrap_err();
        assert_eq!(err.to_string(), "unknown operator: STRING - STRING");
    }

    #[test]
    fn nested_if_return_unwinds_to_function_boundary() {
        // if (10 > 1) { if (10 > 1) { return 10; } return 1; } => 10
        let inner_if = Expression::If {
            condition: Box::new(infix(">", int(10), int(1))),
            consequence: BlockStatement {
                statements: vec![Statement::Return { value: int(10) }],
            },
            alternative: None,
        };
        let outer_if = Expression::If {
            condition: Box::new(infix(">", int(10), int(1))),
            consequence: BlockStatement {
                statements: vec![
                    Statement::Expression(inner_if),
                    Statement::Return { value: int(1) },
                ],
            },
            alternative: None,
        };
        let program = Program {
            statements: vec![Statement::Expression(outer_if)],
        };
        let env = Environment::new();
        assert_eq!(eval_program(&program, &env).unwrap(), Value::Integer(10));
    }

    #[test]
    fn closures_capture_definition_environment() {
        // let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(2);
        let new_adder = Statement::Let {
            name: "newAdder".to_string(),
            value: Expression::FunctionLiteral {
                parameters: vec!["x".to_string()],
                body: BlockStatement {
                    statements: vec![Statement::Expression(Expression::FunctionLiteral {
                        parameters: vec!["y".to_string()],
                        body: BlockStatement {
                            statements: vec![Statement::Expression(infix(
                                "+",
                                Expression::Identifier("x".to_string()),
                                Expression::Identifier("y".to_string()),
                            ))],
                        },
                    })],
                },
            },
        };
        let add_two = Statement::Let {
            name: "addTwo".to_string(),
            value: Expression::Call {
                function: Box::new(Expression::Identifier("newAdder".to_string())),
                arguments: vec![int(2)],
            },
        };
        let call = Statement::Expression(Expression::Call {
            function: Box::new(Expression::Identifier("addTwo".to_string())),
            arguments: vec![int(2)],
        });
        let program = Program {
            statements: vec![new_adder, add_two, call],
        };
        let env = Environment::new();
        assert_eq!(eval_program(&program, &env).unwrap(), Value::Integer(4));
    }

    #[test]
    fn empty_program_is_null() {
        let program = Program { statements: vec![] };
        let env = Environment::new();
        assert_eq!(eval_program(&program, &env).unwrap(), Value::Null);
    }

    #[test]
    fn identifier_not_found() {
        let err = eval_expr(Expression::Identifier("foobar".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "identifier not found: foobar");
    }

    #[test]
    fn calling_a_non_function_is_an_error() {
        let expr = Expression::Call {
            function: Box::new(int(5)),
            arguments: vec![],
        };
        let err = eval_expr(expr).unwrap_err();
        assert_eq!(err.to_string(), "not a function: INTEGER");
    }

    #[test]
    fn function_arity_mismatch() {
        let func = Expression::FunctionLiteral {
            parameters: vec!["a".to_string(), "b".to_string()],
            body: BlockStatement {
                statements: vec![Statement::Expression(Expression::Identifier(
                    "a".to_string(),
                ))],
            },
        };
        let expr = Expression::Call {
            function: Box::new(func),
            arguments: vec![int(1)],
        };
        let err = eval_expr(expr).unwrap_err();
        assert_eq!(err.to_string(), "wrong number of arguments: want=2 got=1");
    }

    #[test]
    fn array_index_within_bounds() {
        // let f = fn(x){ x }; [1,2,3][f(1)] => 2
        let func = Expression::FunctionLiteral {
            parameters: vec!["x".to_string()],
            body: BlockStatement {
                statements: vec![Statement::Expression(Expression::Identifier(
                    "x".to_string(),
                ))],
            },
        };
        let expr = Expression::Index {
            left: Box::new(Expression::ArrayLiteral(vec![int(1), int(2), int(3)])),
            index: Box::new(Expression::Call {
                function: Box::new(func),
                arguments: vec![int(1)],
            }),
        };
        assert_eq!(eval_expr(expr).unwrap(), Value::Integer(2));
    }

    #[test]
    fn array_index_out_of_bounds_is_null() {
        let expr = Expression::Index {
            left: Box::new(Expression::ArrayLiteral(vec![int(1)])),
            index: Box::new(int(5)),
        };
        assert_eq!(eval_expr(expr).unwrap(), Value::Null);
    }

    #[test]
    fn hash_literal_rejects_unhashable_key() {
        // {"name":"Monkey"}[fn(x){x}] => unusable as hash key: FUNCTION
        let func = Expression::FunctionLiteral {
            parameters: vec!["x".to_string()],
            body: BlockStatement {
                statements: vec![Statement::Expression(Expression::Identifier(
                    "x".to_string(),
                ))],
            },
        };
        let expr = Expression::Index {
            left: Box::new(Expression::HashLiteral(vec![(
                Expression::StringLiteral("name".to_string()),
                Expression::StringLiteral("Monkey".to_string()),
            )])),
            index: Box::new(func),
        };
        let err = eval_expr(expr).unwrap_err();
        assert_eq!(err.to_string(), "unusable as hash key: FUNCTION");
    }

    #[test]
    fn builtin_len_via_identifier_fallback() {
        let expr = Expression::Call {
            function: Box::new(Expression::Identifier("len".to_string())),
            arguments: vec![Expression::StringLiteral("hello".to_string())],
        };
        assert_eq!(eval_expr(expr).unwrap(), Value::Integer(5));
    }

    #[test]
    fn identifier_fallback_covers_every_declared_builtin_name() {
        for name in crate::config::BUILTIN_NAMES {
            assert!(
                lookup_builtin(name).is_some(),
                "{} is declared but not wired into identifier fallback",
                name
            );
        }
    }

    #[test]
    fn error_dominance_short_circuits_a_block() {
        let program = Program {
            statements: vec![
                Statement::Expression(infix("+", int(5), Expression::Boolean(true))),
                Statement::Expression(int(10)),
            ],
        };
        let env = Environment::new();
        let err = eval_program(&program, &env).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: INTEGER + BOOLEAN");
    }
}
