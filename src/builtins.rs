// ABOUTME: The fixed builtin table — len, puts, first, last, rest, push

use crate::error::EvalError;
use crate::value::Value;

/// Returns the length of a `String` (bytes) or `Array` (elements).
pub fn builtin_len(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::BuiltinArity {
            got: args.len(),
            want: "1".to_string(),
        });
    }

    match &args[0] {
        Value::String(s) => Ok(Value::Integer(s.len() as i64)),
        Value::Array(items) => Ok(Value::Integer(items.len() as i64)),
        other => Err(EvalError::builtin_arg_type("len", other)),
    }
}

/// Writes each argument's `Inspect` form followed by a newline. Returns `Null`.
pub fn builtin_puts(args: &[Value]) -> Result<Value, EvalError> {
    for arg in args {
        println!("{}", arg);
    }
    Ok(Value::Null)
}

/// Returns the first element of an array, or `Null` for an empty one.
pub fn builtin_first(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::BuiltinArity {
            got: args.len(),
            want: "1".to_string(),
        });
    }

    match &args[0] {
        Value::Array(items) => Ok(items.first().cloned().unwrap_or(Value::Null)),
        other => Err(EvalError::builtin_arg_type("first", other)),
    }
}

/// Returns the last element of an array, or `Null` for an empty one.
pub fn builtin_last(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::BuiltinArity {
            got: args.len(),
            want: "1".to_string(),
        });
    }

    match &args[0] {
        Value::Array(items) => Ok(items.last().cloned().unwrap_or(Value::Null)),
        other => Err(EvalError::builtin_arg_type("last", other)),
    }
}

/// Returns every element but the first, as a new array. An empty array yields `Null`.
pub fn builtin_rest(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::BuiltinArity {
            got: args.len(),
            want: "1".to_string(),
        });
    }

    match &args[0] {
        Value::Array(items) if !items.is_empty() => Ok(Value::Array(items[1..].to_vec())),
        Value::Array(_) => Ok(Value::Null),
        other => Err(EvalError::builtin_arg_type("rest", other)),
    }
}

/// Returns a new array with `value` appended. The original array is left untouched —
/// Monkey arrays are immutable from the caller's perspective.
pub fn builtin_push(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::BuiltinArity {
            got: args.len(),
            want: "2".to_string(),
        });
    }

    match &args[0] {
        Value::Array(items) => {
            let mut result = items.clone();
            result.push(args[1].clone());
            Ok(Value::Array(result))
        }
        other => Err(EvalError::builtin_arg_type("push", other)),
    }
}
