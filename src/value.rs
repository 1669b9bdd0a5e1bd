// ABOUTME: Value types representing Monkey's runtime value domain

use crate::ast::{BlockStatement, Expression};
use crate::env::Environment;
use crate::error::EvalError;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Null,
    String(String),
    Array(Vec<Value>),
    Hash(HashMap<HashKey, (Value, Value)>),
    Function {
        parameters: Vec<String>,
        body: Rc<BlockStatement>,
        env: Rc<Environment>,
    },
    Builtin(BuiltinFn),
    ReturnValue(Box<Value>),
    Error(String),
    Quote(Expression),
    Macro {
        parameters: Vec<String>,
        body: Rc<BlockStatement>,
        env: Rc<Environment>,
    },
}

/// A hashable key extracted from a `Value`, per §3.1: only Integer, Boolean and String are
/// hashable. The digest is a stable-within-a-run hash of the payload; two keys are equal
/// iff both the type tag and digest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    type_tag: &'static str,
    digest: u64,
}

impl Value {
    /// The short symbolic type tag used throughout error messages and `HashKey`s.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::String(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function { .. } => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
            Value::Quote(_) => "QUOTE",
            Value::Macro { .. } => "MACRO",
        }
    }

    /// Monkey truthiness: everything except `false` and `null` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Attempts to produce this value's `HashKey`, per §3.1's hashability rule.
    pub fn hash_key(&self) -> Result<HashKey, EvalError> {
        match self {
            Value::Integer(n) => Ok(HashKey {
                type_tag: self.type_name(),
                digest: *n as u64,
            }),
            Value::Boolean(b) => Ok(HashKey {
                type_tag: self.type_name(),
                digest: if *b { 1 } else { 0 },
            }),
            Value::String(s) => {
                let mut hasher = DefaultHasher::new();
                s.hash(&mut hasher);
                Ok(HashKey {
                    type_tag: self.type_name(),
                    digest: hasher.finish(),
                })
            }
            other => Err(EvalError::UnusableHashKey(other.type_name().to_string())),
        }
    }
}

impl From<&EvalError> for Value {
    fn from(err: &EvalError) -> Self {
        Value::Error(err.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Value::Hash(pairs) => {
                let mut rendered: Vec<String> = pairs
                    .values()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                rendered.sort();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Value::Function {
                parameters, body, ..
            } => write!(f, "fn({}) {{ {} }}", parameters.join(", "), body),
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::ReturnValue(inner) => write!(f, "{}", inner),
            Value::Error(msg) => write!(f, "ERROR: {}", msg),
            Value::Quote(node) => write!(f, "QUOTE({})", node),
            Value::Macro {
                parameters, body, ..
            } => write!(f, "macro({}) {{ {} }}", parameters.join(", "), body),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::ReturnValue(a), Value::ReturnValue(b)) => a == b,
            (Value::Quote(a), Value::Quote(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Function { env: a_env, .. }, Value::Function { env: b_env, .. }) => {
                Rc::ptr_eq(a_env, b_env)
            }
            (Value::Macro { env: a_env, .. }, Value::Macro { env: b_env, .. }) => {
                Rc::ptr_eq(a_env, b_env)
            }
            _ => false,
        }
    }
}
