//! Runtime object types for Monkey

use std::fmt;
use std::rc::Rc;

use crate::ast::{BlockStatement, Identifier};
use crate::environment::Env;

/// The shared `true`
pub const TRUE: Object = Object::Boolean(true);

/// The shared `false`
pub const FALSE: Object = Object::Boolean(false);

/// The one absence-of-value object
pub const NULL: Object = Object::Null;

/// Runtime values in Monkey
#[derive(Clone)]
pub enum Object {
    Integer(i64),

    /// Only ever `TRUE` or `FALSE`
    Boolean(bool),

    Null,

    /// Closure: a function literal plus the scope it was created in
    Function(Rc<Function>),

    /// Marks an early `return` while it bubbles up to the call boundary
    ReturnValue(Box<Object>),

    /// A runtime error, carried as an ordinary value
    Error(String),
}

/// Variant tag of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Integer,
    Boolean,
    Null,
    Function,
    ReturnValue,
    Error,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::Function => "FUNCTION",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
        };
        f.write_str(name)
    }
}

impl Object {
    pub fn error(message: impl Into<String>) -> Self {
        Object::Error(message.into())
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Null => ObjectType::Null,
            Object::Function(_) => ObjectType::Function,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
        }
    }

    /// `false` and `null` are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Human-readable rendering, as the REPL shows it
    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        if value { TRUE } else { FALSE }
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{}", n),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::Null => write!(f, "null"),
            Object::Function(func) => write!(f, "{}", func),
            Object::ReturnValue(value) => write!(f, "{}", value),
            Object::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Error(message) => write!(f, "Error({:?})", message),
            Object::ReturnValue(value) => write!(f, "ReturnValue({:?})", value),
            _ => write!(f, "{}", self),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

/// User-defined function
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
    pub env: Env,
}

impl Function {
    pub fn new(parameters: Vec<Identifier>, body: Rc<BlockStatement>, env: Env) -> Self {
        Self { parameters, body, env }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.value.as_str()).collect();
        write!(f, "fn({}) {}", params.join(", "), self.body)
    }
}

// The captured environment may contain this very function, so it is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self)
    }
}
