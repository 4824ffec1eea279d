//! Runtime value representation for the IPPcode22 VM.
//!
//! Values are what variables hold and what lives on the data stack.

use std::fmt;

use crate::hexfloat::format_hex;
use crate::type_tag::TypeTag;

/// A dynamically typed runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The `nil` value.
    Nil,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// IEEE 754 double.
    Float(f64),
    /// Already-decoded string (escape sequences resolved at load/read time).
    String(String),
}

// Floats compare bitwise here so that Value is Eq and test assertions are
// exact. The EQ family does not use this impl; it follows IEEE semantics.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Returns the type tag for this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Nil => TypeTag::Nil,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::String,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Renders the value the way WRITE prints it: `true`/`false`, nothing for
/// nil, `%a` for floats, everything else verbatim.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_hex(*x)),
            Value::String(s) => f.write_str(s),
        }
    }
}
