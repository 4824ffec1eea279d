//! Value-level semantics shared by the register-style and stack-style
//! instruction families. Nothing here touches frames or stacks.

use std::cmp::Ordering;

use ipp_common::escape::decode_escapes;
use ipp_common::hexfloat::parse_hex;
use ipp_common::{Instruction, TypeTag, Value};

use crate::error::RuntimeError;

/// Operation failures, before the instruction is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    TypeMismatch,
    DivisionByZero,
    FloatOutOfRange,
    IndexOutOfRange { index: i64, length: usize },
    InvalidOrdinal(i64),
    EmptyReplacement,
}

impl OpError {
    pub(crate) fn at(self, instr: &Instruction) -> RuntimeError {
        let at = instr.order;
        match self {
            OpError::TypeMismatch => RuntimeError::TypeMismatch {
                at,
                opcode: instr.opcode,
            },
            OpError::DivisionByZero => RuntimeError::DivisionByZero { at },
            OpError::FloatOutOfRange => RuntimeError::FloatOutOfRange { at },
            OpError::IndexOutOfRange { index, length } => {
                RuntimeError::StringIndexOutOfRange { at, index, length }
            }
            OpError::InvalidOrdinal(value) => RuntimeError::InvalidOrdinal { at, value },
            OpError::EmptyReplacement => RuntimeError::EmptyReplacement { at },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Lt,
    Gt,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

/// int×int or float×float arithmetic. Integers wrap on overflow; IDIV
/// truncates toward zero.
pub fn arith(op: Arith, a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => int_arith(op, *x, *y).map(Value::Int),
        (Value::Float(x), Value::Float(y)) => float_arith(op, *x, *y).map(Value::Float),
        _ => Err(OpError::TypeMismatch),
    }
}

fn int_arith(op: Arith, x: i64, y: i64) -> Result<i64, OpError> {
    match op {
        Arith::Add => Ok(x.wrapping_add(y)),
        Arith::Sub => Ok(x.wrapping_sub(y)),
        Arith::Mul => Ok(x.wrapping_mul(y)),
        Arith::IDiv if y == 0 => Err(OpError::DivisionByZero),
        Arith::IDiv => Ok(x.wrapping_div(y)),
        Arith::Div => Err(OpError::TypeMismatch),
    }
}

fn float_arith(op: Arith, x: f64, y: f64) -> Result<f64, OpError> {
    match op {
        Arith::Add => Ok(x + y),
        Arith::Sub => Ok(x - y),
        Arith::Mul => Ok(x * y),
        Arith::Div if y == 0.0 => Err(OpError::DivisionByZero),
        Arith::Div => Ok(x / y),
        Arith::IDiv => Err(OpError::TypeMismatch),
    }
}

/// LT/GT/EQ. Nil compares only under EQ, and equals only nil; every other
/// pairing needs both operands of the same type.
pub fn compare(rel: Relation, a: &Value, b: &Value) -> Result<bool, OpError> {
    if a.is_nil() || b.is_nil() {
        return match rel {
            Relation::Eq => Ok(a.is_nil() && b.is_nil()),
            Relation::Lt | Relation::Gt => Err(OpError::TypeMismatch),
        };
    }

    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => x.partial_cmp(y),
        _ => return Err(OpError::TypeMismatch),
    };

    Ok(match rel {
        Relation::Lt => ordering == Some(Ordering::Less),
        Relation::Gt => ordering == Some(Ordering::Greater),
        Relation::Eq => ordering == Some(Ordering::Equal),
    })
}

/// Equality as used by the conditional jumps.
pub fn equals(a: &Value, b: &Value) -> Result<bool, OpError> {
    compare(Relation::Eq, a, b)
}

pub fn logic(op: Logic, a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(match op {
            Logic::And => *x && *y,
            Logic::Or => *x || *y,
        })),
        _ => Err(OpError::TypeMismatch),
    }
}

pub fn not(a: &Value) -> Result<Value, OpError> {
    match a {
        Value::Bool(x) => Ok(Value::Bool(!x)),
        _ => Err(OpError::TypeMismatch),
    }
}

pub fn int2char(a: &Value) -> Result<Value, OpError> {
    match a {
        Value::Int(code) => u32::try_from(*code)
            .ok()
            .and_then(char::from_u32)
            .map(|c| Value::String(c.to_string()))
            .ok_or(OpError::InvalidOrdinal(*code)),
        _ => Err(OpError::TypeMismatch),
    }
}

pub fn stri2int(s: &Value, index: &Value) -> Result<Value, OpError> {
    match (s, index) {
        (Value::String(s), Value::Int(index)) => {
            char_at(s, *index).map(|c| Value::Int(i64::from(u32::from(c))))
        }
        _ => Err(OpError::TypeMismatch),
    }
}

pub fn int2float(a: &Value) -> Result<Value, OpError> {
    match a {
        Value::Int(x) => Ok(Value::Float(*x as f64)),
        _ => Err(OpError::TypeMismatch),
    }
}

/// Truncates toward zero.
pub fn float2int(a: &Value) -> Result<Value, OpError> {
    // i64::MIN is exactly representable; i64::MAX + 1 is the first value out.
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;

    match a {
        Value::Float(x) => {
            let truncated = x.trunc();
            if truncated.is_finite() && (LOWER..UPPER).contains(&truncated) {
                Ok(Value::Int(truncated as i64))
            } else {
                Err(OpError::FloatOutOfRange)
            }
        }
        _ => Err(OpError::TypeMismatch),
    }
}

pub fn concat(a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(Value::String(format!("{x}{y}"))),
        _ => Err(OpError::TypeMismatch),
    }
}

/// Length in Unicode scalar values.
pub fn strlen(a: &Value) -> Result<Value, OpError> {
    match a {
        Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
        _ => Err(OpError::TypeMismatch),
    }
}

pub fn getchar(s: &Value, index: &Value) -> Result<Value, OpError> {
    match (s, index) {
        (Value::String(s), Value::Int(index)) => {
            char_at(s, *index).map(|c| Value::String(c.to_string()))
        }
        _ => Err(OpError::TypeMismatch),
    }
}

/// Replace the character at `index` of `target` with the first character
/// of `replacement`.
pub fn setchar(target: &Value, index: &Value, replacement: &Value) -> Result<Value, OpError> {
    let (target, index, replacement) = match (target, index, replacement) {
        (Value::String(t), Value::Int(i), Value::String(r)) => (t, *i, r),
        _ => return Err(OpError::TypeMismatch),
    };

    let new_char = replacement.chars().next().ok_or(OpError::EmptyReplacement)?;
    let position = position_of(target, index)?;

    let result = target
        .chars()
        .enumerate()
        .map(|(i, c)| if i == position { new_char } else { c })
        .collect();
    Ok(Value::String(result))
}

/// TYPE result: the type name, or the empty string for an uninitialized
/// variable.
pub fn type_name(value: Option<&Value>) -> Value {
    Value::String(value.map_or("", |v| v.type_tag().name()).to_string())
}

/// Convert a READ input line to the requested type. Conversion failure and
/// end of input both yield nil.
pub fn read_value(line: Option<String>, requested: TypeTag) -> Value {
    let Some(line) = line else {
        return Value::Nil;
    };

    match requested {
        TypeTag::Int => line.trim().parse().map_or(Value::Nil, Value::Int),
        TypeTag::Bool => Value::Bool(line.eq_ignore_ascii_case("true")),
        TypeTag::Float => parse_hex(&line).map_or(Value::Nil, Value::Float),
        TypeTag::String => decode_escapes(&line).map_or(Value::Nil, Value::String),
        TypeTag::Nil | TypeTag::Label | TypeTag::Type => Value::Nil,
    }
}

fn position_of(s: &str, index: i64) -> Result<usize, OpError> {
    let length = s.chars().count();
    usize::try_from(index)
        .ok()
        .filter(|&i| i < length)
        .ok_or(OpError::IndexOutOfRange { index, length })
}

fn char_at(s: &str, index: i64) -> Result<char, OpError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .ok_or_else(|| OpError::IndexOutOfRange {
            index,
            length: s.chars().count(),
        })
}
