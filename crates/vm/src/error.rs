//! Runtime errors for the IPPcode22 VM.
//!
//! Every error carries the order of the instruction that raised it (`at`)
//! and maps to exactly one [`ErrorCategory`].

use ipp_common::{ErrorCategory, FrameKind, Opcode};
use thiserror::Error;

/// Errors that halt execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A mandatory argument is absent.
    #[error("{opcode} at instruction {at}: missing arg{position}")]
    MissingArgument {
        at: i64,
        opcode: Opcode,
        position: usize,
    },

    /// An argument beyond the opcode's arity.
    #[error("{opcode} at instruction {at}: unexpected arg{position}")]
    UnexpectedArgument {
        at: i64,
        opcode: Opcode,
        position: usize,
    },

    /// An argument of the wrong kind (e.g. a literal where a variable is required).
    #[error("{opcode} at instruction {at}: arg{position} must be {expected}, found {found}")]
    BadArgument {
        at: i64,
        opcode: Opcode,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// CALL or a jump targets a label that was never declared.
    #[error("undefined label '{label}' at instruction {at}")]
    UnknownLabel { at: i64, label: String },

    /// DEFVAR of a name already present in the frame.
    #[error("variable {var} redefined at instruction {at}")]
    VariableRedefinition { at: i64, var: String },

    /// Operands have types the operation does not accept.
    #[error("{opcode} at instruction {at}: operand type mismatch")]
    TypeMismatch { at: i64, opcode: Opcode },

    /// Variable not declared in the addressed frame.
    #[error("undeclared variable {var} at instruction {at}")]
    UndeclaredVariable { at: i64, var: String },

    /// TF before CREATEFRAME, or LF with an empty frame stack.
    #[error("frame {frame} does not exist at instruction {at}")]
    MissingFrame { at: i64, frame: FrameKind },

    /// Read of a declared variable that was never assigned.
    #[error("uninitialized variable {var} at instruction {at}")]
    UninitializedVariable { at: i64, var: String },

    /// Pop from an empty (or too shallow) data stack.
    #[error("data stack underflow at instruction {at}")]
    DataStackUnderflow { at: i64 },

    /// RETURN with an empty call stack.
    #[error("RETURN with empty call stack at instruction {at}")]
    CallStackEmpty { at: i64 },

    /// IDIV or DIV by zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: i64 },

    /// EXIT with a code outside `0..=49`.
    #[error("exit code {code} out of range 0..=49 at instruction {at}")]
    ExitCodeOutOfRange { at: i64, code: i64 },

    /// FLOAT2INT of NaN, infinity or a value beyond the integer range.
    #[error("float not representable as int at instruction {at}")]
    FloatOutOfRange { at: i64 },

    /// String index outside `0..length`.
    #[error("index {index} out of range (length {length}) at instruction {at}")]
    StringIndexOutOfRange { at: i64, index: i64, length: usize },

    /// INT2CHAR of a value that is not a Unicode scalar value.
    #[error("invalid character ordinal {value} at instruction {at}")]
    InvalidOrdinal { at: i64, value: i64 },

    /// SETCHAR with an empty replacement string.
    #[error("SETCHAR with empty replacement at instruction {at}")]
    EmptyReplacement { at: i64 },

    /// The output or diagnostic stream could not be written.
    #[error("output error at instruction {at}: {message}")]
    Output { at: i64, message: String },
}

impl RuntimeError {
    /// The exit-status category this error maps to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RuntimeError::MissingArgument { .. }
            | RuntimeError::UnexpectedArgument { .. }
            | RuntimeError::BadArgument { .. } => ErrorCategory::MalformedProgram,
            RuntimeError::UnknownLabel { .. } | RuntimeError::VariableRedefinition { .. } => {
                ErrorCategory::Semantic
            }
            RuntimeError::TypeMismatch { .. } => ErrorCategory::OperandType,
            RuntimeError::UndeclaredVariable { .. } => ErrorCategory::UndeclaredVariable,
            RuntimeError::MissingFrame { .. } => ErrorCategory::MissingFrame,
            RuntimeError::UninitializedVariable { .. }
            | RuntimeError::DataStackUnderflow { .. }
            | RuntimeError::CallStackEmpty { .. } => ErrorCategory::MissingValue,
            RuntimeError::DivisionByZero { .. }
            | RuntimeError::ExitCodeOutOfRange { .. }
            | RuntimeError::FloatOutOfRange { .. } => ErrorCategory::BadValue,
            RuntimeError::StringIndexOutOfRange { .. }
            | RuntimeError::InvalidOrdinal { .. }
            | RuntimeError::EmptyReplacement { .. } => ErrorCategory::BadString,
            RuntimeError::Output { .. } => ErrorCategory::Internal,
        }
    }

    /// Shorthand for `self.category().exit_code()`.
    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }
}
