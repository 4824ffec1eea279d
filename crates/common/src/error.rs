//! Error categories and program-store errors for IPPcode22.
//!
//! Every failure the toolchain can report belongs to exactly one
//! [`ErrorCategory`]. The category, not the message, is what external
//! graders observe: it becomes the process exit status.

use thiserror::Error;

/// The exit-status taxonomy shared by every crate in the workspace.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid command-line parameters.
    InvalidParameters = 10,
    /// A source or input file could not be opened or read.
    InputFile = 11,
    /// Source representation is not well-formed XML.
    MalformedSource = 31,
    /// Bad order, bad or missing mandatory argument, unknown opcode.
    MalformedProgram = 32,
    /// Duplicate label, unknown label, redeclared variable.
    Semantic = 52,
    /// Operand type mismatch.
    OperandType = 53,
    /// Access to an undeclared variable.
    UndeclaredVariable = 54,
    /// Access to a nonexistent frame.
    MissingFrame = 55,
    /// Missing value: uninitialized read, pop from an empty stack.
    MissingValue = 56,
    /// Wrong operand value: division by zero, EXIT code out of range.
    BadValue = 57,
    /// Invalid string operation: index out of range, invalid ordinal.
    BadString = 58,
    /// Internal failure (output stream unwritable and the like).
    Internal = 99,
}

impl ErrorCategory {
    /// The process exit status for this category.
    pub fn exit_code(self) -> i32 {
        self as i32
    }
}

/// Errors raised while admitting instructions into a [`Program`](crate::Program)
/// or resolving labels against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Instruction order is zero or negative.
    #[error("invalid instruction order {0}")]
    InvalidOrder(i64),

    /// Another instruction was already admitted with the same order.
    #[error("duplicate instruction order {0}")]
    DuplicateOrder(i64),

    /// A later argument is present while an earlier one is not.
    #[error("instruction {order}: arg{position} present without arg{missing}")]
    ArgumentGap {
        order: i64,
        position: usize,
        missing: usize,
    },

    /// LABEL without a label-typed first argument.
    #[error("instruction {order}: LABEL requires a label argument")]
    MissingLabelName { order: i64 },

    /// Two LABEL instructions declare the same name.
    #[error("label '{0}' is already defined")]
    LabelRedefinition(String),

    /// A jump or call targets a label that was never declared.
    #[error("undefined label '{0}'")]
    UnknownLabel(String),
}

impl ProgramError {
    /// The exit-status category this error maps to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProgramError::InvalidOrder(_)
            | ProgramError::DuplicateOrder(_)
            | ProgramError::ArgumentGap { .. }
            | ProgramError::MissingLabelName { .. } => ErrorCategory::MalformedProgram,
            ProgramError::LabelRedefinition(_) | ProgramError::UnknownLabel(_) => {
                ErrorCategory::Semantic
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_taxonomy() {
        assert_eq!(ErrorCategory::InvalidParameters.exit_code(), 10);
        assert_eq!(ErrorCategory::MalformedSource.exit_code(), 31);
        assert_eq!(ErrorCategory::MalformedProgram.exit_code(), 32);
        assert_eq!(ErrorCategory::Semantic.exit_code(), 52);
        assert_eq!(ErrorCategory::OperandType.exit_code(), 53);
        assert_eq!(ErrorCategory::UndeclaredVariable.exit_code(), 54);
        assert_eq!(ErrorCategory::MissingFrame.exit_code(), 55);
        assert_eq!(ErrorCategory::MissingValue.exit_code(), 56);
        assert_eq!(ErrorCategory::BadValue.exit_code(), 57);
        assert_eq!(ErrorCategory::BadString.exit_code(), 58);
    }

    #[test]
    fn program_error_categories() {
        assert_eq!(
            ProgramError::InvalidOrder(0).category(),
            ErrorCategory::MalformedProgram
        );
        assert_eq!(
            ProgramError::LabelRedefinition("x".into()).category(),
            ErrorCategory::Semantic
        );
        assert_eq!(
            ProgramError::UnknownLabel("x".into()).category(),
            ErrorCategory::Semantic
        );
    }

    #[test]
    fn display_argument_gap() {
        let e = ProgramError::ArgumentGap {
            order: 4,
            position: 3,
            missing: 2,
        };
        assert_eq!(e.to_string(), "instruction 4: arg3 present without arg2");
    }
}
