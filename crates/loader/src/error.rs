//! Error types for the IPPcode22 source loader.

use ipp_common::{ErrorCategory, ProgramError};
use thiserror::Error;

use crate::xml::XmlError;

/// Errors produced while turning an XML document into a [`Program`](ipp_common::Program).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] XmlError),

    /// The root element is not `<program>`.
    #[error("line {line}: root element must be <program>, found <{found}>")]
    WrongRoot { line: usize, found: String },

    /// `language` is absent or is not `IPPcode22`.
    #[error("line {line}: unsupported language '{found}'")]
    WrongLanguage { line: usize, found: String },

    /// A child element other than the expected one.
    #[error("line {line}: unexpected element <{found}> in <{parent}>")]
    UnexpectedElement {
        line: usize,
        parent: &'static str,
        found: String,
    },

    /// A mandatory attribute is absent.
    #[error("line {line}: <{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        line: usize,
        element: String,
        attribute: &'static str,
    },

    /// `order` is not a positive integer.
    #[error("line {line}: invalid instruction order '{value}'")]
    InvalidOrder { line: usize, value: String },

    /// `opcode` names no known instruction.
    #[error("line {line}: unknown opcode '{opcode}'")]
    UnknownOpcode { line: usize, opcode: String },

    /// The same `argN` element appears twice in one instruction.
    #[error("line {line}: duplicate <{name}>")]
    DuplicateArgument { line: usize, name: String },

    /// `type` names no argument kind.
    #[error("line {line}: unknown argument type '{kind}'")]
    UnknownArgumentType { line: usize, kind: String },

    /// An argument's text does not decode as its declared type.
    #[error("line {line}: invalid {kind} value '{value}'")]
    InvalidValue {
        line: usize,
        kind: &'static str,
        value: String,
    },

    /// The instruction was rejected by the program store.
    #[error(transparent)]
    Program(#[from] ProgramError),
}

impl LoadError {
    /// The exit-status category this error maps to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            LoadError::Xml(_) => ErrorCategory::MalformedSource,
            LoadError::Program(e) => e.category(),
            _ => ErrorCategory::MalformedProgram,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = LoadError::UnknownOpcode {
            line: 3,
            opcode: "FOO".to_string(),
        };
        assert_eq!(e.to_string(), "line 3: unknown opcode 'FOO'");
    }

    #[test]
    fn error_display_invalid_value() {
        let e = LoadError::InvalidValue {
            line: 7,
            kind: "int",
            value: "12a".to_string(),
        };
        assert_eq!(e.to_string(), "line 7: invalid int value '12a'");
    }

    #[test]
    fn categories() {
        assert_eq!(
            LoadError::Xml(XmlError::UnexpectedEof { line: 1 }).exit_code(),
            31
        );
        assert_eq!(
            LoadError::WrongRoot {
                line: 1,
                found: "prog".to_string()
            }
            .exit_code(),
            32
        );
        assert_eq!(
            LoadError::Program(ProgramError::DuplicateOrder(4)).exit_code(),
            32
        );
        assert_eq!(
            LoadError::Program(ProgramError::LabelRedefinition("l".to_string())).exit_code(),
            52
        );
    }
}
