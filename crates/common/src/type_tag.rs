//! Type tags of the IPPcode22 type system.

use std::fmt;

/// Identifies the type of a value or of an immediate operand.
///
/// Only `Nil`, `Bool`, `Int`, `Float` and `String` can be held by a
/// variable or sit on the data stack. `Label` and `Type` occur only as
/// instruction operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// The single value `nil`.
    Nil,
    /// `true` or `false`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// IEEE 754 double, written in hexadecimal notation.
    Float,
    /// Sequence of Unicode scalar values.
    String,
    /// Jump target name.
    Label,
    /// A type used as a value (operand of READ).
    Type,
}

/// All type tags, in definition order.
pub const ALL_TYPE_TAGS: [TypeTag; 7] = [
    TypeTag::Nil,
    TypeTag::Bool,
    TypeTag::Int,
    TypeTag::Float,
    TypeTag::String,
    TypeTag::Label,
    TypeTag::Type,
];

impl TypeTag {
    /// Source-level name of the type, as written by TYPE and in XML.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Nil => "nil",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Label => "label",
            TypeTag::Type => "type",
        }
    }

    /// Look up a type by its source-level name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_TYPE_TAGS
            .iter()
            .find(|tt| tt.name().eq_ignore_ascii_case(name.trim()))
            .copied()
    }

    /// Whether READ can materialize a value of this type from input.
    pub fn is_readable(&self) -> bool {
        matches!(
            self,
            TypeTag::Bool | TypeTag::Int | TypeTag::Float | TypeTag::String
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
