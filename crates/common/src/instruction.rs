//! Instruction records for the IPPcode22 instruction set.
//!
//! An instruction is an order number, an opcode and up to three typed
//! arguments. Literal arguments are fully decoded before they get here:
//! strings have their escapes resolved, floats are parsed from hex.

use std::fmt;

use crate::opcode::Opcode;
use crate::type_tag::TypeTag;
use crate::value::Value;

/// Maximum number of arguments an instruction can carry.
pub const MAX_ARGS: usize = 3;

/// Which frame a variable reference addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`, always present.
    Global,
    /// `TF`, exists only after CREATEFRAME.
    Temporary,
    /// `LF`, top of the frame stack.
    Local,
}

impl FrameKind {
    /// The two-letter prefix used in source (`GF`, `TF`, `LF`).
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Temporary => "TF",
            FrameKind::Local => "LF",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "TF" => Some(FrameKind::Temporary),
            "LF" => Some(FrameKind::Local),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A `FRAME@name` variable reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub frame: FrameKind,
    pub name: String,
}

impl VarRef {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }

    /// Parse `GF@x`, `TF@x` or `LF@x`.
    pub fn parse(text: &str) -> Option<Self> {
        let (prefix, name) = text.trim().split_once('@')?;
        let frame = FrameKind::from_prefix(prefix)?;
        if name.is_empty() {
            return None;
        }
        Some(Self::new(frame, name))
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// One instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Variable reference.
    Var(VarRef),
    /// Literal constant.
    Const(Value),
    /// Jump target.
    Label(String),
    /// Type operand (READ).
    Type(TypeTag),
}

impl Argument {
    /// Type tag of the argument as written in source.
    pub fn kind(&self) -> &'static str {
        match self {
            Argument::Var(_) => "var",
            Argument::Const(value) => value.type_tag().name(),
            Argument::Label(_) => "label",
            Argument::Type(_) => "type",
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Var(var) => write!(f, "{var}"),
            Argument::Const(Value::Nil) => f.write_str("nil@nil"),
            Argument::Const(value) => write!(f, "{}@{value}", value.type_tag()),
            Argument::Label(name) => write!(f, "label@{name}"),
            Argument::Type(tt) => write!(f, "type@{tt}"),
        }
    }
}

/// A single IPPcode22 instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Caller-assigned position; unique and positive once admitted.
    pub order: i64,
    /// The operation to perform.
    pub opcode: Opcode,
    /// `arg1`..`arg3`, by position.
    pub args: [Option<Argument>; MAX_ARGS],
}

impl Instruction {
    /// Create an instruction without arguments.
    pub fn new(order: i64, opcode: Opcode) -> Self {
        Self {
            order,
            opcode,
            args: [None, None, None],
        }
    }

    /// Builder: set argument `position` (1-based).
    ///
    /// Positions outside `1..=3` are ignored.
    pub fn with_arg(mut self, position: usize, arg: Argument) -> Self {
        if let Some(slot) = position.checked_sub(1).and_then(|i| self.args.get_mut(i)) {
            *slot = Some(arg);
        }
        self
    }

    /// Builder: append an argument after the last present one.
    pub fn arg(self, arg: Argument) -> Self {
        let next = self.args.iter().take_while(|a| a.is_some()).count() + 1;
        self.with_arg(next, arg)
    }

    /// Argument at `position` (1-based), if present.
    pub fn get(&self, position: usize) -> Option<&Argument> {
        position
            .checked_sub(1)
            .and_then(|i| self.args.get(i))
            .and_then(Option::as_ref)
    }

    /// First position whose argument is present while an earlier one is
    /// absent, as `(present, missing)`.
    pub fn argument_gap(&self) -> Option<(usize, usize)> {
        let mut first_missing = None;
        for (i, arg) in self.args.iter().enumerate() {
            match (arg, first_missing) {
                (None, None) => first_missing = Some(i + 1),
                (Some(_), Some(missing)) => return Some((i + 1, missing)),
                _ => {}
            }
        }
        None
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.order, self.opcode)?;
        for arg in self.args.iter().flatten() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_ref_parse() {
        assert_eq!(
            VarRef::parse("GF@counter"),
            Some(VarRef::new(FrameKind::Global, "counter"))
        );
        assert_eq!(
            VarRef::parse("LF@a@b"),
            Some(VarRef::new(FrameKind::Local, "a@b"))
        );
        assert_eq!(VarRef::parse("XF@x"), None);
        assert_eq!(VarRef::parse("gf@x"), None);
        assert_eq!(VarRef::parse("GF@"), None);
        assert_eq!(VarRef::parse("counter"), None);
    }

    #[test]
    fn builder_appends_in_order() {
        let instr = Instruction::new(3, Opcode::Add)
            .arg(Argument::Var(VarRef::new(FrameKind::Global, "x")))
            .arg(Argument::Const(Value::Int(1)))
            .arg(Argument::Const(Value::Int(2)));
        assert_eq!(instr.get(2), Some(&Argument::Const(Value::Int(1))));
        assert_eq!(instr.get(3), Some(&Argument::Const(Value::Int(2))));
        assert_eq!(instr.get(4), None);
        assert_eq!(instr.get(0), None);
        assert_eq!(instr.argument_gap(), None);
    }

    #[test]
    fn gap_detection() {
        let instr = Instruction::new(1, Opcode::Write).with_arg(2, Argument::Const(Value::Nil));
        assert_eq!(instr.argument_gap(), Some((2, 1)));

        let instr = Instruction::new(1, Opcode::Write)
            .with_arg(1, Argument::Const(Value::Nil))
            .with_arg(3, Argument::Const(Value::Nil));
        assert_eq!(instr.argument_gap(), Some((3, 2)));
    }

    #[test]
    fn display_instruction() {
        let instr = Instruction::new(7, Opcode::Move)
            .arg(Argument::Var(VarRef::new(FrameKind::Temporary, "s")))
            .arg(Argument::Const(Value::from("hi")));
        assert_eq!(instr.to_string(), "7 MOVE TF@s string@hi");
    }
}
