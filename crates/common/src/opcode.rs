//! Opcode definitions for the IPPcode22 instruction set.

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and variables
    /// `MOVE <var> <symb>` copy a value into a variable.
    Move,
    /// Replace the temporary frame with a fresh empty one.
    CreateFrame,
    /// Move the temporary frame onto the frame stack.
    PushFrame,
    /// Move the local frame back into the temporary slot.
    PopFrame,
    /// `DEFVAR <var>` declare an uninitialized variable.
    DefVar,

    // Calls
    /// `CALL <label>` save the program counter and jump.
    Call,
    /// Jump back to the most recently saved program counter.
    Return,

    // Data stack
    /// `PUSHS <symb>`
    PushS,
    /// `POPS <var>`
    PopS,

    // Arithmetic
    /// `ADD <var> <symb> <symb>`
    Add,
    /// `SUB <var> <symb> <symb>`
    Sub,
    /// `MUL <var> <symb> <symb>`
    Mul,
    /// `DIV <var> <symb> <symb>` float division.
    Div,
    /// `IDIV <var> <symb> <symb>` integer division, truncating.
    IDiv,

    // Relational
    /// `LT <var> <symb> <symb>`
    Lt,
    /// `GT <var> <symb> <symb>`
    Gt,
    /// `EQ <var> <symb> <symb>`
    Eq,

    // Boolean
    /// `AND <var> <symb> <symb>`
    And,
    /// `OR <var> <symb> <symb>`
    Or,
    /// `NOT <var> <symb>`
    Not,

    // Conversion
    /// `INT2CHAR <var> <symb>`
    Int2Char,
    /// `STRI2INT <var> <symb> <symb>`
    Stri2Int,
    /// `INT2FLOAT <var> <symb>`
    Int2Float,
    /// `FLOAT2INT <var> <symb>`
    Float2Int,

    // I/O
    /// `READ <var> <type>`
    Read,
    /// `WRITE <symb>`
    Write,

    // Strings
    /// `CONCAT <var> <symb> <symb>`
    Concat,
    /// `STRLEN <var> <symb>`
    Strlen,
    /// `GETCHAR <var> <symb> <symb>`
    GetChar,
    /// `SETCHAR <var> <symb> <symb>`
    SetChar,

    // Types
    /// `TYPE <var> <symb>`
    Type,

    // Control flow
    /// `LABEL <label>` no-op at run time.
    Label,
    /// `JUMP <label>`
    Jump,
    /// `JUMPIFEQ <label> <symb> <symb>`
    JumpIfEq,
    /// `JUMPIFNEQ <label> <symb> <symb>`
    JumpIfNeq,
    /// `EXIT <symb>`
    Exit,

    // Debugging
    /// `DPRINT <symb>`
    DPrint,
    /// Dump engine state to the diagnostic channel.
    Break,

    // Stack-style family
    /// Empty the data stack.
    ClearS,
    AddS,
    SubS,
    MulS,
    IDivS,
    DivS,
    LtS,
    GtS,
    EqS,
    AndS,
    OrS,
    NotS,
    Int2CharS,
    Stri2IntS,
    Int2FloatS,
    Float2IntS,
    /// `JUMPIFEQS <label>`
    JumpIfEqS,
    /// `JUMPIFNEQS <label>`
    JumpIfNeqS,
}

/// All opcodes, in definition order.
pub const ALL_OPCODES: [Opcode; 56] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::PushS,
    Opcode::PopS,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Int2Float,
    Opcode::Float2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
    Opcode::ClearS,
    Opcode::AddS,
    Opcode::SubS,
    Opcode::MulS,
    Opcode::IDivS,
    Opcode::DivS,
    Opcode::LtS,
    Opcode::GtS,
    Opcode::EqS,
    Opcode::AndS,
    Opcode::OrS,
    Opcode::NotS,
    Opcode::Int2CharS,
    Opcode::Stri2IntS,
    Opcode::Int2FloatS,
    Opcode::Float2IntS,
    Opcode::JumpIfEqS,
    Opcode::JumpIfNeqS,
];

impl Opcode {
    /// Returns the source mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Int2Float => "INT2FLOAT",
            Opcode::Float2Int => "FLOAT2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
            Opcode::ClearS => "CLEARS",
            Opcode::AddS => "ADDS",
            Opcode::SubS => "SUBS",
            Opcode::MulS => "MULS",
            Opcode::IDivS => "IDIVS",
            Opcode::DivS => "DIVS",
            Opcode::LtS => "LTS",
            Opcode::GtS => "GTS",
            Opcode::EqS => "EQS",
            Opcode::AndS => "ANDS",
            Opcode::OrS => "ORS",
            Opcode::NotS => "NOTS",
            Opcode::Int2CharS => "INT2CHARS",
            Opcode::Stri2IntS => "STRI2INTS",
            Opcode::Int2FloatS => "INT2FLOATS",
            Opcode::Float2IntS => "FLOAT2INTS",
            Opcode::JumpIfEqS => "JUMPIFEQS",
            Opcode::JumpIfNeqS => "JUMPIFNEQS",
        }
    }

    /// Look up an opcode by mnemonic, ignoring case.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic.trim()))
            .copied()
    }

    /// Number of leading arguments the opcode requires.
    pub fn arity(&self) -> usize {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break
            | Opcode::ClearS
            | Opcode::AddS
            | Opcode::SubS
            | Opcode::MulS
            | Opcode::IDivS
            | Opcode::DivS
            | Opcode::LtS
            | Opcode::GtS
            | Opcode::EqS
            | Opcode::AndS
            | Opcode::OrS
            | Opcode::NotS
            | Opcode::Int2CharS
            | Opcode::Stri2IntS
            | Opcode::Int2FloatS
            | Opcode::Float2IntS => 0,

            Opcode::DefVar
            | Opcode::Call
            | Opcode::PushS
            | Opcode::PopS
            | Opcode::Write
            | Opcode::Label
            | Opcode::Jump
            | Opcode::Exit
            | Opcode::DPrint
            | Opcode::JumpIfEqS
            | Opcode::JumpIfNeqS => 1,

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Int2Float
            | Opcode::Float2Int
            | Opcode::Read
            | Opcode::Strlen
            | Opcode::Type => 2,

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar
            | Opcode::JumpIfEq
            | Opcode::JumpIfNeq => 3,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 56);
    }

    #[test]
    fn mnemonic_roundtrip() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
            assert_eq!(Opcode::from_mnemonic(m), Some(opcode));
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Opcode::from_mnemonic("defvar"), Some(Opcode::DefVar));
        assert_eq!(Opcode::from_mnemonic("JumpIfEqS"), Some(Opcode::JumpIfEqS));
        assert_eq!(Opcode::from_mnemonic("HALT"), None);
    }

    #[test]
    fn stack_forms_take_no_operands() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            let stack_form = m.ends_with('S')
                && !matches!(opcode, Opcode::PushS | Opcode::PopS)
                && Opcode::from_mnemonic(&m[..m.len() - 1]).is_some();
            if stack_form && !matches!(opcode, Opcode::JumpIfEqS | Opcode::JumpIfNeqS) {
                assert_eq!(opcode.arity(), 0, "{m}");
            }
        }
    }

    #[test]
    fn register_forms_arity() {
        assert_eq!(Opcode::Move.arity(), 2);
        assert_eq!(Opcode::SetChar.arity(), 3);
        assert_eq!(Opcode::JumpIfEq.arity(), 3);
        assert_eq!(Opcode::JumpIfEqS.arity(), 1);
        assert_eq!(Opcode::Break.arity(), 0);
    }
}
