//! IPPcode22 common types.
//!
//! This crate provides the foundational data structures for the IPPcode22
//! instruction set:
//!
//! - [`Opcode`]: every register-style and stack-style opcode
//! - [`TypeTag`]: the seven type tags
//! - [`Value`]: runtime values held by variables and the data stack
//! - [`Instruction`]: order, opcode and up to three typed arguments
//! - [`Program`]: the sparse program store with its label table
//! - [`ErrorCategory`]: the exit-status taxonomy
//! - [`hexfloat`] and [`escape`]: the literal codecs shared by the loader
//!   and READ

pub mod error;
pub mod escape;
pub mod hexfloat;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod type_tag;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::{ErrorCategory, ProgramError};
pub use instruction::{Argument, FrameKind, Instruction, VarRef};
pub use opcode::Opcode;
pub use program::Program;
pub use type_tag::TypeTag;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// WRITE output read back through READ yields the same double.
        #[test]
        fn hex_float_roundtrip(bits in any::<u64>()) {
            let value = f64::from_bits(bits);
            prop_assume!(value.is_finite());
            let text = hexfloat::format_hex(value);
            let parsed = hexfloat::parse_hex(&text).unwrap();
            prop_assert_eq!(parsed.to_bits(), value.to_bits());
        }

        /// Walking a sparse program visits every order once, ascending.
        #[test]
        fn instruction_after_is_monotonic(
            orders in prop::collection::btree_set(1i64..10_000, 0..60)
        ) {
            let program = Program::from_instructions(
                orders.iter().map(|&o| Instruction::new(o, Opcode::Break)),
            )
            .unwrap();

            let mut visited = Vec::new();
            let mut pc = 0;
            while let Some(instr) = program.instruction_after(pc) {
                prop_assert!(instr.order > pc);
                visited.push(instr.order);
                pc = instr.order;
            }
            prop_assert_eq!(visited, orders.into_iter().collect::<Vec<_>>());
        }
    }
}
