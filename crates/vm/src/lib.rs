//! IPPcode22 virtual machine: executes a loaded [`Program`].
//!
//! The VM is a frame-based machine with:
//! - A global frame, an optional temporary frame and a stack of local frames
//! - An operand (data) stack used by PUSHS/POPS and the `*S` instructions
//! - A call stack of return orders for CALL/RETURN
//!
//! Execution walks the program's admitted orders in ascending sequence,
//! skipping gaps, until no instruction remains, EXIT, or an error.
//!
//! # Usage
//!
//! ```
//! use ipp_common::{Argument, Instruction, Opcode, Program, Value};
//! use ipp_vm::VM;
//!
//! let program = Program::from_instructions([
//!     Instruction::new(1, Opcode::Write).arg(Argument::Const(Value::from("hi"))),
//!     Instruction::new(2, Opcode::Exit).arg(Argument::Const(Value::Int(3))),
//! ])
//! .unwrap();
//!
//! let mut out = Vec::new();
//! let code = VM::new(&program).with_output(&mut out).execute().unwrap();
//! assert_eq!(code, 3);
//! assert_eq!(out, b"hi");
//! ```

pub mod error;
pub mod execute;
pub mod frame;
pub mod input;
pub mod machine;
pub mod ops;
mod register;
mod stack;

pub use error::RuntimeError;
pub use execute::Step;
pub use frame::{Frame, FrameError, FrameStore};
pub use input::{InputLines, LineSource};
pub use machine::VM;

use ipp_common::Program;

/// Execute a program against the process's stdin, stdout and stderr.
///
/// Returns the exit code: the operand of EXIT, or 0 when the program runs
/// off its last instruction.
///
/// # Errors
///
/// Returns [`RuntimeError`] if execution fails; its
/// [`exit_code`](RuntimeError::exit_code) is the status to exit with.
pub fn run(program: &Program) -> Result<i32, RuntimeError> {
    VM::new(program).execute()
}
