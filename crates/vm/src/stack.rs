//! Stack-style instructions: operands come off the data stack and the
//! result goes back onto it.
//!
//! Operands are inspected in place and only removed once the operation has
//! succeeded, so a failing instruction leaves the stack untouched.

use ipp_common::{Instruction, Value};

use crate::error::RuntimeError;
use crate::machine::VM;
use crate::ops::{self, OpError};

impl<'a> VM<'a> {
    /// Pops `b` then `a`, pushes `op(a, b)`.
    pub(crate) fn exec_stack_binary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(&Value, &Value) -> Result<Value, OpError>,
    ) -> Result<(), RuntimeError> {
        let result = match self.peek(instr, 2)? {
            [a, b] => op(a, b).map_err(|e| e.at(instr))?,
            _ => return Err(RuntimeError::DataStackUnderflow { at: instr.order }),
        };
        self.replace_top(2, result);
        Ok(())
    }

    pub(crate) fn exec_stack_unary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(&Value) -> Result<Value, OpError>,
    ) -> Result<(), RuntimeError> {
        let result = match self.peek(instr, 1)? {
            [a] => op(a).map_err(|e| e.at(instr))?,
            _ => return Err(RuntimeError::DataStackUnderflow { at: instr.order }),
        };
        self.replace_top(1, result);
        Ok(())
    }

    /// JUMPIFEQS / JUMPIFNEQS: both operands are consumed whether or not
    /// the jump is taken.
    pub(crate) fn exec_stack_jump_if(
        &mut self,
        instr: &Instruction,
        want_equal: bool,
    ) -> Result<(), RuntimeError> {
        let target = self.jump_target(instr, 1)?;
        let equal = match self.peek(instr, 2)? {
            [a, b] => ops::equals(a, b).map_err(|e| e.at(instr))?,
            _ => return Err(RuntimeError::DataStackUnderflow { at: instr.order }),
        };

        let keep = self.data_stack.len() - 2;
        self.data_stack.truncate(keep);
        if equal == want_equal {
            self.pc = target;
        }
        Ok(())
    }
}
