//! Register-style instructions: operands are symbols, the result goes to
//! the variable in arg1.

use ipp_common::{Instruction, Value};

use crate::error::RuntimeError;
use crate::machine::VM;
use crate::ops::{self, OpError};

impl<'a> VM<'a> {
    /// `OP var symb1 symb2`
    pub(crate) fn exec_binary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(&Value, &Value) -> Result<Value, OpError>,
    ) -> Result<(), RuntimeError> {
        let dest = self.var_arg(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;
        let result = op(&a, &b).map_err(|e| e.at(instr))?;
        self.store(instr, dest, result)
    }

    /// `OP var symb`
    pub(crate) fn exec_unary(
        &mut self,
        instr: &Instruction,
        op: impl FnOnce(&Value) -> Result<Value, OpError>,
    ) -> Result<(), RuntimeError> {
        let dest = self.var_arg(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let result = op(&a).map_err(|e| e.at(instr))?;
        self.store(instr, dest, result)
    }

    /// SETCHAR reads its target from the destination variable itself.
    pub(crate) fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.var_arg(instr, 1)?;
        let target = self
            .frames
            .read(dest)
            .cloned()
            .map_err(|e| e.at(instr.order))?;
        let index = self.symbol(instr, 2)?;
        let replacement = self.symbol(instr, 3)?;
        let result = ops::setchar(&target, &index, &replacement).map_err(|e| e.at(instr))?;
        self.store(instr, dest, result)
    }

    pub(crate) fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.var_arg(instr, 1)?;
        let value = self.symbol_or_uninit(instr, 2)?;
        self.store(instr, dest, ops::type_name(value.as_ref()))
    }
}
