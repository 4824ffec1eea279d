//! Dispatch loop, control flow, frame management and I/O.
//!
//! The value-producing families live in `register.rs` and `stack.rs`.

use ipp_common::{Instruction, Opcode, Value};
use tracing::{debug, trace};

use crate::error::RuntimeError;
use crate::machine::VM;
use crate::ops::{self, Arith, Logic, Relation};

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halt(i32),
}

impl<'a> VM<'a> {
    /// Run until the program ends, EXIT, or an error. Returns the exit code.
    ///
    /// Output is flushed in every case.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        let result = loop {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Halt(code)) => break Ok(code),
                Err(e) => break Err(e),
            }
        };
        let flushed = self.flush();

        match &result {
            Ok(code) => debug!(code, executed = self.executed, "program halted"),
            Err(e) => debug!(
                error = %e,
                exit_code = e.exit_code(),
                executed = self.executed,
                "program failed"
            ),
        }

        let code = result?;
        flushed?;
        Ok(code)
    }

    /// Fetch and execute the next admitted instruction.
    pub fn step(&mut self) -> Result<Step, RuntimeError> {
        let program = self.program;
        let Some(instr) = program.instruction_after(self.pc) else {
            return Ok(Step::Halt(0));
        };

        self.pc = instr.order;
        self.check_arity(instr)?;
        self.executed += 1;
        trace!(order = instr.order, opcode = %instr.opcode, "dispatch");

        self.dispatch(instr)
    }

    fn dispatch(&mut self, instr: &Instruction) -> Result<Step, RuntimeError> {
        match instr.opcode {
            // Frames
            Opcode::CreateFrame => self.frames.create_temporary(),
            Opcode::PushFrame => self.frames.push_temporary().map_err(|e| e.at(instr.order))?,
            Opcode::PopFrame => self.frames.pop_local().map_err(|e| e.at(instr.order))?,
            Opcode::DefVar => self.exec_defvar(instr)?,

            // Flow
            Opcode::Call => self.exec_call(instr)?,
            Opcode::Return => self.exec_return(instr)?,
            Opcode::Label => {}
            Opcode::Jump => self.pc = self.jump_target(instr, 1)?,
            Opcode::JumpIfEq => self.exec_jump_if(instr, true)?,
            Opcode::JumpIfNeq => self.exec_jump_if(instr, false)?,
            Opcode::Exit => return self.exec_exit(instr),

            // Data movement
            Opcode::Move => self.exec_move(instr)?,
            Opcode::PushS => self.exec_pushs(instr)?,
            Opcode::PopS => self.exec_pops(instr)?,

            // Register family
            Opcode::Add => self.exec_binary(instr, |a, b| ops::arith(Arith::Add, a, b))?,
            Opcode::Sub => self.exec_binary(instr, |a, b| ops::arith(Arith::Sub, a, b))?,
            Opcode::Mul => self.exec_binary(instr, |a, b| ops::arith(Arith::Mul, a, b))?,
            Opcode::Div => self.exec_binary(instr, |a, b| ops::arith(Arith::Div, a, b))?,
            Opcode::IDiv => self.exec_binary(instr, |a, b| ops::arith(Arith::IDiv, a, b))?,
            Opcode::Lt => self.exec_binary(instr, |a, b| relation(Relation::Lt, a, b))?,
            Opcode::Gt => self.exec_binary(instr, |a, b| relation(Relation::Gt, a, b))?,
            Opcode::Eq => self.exec_binary(instr, |a, b| relation(Relation::Eq, a, b))?,
            Opcode::And => self.exec_binary(instr, |a, b| ops::logic(Logic::And, a, b))?,
            Opcode::Or => self.exec_binary(instr, |a, b| ops::logic(Logic::Or, a, b))?,
            Opcode::Not => self.exec_unary(instr, ops::not)?,
            Opcode::Int2Char => self.exec_unary(instr, ops::int2char)?,
            Opcode::Stri2Int => self.exec_binary(instr, ops::stri2int)?,
            Opcode::Int2Float => self.exec_unary(instr, ops::int2float)?,
            Opcode::Float2Int => self.exec_unary(instr, ops::float2int)?,
            Opcode::Concat => self.exec_binary(instr, ops::concat)?,
            Opcode::Strlen => self.exec_unary(instr, ops::strlen)?,
            Opcode::GetChar => self.exec_binary(instr, ops::getchar)?,
            Opcode::SetChar => self.exec_setchar(instr)?,
            Opcode::Type => self.exec_type(instr)?,

            // Stack family
            Opcode::ClearS => self.data_stack.clear(),
            Opcode::AddS => self.exec_stack_binary(instr, |a, b| ops::arith(Arith::Add, a, b))?,
            Opcode::SubS => self.exec_stack_binary(instr, |a, b| ops::arith(Arith::Sub, a, b))?,
            Opcode::MulS => self.exec_stack_binary(instr, |a, b| ops::arith(Arith::Mul, a, b))?,
            Opcode::DivS => self.exec_stack_binary(instr, |a, b| ops::arith(Arith::Div, a, b))?,
            Opcode::IDivS => {
                self.exec_stack_binary(instr, |a, b| ops::arith(Arith::IDiv, a, b))?
            }
            Opcode::LtS => self.exec_stack_binary(instr, |a, b| relation(Relation::Lt, a, b))?,
            Opcode::GtS => self.exec_stack_binary(instr, |a, b| relation(Relation::Gt, a, b))?,
            Opcode::EqS => self.exec_stack_binary(instr, |a, b| relation(Relation::Eq, a, b))?,
            Opcode::AndS => self.exec_stack_binary(instr, |a, b| ops::logic(Logic::And, a, b))?,
            Opcode::OrS => self.exec_stack_binary(instr, |a, b| ops::logic(Logic::Or, a, b))?,
            Opcode::NotS => self.exec_stack_unary(instr, ops::not)?,
            Opcode::Int2CharS => self.exec_stack_unary(instr, ops::int2char)?,
            Opcode::Stri2IntS => self.exec_stack_binary(instr, ops::stri2int)?,
            Opcode::Int2FloatS => self.exec_stack_unary(instr, ops::int2float)?,
            Opcode::Float2IntS => self.exec_stack_unary(instr, ops::float2int)?,
            Opcode::JumpIfEqS => self.exec_stack_jump_if(instr, true)?,
            Opcode::JumpIfNeqS => self.exec_stack_jump_if(instr, false)?,

            // I/O
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => self.exec_write(instr)?,
            Opcode::DPrint => self.exec_dprint(instr)?,
            Opcode::Break => self.exec_break(instr)?,
        }
        Ok(Step::Continue)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.var_arg(instr, 1)?;
        self.frames.declare(var).map_err(|e| e.at(instr.order))
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.jump_target(instr, 1)?;
        self.call_stack.push(self.pc);
        self.pc = target;
        Ok(())
    }

    fn exec_return(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.pc = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::CallStackEmpty { at: instr.order })?;
        Ok(())
    }

    fn exec_jump_if(&mut self, instr: &Instruction, want_equal: bool) -> Result<(), RuntimeError> {
        let target = self.jump_target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;
        if ops::equals(&a, &b).map_err(|e| e.at(instr))? == want_equal {
            self.pc = target;
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Step, RuntimeError> {
        let code = match self.symbol(instr, 1)? {
            Value::Int(code) => code,
            _ => {
                return Err(RuntimeError::TypeMismatch {
                    at: instr.order,
                    opcode: instr.opcode,
                })
            }
        };
        match i32::try_from(code) {
            Ok(code) if (0..=49).contains(&code) => Ok(Step::Halt(code)),
            _ => Err(RuntimeError::ExitCodeOutOfRange {
                at: instr.order,
                code,
            }),
        }
    }

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.var_arg(instr, 1)?;
        let value = self.symbol(instr, 2)?;
        self.store(instr, dest, value)
    }

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 1)?;
        self.data_stack.push(value);
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.var_arg(instr, 1)?;
        self.ensure_declared(instr, dest)?;
        let value = self
            .data_stack
            .pop()
            .ok_or(RuntimeError::DataStackUnderflow { at: instr.order })?;
        self.store(instr, dest, value)
    }

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.var_arg(instr, 1)?;
        let requested = self.type_arg(instr, 2)?;
        if !requested.is_readable() {
            return Err(RuntimeError::TypeMismatch {
                at: instr.order,
                opcode: instr.opcode,
            });
        }
        self.ensure_declared(instr, dest)?;

        let line = self.input.next_line();
        let value = ops::read_value(line, requested);
        self.store(instr, dest, value)
    }

    fn exec_write(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 1)?;
        self.emit(instr, &value.to_string())
    }

    fn exec_dprint(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 1)?;
        self.emit_diagnostic(instr, &value.to_string())
    }

    fn exec_break(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let report = self.state_report();
        self.emit_diagnostic(instr, &report)
    }
}

fn relation(rel: Relation, a: &Value, b: &Value) -> Result<Value, ops::OpError> {
    ops::compare(rel, a, b).map(Value::Bool)
}
