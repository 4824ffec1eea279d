//! VM state: frames, data stack, call stack, program counter and the I/O
//! collaborators.

use std::io::{self, BufReader, BufWriter, Write};

use ipp_common::{Argument, Instruction, Program, TypeTag, Value, VarRef};

use crate::error::RuntimeError;
use crate::frame::{FrameStore, Typed};
use crate::input::{InputLines, LineSource};

/// The IPPcode22 virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Global, temporary and local frames.
    pub(crate) frames: FrameStore,
    /// Operand stack shared by PUSHS/POPS and the stack-style family.
    pub(crate) data_stack: Vec<Value>,
    /// Orders of the CALL instructions awaiting RETURN.
    pub(crate) call_stack: Vec<i64>,
    /// Order of the instruction being (or last) executed; 0 before the first step.
    pub(crate) pc: i64,
    /// Instructions dispatched so far.
    pub(crate) executed: u64,
    pub(crate) input: Box<dyn LineSource + 'a>,
    pub(crate) output: Box<dyn Write + 'a>,
    pub(crate) diagnostics: Box<dyn Write + 'a>,
}

impl<'a> VM<'a> {
    /// Create a VM reading from stdin, writing to buffered stdout, with
    /// diagnostics on stderr.
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            frames: FrameStore::new(),
            data_stack: Vec::new(),
            call_stack: Vec::new(),
            pc: 0,
            executed: 0,
            input: Box::new(InputLines::new(BufReader::new(io::stdin()))),
            output: Box::new(BufWriter::new(io::stdout())),
            diagnostics: Box::new(io::stderr()),
        }
    }

    /// Replace the READ input source.
    pub fn with_input(mut self, input: impl LineSource + 'a) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Replace the WRITE output stream.
    pub fn with_output(mut self, output: impl Write + 'a) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Replace the DPRINT/BREAK stream.
    pub fn with_diagnostics(mut self, diagnostics: impl Write + 'a) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    pub fn pc(&self) -> i64 {
        self.pc
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    /// Data stack, bottom first.
    pub fn data_stack(&self) -> &[Value] {
        &self.data_stack
    }

    /// Pending return addresses, oldest first.
    pub fn call_stack(&self) -> &[i64] {
        &self.call_stack
    }

    /// Multi-line engine state report written by BREAK.
    pub fn state_report(&self) -> String {
        let temporary = self
            .frames
            .temporary()
            .map_or_else(|| "undefined".to_string(), |f| f.to_string());
        let locals = join(self.frames.locals().iter().map(|f| f.to_string()));
        let calls = join(self.call_stack.iter().map(|o| o.to_string()));
        let values = join(self.data_stack.iter().map(|v| Typed(v).to_string()));

        format!(
            "position: instruction {}\n\
             executed: {}\n\
             GF: {}\n\
             TF: {temporary}\n\
             frame stack: [{locals}]\n\
             call stack: [{calls}]\n\
             data stack: [{values}]\n",
            self.pc,
            self.executed,
            self.frames.global(),
        )
    }

    /// Reject instructions whose arguments do not match the opcode's arity.
    pub(crate) fn check_arity(&self, instr: &Instruction) -> Result<(), RuntimeError> {
        let arity = instr.opcode.arity();
        for (i, arg) in instr.args.iter().enumerate() {
            let position = i + 1;
            match arg {
                None if position <= arity => {
                    return Err(RuntimeError::MissingArgument {
                        at: instr.order,
                        opcode: instr.opcode,
                        position,
                    })
                }
                Some(_) if position > arity => {
                    return Err(RuntimeError::UnexpectedArgument {
                        at: instr.order,
                        opcode: instr.opcode,
                        position,
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn arg<'i>(instr: &'i Instruction, position: usize) -> Result<&'i Argument, RuntimeError> {
        instr.get(position).ok_or(RuntimeError::MissingArgument {
            at: instr.order,
            opcode: instr.opcode,
            position,
        })
    }

    fn bad_argument(
        instr: &Instruction,
        position: usize,
        expected: &'static str,
        found: &Argument,
    ) -> RuntimeError {
        RuntimeError::BadArgument {
            at: instr.order,
            opcode: instr.opcode,
            position,
            expected,
            found: found.kind(),
        }
    }

    /// The variable reference at `position`.
    pub(crate) fn var_arg<'i>(
        &self,
        instr: &'i Instruction,
        position: usize,
    ) -> Result<&'i VarRef, RuntimeError> {
        match Self::arg(instr, position)? {
            Argument::Var(var) => Ok(var),
            other => Err(Self::bad_argument(instr, position, "var", other)),
        }
    }

    /// The label name at `position`.
    pub(crate) fn label_arg<'i>(
        &self,
        instr: &'i Instruction,
        position: usize,
    ) -> Result<&'i str, RuntimeError> {
        match Self::arg(instr, position)? {
            Argument::Label(name) => Ok(name),
            other => Err(Self::bad_argument(instr, position, "label", other)),
        }
    }

    /// The type operand at `position`.
    pub(crate) fn type_arg(&self, instr: &Instruction, position: usize) -> Result<TypeTag, RuntimeError> {
        match Self::arg(instr, position)? {
            Argument::Type(tag) => Ok(*tag),
            other => Err(Self::bad_argument(instr, position, "type", other)),
        }
    }

    /// Resolve a symbol: a literal, or the value of an initialized variable.
    pub(crate) fn symbol(&self, instr: &Instruction, position: usize) -> Result<Value, RuntimeError> {
        match Self::arg(instr, position)? {
            Argument::Const(value) => Ok(value.clone()),
            Argument::Var(var) => self
                .frames
                .read(var)
                .cloned()
                .map_err(|e| e.at(instr.order)),
            other => Err(Self::bad_argument(instr, position, "symbol", other)),
        }
    }

    /// Like [`symbol`](Self::symbol), but `None` for a declared variable
    /// that was never assigned.
    pub(crate) fn symbol_or_uninit(
        &self,
        instr: &Instruction,
        position: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        match Self::arg(instr, position)? {
            Argument::Const(value) => Ok(Some(value.clone())),
            Argument::Var(var) => self
                .frames
                .lookup(var)
                .map(|v| v.cloned())
                .map_err(|e| e.at(instr.order)),
            other => Err(Self::bad_argument(instr, position, "symbol", other)),
        }
    }

    /// Fail unless `var` is declared in an existing frame.
    pub(crate) fn ensure_declared(&self, instr: &Instruction, var: &VarRef) -> Result<(), RuntimeError> {
        self.frames
            .lookup(var)
            .map(|_| ())
            .map_err(|e| e.at(instr.order))
    }

    /// Assign `value` to `var`.
    pub(crate) fn store(
        &mut self,
        instr: &Instruction,
        var: &VarRef,
        value: Value,
    ) -> Result<(), RuntimeError> {
        self.frames
            .assign(var, value)
            .map_err(|e| e.at(instr.order))
    }

    /// Order of the LABEL named at `position`.
    pub(crate) fn jump_target(&self, instr: &Instruction, position: usize) -> Result<i64, RuntimeError> {
        let label = self.label_arg(instr, position)?;
        self.program
            .resolve_label(label)
            .map_err(|_| RuntimeError::UnknownLabel {
                at: instr.order,
                label: label.to_string(),
            })
    }

    /// The top `n` values of the data stack, bottom first.
    pub(crate) fn peek(&self, instr: &Instruction, n: usize) -> Result<&[Value], RuntimeError> {
        let len = self.data_stack.len();
        if len < n {
            return Err(RuntimeError::DataStackUnderflow { at: instr.order });
        }
        Ok(&self.data_stack[len - n..])
    }

    /// Remove the top `n` values and push `value` in their place.
    pub(crate) fn replace_top(&mut self, n: usize, value: Value) {
        let keep = self.data_stack.len().saturating_sub(n);
        self.data_stack.truncate(keep);
        self.data_stack.push(value);
    }

    pub(crate) fn emit(&mut self, instr: &Instruction, text: &str) -> Result<(), RuntimeError> {
        self.output
            .write_all(text.as_bytes())
            .map_err(|e| output_error(instr.order, &e))
    }

    pub(crate) fn emit_diagnostic(&mut self, instr: &Instruction, text: &str) -> Result<(), RuntimeError> {
        self.diagnostics
            .write_all(text.as_bytes())
            .and_then(|()| self.diagnostics.flush())
            .map_err(|e| output_error(instr.order, &e))
    }

    pub(crate) fn flush(&mut self) -> Result<(), RuntimeError> {
        self.output
            .flush()
            .and_then(|()| self.diagnostics.flush())
            .map_err(|e| output_error(self.pc, &e))
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

fn output_error(at: i64, e: &io::Error) -> RuntimeError {
    RuntimeError::Output {
        at,
        message: e.to_string(),
    }
}
