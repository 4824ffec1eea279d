//! The program store: admitted instructions keyed by order, plus labels.
//!
//! Orders are sparse. Execution walks the admitted orders in ascending
//! sequence, so the store keeps them in a `BTreeMap` and answers
//! "next instruction after order N" with a range query.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use crate::error::ProgramError;
use crate::instruction::{Argument, Instruction};
use crate::opcode::Opcode;

/// An IPPcode22 program: a sparse order → instruction map and a label table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: BTreeMap<i64, Instruction>,
    labels: HashMap<String, i64>,
    max_order: i64,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a program by admitting every instruction in turn.
    pub fn from_instructions(
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> Result<Self, ProgramError> {
        let mut program = Self::new();
        for instr in instructions {
            program.admit(instr)?;
        }
        Ok(program)
    }

    /// Admit one instruction.
    ///
    /// Rejects non-positive and duplicate orders and argument gaps. A LABEL
    /// also registers its name; a second LABEL with the same name is a
    /// semantic error.
    pub fn admit(&mut self, instr: Instruction) -> Result<(), ProgramError> {
        if instr.order <= 0 {
            return Err(ProgramError::InvalidOrder(instr.order));
        }
        if self.instructions.contains_key(&instr.order) {
            return Err(ProgramError::DuplicateOrder(instr.order));
        }
        if let Some((position, missing)) = instr.argument_gap() {
            return Err(ProgramError::ArgumentGap {
                order: instr.order,
                position,
                missing,
            });
        }

        if instr.opcode == Opcode::Label {
            let name = match instr.get(1) {
                Some(Argument::Label(name)) => name.clone(),
                _ => return Err(ProgramError::MissingLabelName { order: instr.order }),
            };
            if self.labels.contains_key(&name) {
                return Err(ProgramError::LabelRedefinition(name));
            }
            self.labels.insert(name, instr.order);
        }

        self.max_order = self.max_order.max(instr.order);
        self.instructions.insert(instr.order, instr);
        Ok(())
    }

    /// The admitted instruction with the smallest order strictly greater
    /// than `order`, if any.
    pub fn instruction_after(&self, order: i64) -> Option<&Instruction> {
        if order >= self.max_order {
            return None;
        }
        self.instructions
            .range((Bound::Excluded(order), Bound::Unbounded))
            .next()
            .map(|(_, instr)| instr)
    }

    /// Order of the LABEL instruction declaring `name`.
    pub fn resolve_label(&self, name: &str) -> Result<i64, ProgramError> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| ProgramError::UnknownLabel(name.to_string()))
    }

    /// Instruction admitted at exactly `order`.
    pub fn get(&self, order: i64) -> Option<&Instruction> {
        self.instructions.get(&order)
    }

    /// Highest admitted order, 0 for an empty program.
    pub fn max_order(&self) -> i64 {
        self.max_order
    }

    /// Number of admitted instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if no instruction has been admitted.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of registered labels.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}
