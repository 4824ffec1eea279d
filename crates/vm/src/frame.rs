//! Variable frames: one global frame, an optional pending temporary frame,
//! and a stack of local frames whose top is `LF`.

use std::collections::BTreeMap;
use std::fmt;

use ipp_common::{FrameKind, Value, VarRef};

use crate::error::RuntimeError;

/// Frame-store failures, before the instruction order is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    Missing(FrameKind),
    Redefinition(String),
    Undeclared(String),
    Uninitialized(String),
}

impl FrameError {
    pub(crate) fn at(self, at: i64) -> RuntimeError {
        match self {
            FrameError::Missing(frame) => RuntimeError::MissingFrame { at, frame },
            FrameError::Redefinition(var) => RuntimeError::VariableRedefinition { at, var },
            FrameError::Undeclared(var) => RuntimeError::UndeclaredVariable { at, var },
            FrameError::Uninitialized(var) => RuntimeError::UninitializedVariable { at, var },
        }
    }
}

/// A named-variable scope. `None` marks a declared, uninitialized variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    vars: BTreeMap<String, Option<Value>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// `Some(None)` for a declared but uninitialized variable.
    pub fn get(&self, name: &str) -> Option<Option<&Value>> {
        self.vars.get(name).map(Option::as_ref)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.vars.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{name}: {}", Typed(value))?,
                None => write!(f, "{name}: <uninitialized>")?,
            }
        }
        f.write_str("}")
    }
}

/// `type@value` rendering used in state dumps.
pub(crate) struct Typed<'a>(pub &'a Value);

impl fmt::Display for Typed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Nil => f.write_str("nil@nil"),
            value => write!(f, "{}@{value}", value.type_tag()),
        }
    }
}

/// The three frame lifetimes.
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame addressed by `kind`.
    pub fn resolve(&self, kind: FrameKind) -> Result<&Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Temporary => self.temporary.as_ref().ok_or(FrameError::Missing(kind)),
            FrameKind::Local => self.locals.last().ok_or(FrameError::Missing(kind)),
        }
    }

    fn resolve_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Temporary => self.temporary.as_mut().ok_or(FrameError::Missing(kind)),
            FrameKind::Local => self.locals.last_mut().ok_or(FrameError::Missing(kind)),
        }
    }

    /// Declare `var` uninitialized in its frame.
    pub fn declare(&mut self, var: &VarRef) -> Result<(), FrameError> {
        let frame = self.resolve_mut(var.frame)?;
        if frame.vars.contains_key(&var.name) {
            return Err(FrameError::Redefinition(var.to_string()));
        }
        frame.vars.insert(var.name.clone(), None);
        Ok(())
    }

    /// Current value of `var`; `Ok(None)` if declared but uninitialized.
    pub fn lookup(&self, var: &VarRef) -> Result<Option<&Value>, FrameError> {
        self.resolve(var.frame)?
            .get(&var.name)
            .ok_or_else(|| FrameError::Undeclared(var.to_string()))
    }

    /// Current value of `var`, failing if it was never assigned.
    pub fn read(&self, var: &VarRef) -> Result<&Value, FrameError> {
        self.lookup(var)?
            .ok_or_else(|| FrameError::Uninitialized(var.to_string()))
    }

    /// Overwrite a declared variable, marking it initialized.
    pub fn assign(&mut self, var: &VarRef, value: Value) -> Result<(), FrameError> {
        let slot = self
            .resolve_mut(var.frame)?
            .vars
            .get_mut(&var.name)
            .ok_or_else(|| FrameError::Undeclared(var.to_string()))?;
        *slot = Some(value);
        Ok(())
    }

    /// Replace any pending temporary frame with an empty one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// Move the pending temporary frame onto the frame stack.
    pub fn push_temporary(&mut self) -> Result<(), FrameError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameError::Missing(FrameKind::Temporary))?;
        self.locals.push(frame);
        Ok(())
    }

    /// Move the local frame back into the temporary slot.
    pub fn pop_local(&mut self) -> Result<(), FrameError> {
        let frame = self
            .locals
            .pop()
            .ok_or(FrameError::Missing(FrameKind::Local))?;
        self.temporary = Some(frame);
        Ok(())
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// Local frames, bottom first.
    pub fn locals(&self) -> &[Frame] {
        &self.locals
    }
}
