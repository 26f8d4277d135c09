use crate::error::{StackKind, Trap};

/// The primary and secondary boolean stacks of the machine.
///
/// The primary stack holds partial condition results; the secondary stack
/// holds results stashed while a nested junction is evaluated.
pub struct Stacks {
    primary: Vec<bool>,
    secondary: Vec<bool>,
}

impl Stacks {
    /// Creates an empty pair of stacks.
    pub fn new() -> Self {
        Stacks {
            primary: Vec::new(),
            secondary: Vec::new(),
        }
    }

    /// Pushes a value onto the primary stack.
    pub fn push(&mut self, value: bool) {
        self.primary.push(value);
    }

    /// Pops a value from the primary stack.
    pub fn pop(&mut self) -> Result<bool, Trap> {
        self.primary
            .pop()
            .ok_or(Trap::StackUnderflow(StackKind::Primary))
    }

    /// Returns the top of the primary stack without removing it.
    pub fn peek(&self) -> Result<bool, Trap> {
        self.primary
            .last()
            .copied()
            .ok_or(Trap::StackUnderflow(StackKind::Primary))
    }

    /// Moves the top of the primary stack to the secondary stack.
    pub fn stash(&mut self) -> Result<(), Trap> {
        let value = self.pop()?;
        self.secondary.push(value);
        Ok(())
    }

    /// Pops a value from the secondary stack.
    pub fn unstash(&mut self) -> Result<bool, Trap> {
        self.secondary
            .pop()
            .ok_or(Trap::StackUnderflow(StackKind::Secondary))
    }

    /// Returns the depth of the primary and secondary stacks.
    pub fn depth(&self) -> (usize, usize) {
        (self.primary.len(), self.secondary.len())
    }
}
