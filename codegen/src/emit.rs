//! Low-level command emitter.
//!
//! Appends commands to a buffer while tracking the depth of both stacks so
//! that the compiler can verify every circuit block is balanced.

use ladder_il::{Command, Effect, Operand, TargetRef};

/// The operator used to combine two partial results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combine {
    And,
    Or,
}

/// Accumulates commands.
pub struct Emitter {
    commands: Vec<Command>,
    primary_depth: usize,
    secondary_depth: usize,
    max_primary_depth: usize,
    max_secondary_depth: usize,
    underflow: bool,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter {
            commands: Vec::new(),
            primary_depth: 0,
            secondary_depth: 0,
            max_primary_depth: 0,
            max_secondary_depth: 0,
            underflow: false,
        }
    }

    /// Emits a load (pushes one).
    pub fn emit_load(&mut self, operand: Operand) {
        self.emit(Command::Load(operand));
    }

    /// Emits STASH (moves the primary top to the secondary stack).
    pub fn emit_stash(&mut self) {
        self.emit(Command::Stash);
    }

    /// Emits ANB or ORB (pops one from each stack, pushes one).
    pub fn emit_block_combine(&mut self, combine: Combine) {
        match combine {
            Combine::And => self.emit(Command::AndBlock),
            Combine::Or => self.emit(Command::OrBlock),
        }
    }

    /// Emits AND or OR (pops two, pushes one).
    pub fn emit_top2_combine(&mut self, combine: Combine) {
        match combine {
            Combine::And => self.emit(Command::AndTop2),
            Combine::Or => self.emit(Command::OrTop2),
        }
    }

    /// Emits DUP (pushes a copy of the top).
    pub fn emit_duplicate(&mut self) {
        self.emit(Command::Duplicate);
    }

    /// Emits an action command (reads the top, leaves it in place).
    pub fn emit_apply(&mut self, effect: Effect, target: TargetRef) {
        self.emit(Command::Apply { effect, target });
    }

    /// Emits POP (pops one).
    pub fn emit_pop(&mut self) {
        self.emit(Command::Pop);
    }

    /// Returns the current depth of the primary and secondary stacks.
    pub fn depth(&self) -> (usize, usize) {
        (self.primary_depth, self.secondary_depth)
    }

    /// Returns true if a command was emitted that takes more values than
    /// the stack holds at that point.
    pub fn underflowed(&self) -> bool {
        self.underflow
    }

    /// Returns the maximum depth reached on the primary and secondary stacks.
    pub fn max_depth(&self) -> (usize, usize) {
        (self.max_primary_depth, self.max_secondary_depth)
    }

    /// Returns the accumulated commands.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consumes the emitter and returns the accumulated commands.
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    fn emit(&mut self, command: Command) {
        let effect = command.stack_effect();

        self.underflow |= self.primary_depth < effect.primary_pops
            || self.secondary_depth < effect.secondary_pops;

        self.primary_depth = self.primary_depth.saturating_sub(effect.primary_pops);
        self.secondary_depth = self.secondary_depth.saturating_sub(effect.secondary_pops);
        self.primary_depth += effect.primary_pushes;
        self.secondary_depth += effect.secondary_pushes;

        self.max_primary_depth = self.max_primary_depth.max(self.primary_depth);
        self.max_secondary_depth = self.max_secondary_depth.max(self.secondary_depth);

        self.commands.push(command);
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladder_il::{BitRef, DeviceRef};

    fn operand(address: u32) -> Operand {
        Operand::Bit {
            bit: BitRef::Contact(DeviceRef::new("M", address)),
            inverse: false,
        }
    }

    #[test]
    fn emitter_when_load_then_primary_depth_one() {
        let mut em = Emitter::new();
        em.emit_load(operand(0));

        assert_eq!(em.depth(), (1, 0));
        assert_eq!(em.commands(), &[Command::Load(operand(0))]);
    }

    #[test]
    fn emitter_when_stash_then_moves_to_secondary() {
        let mut em = Emitter::new();
        em.emit_load(operand(0));
        em.emit_stash();

        assert_eq!(em.depth(), (0, 1));
    }

    #[test]
    fn emitter_when_block_combine_then_both_stacks_reduced() {
        let mut em = Emitter::new();
        em.emit_load(operand(0));
        em.emit_stash();
        em.emit_load(operand(1));
        em.emit_load(operand(2));
        em.emit_top2_combine(Combine::Or);
        em.emit_block_combine(Combine::And);

        assert_eq!(em.depth(), (1, 0));
        assert_eq!(em.max_depth(), (2, 1));
        assert!(!em.underflowed());
        assert_eq!(em.commands()[4], Command::OrTop2);
        assert_eq!(em.commands()[5], Command::AndBlock);
    }

    #[test]
    fn emitter_when_duplicate_and_pop_then_depth_restored() {
        let mut em = Emitter::new();
        em.emit_load(operand(0));
        em.emit_duplicate();
        em.emit_pop();

        assert_eq!(em.depth(), (1, 0));
        assert_eq!(em.max_depth(), (2, 0));
    }

    #[test]
    fn emitter_when_pop_on_empty_then_underflowed() {
        let mut em = Emitter::new();
        em.emit_pop();

        assert!(em.underflowed());
        assert_eq!(em.depth(), (0, 0));
    }

    #[test]
    fn emitter_when_block_combine_without_stash_then_underflowed() {
        let mut em = Emitter::new();
        em.emit_load(operand(0));
        em.emit_block_combine(Combine::Or);

        assert!(em.underflowed());
    }
}
