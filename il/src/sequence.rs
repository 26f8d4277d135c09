use std::fmt;
use std::ops::Range;

use crate::command::Command;

/// The commands compiled from one circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Name of the logic unit the circuit belongs to.
    pub unit: String,
    /// Position of the circuit within its unit.
    pub circuit: usize,
    /// Positions of the block's commands within the sequence.
    pub range: Range<usize>,
}

/// An immutable, ordered list of commands executed in one pass per scan.
///
/// Sequences produced by the compiler are made of per-circuit blocks, each
/// of which starts and ends with both stacks empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandSequence {
    commands: Vec<Command>,
    blocks: Vec<Block>,
    max_primary_depth: usize,
    max_secondary_depth: usize,
}

impl CommandSequence {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the commands of one block, or an empty slice when the block's
    /// range lies outside this sequence.
    pub fn block_commands(&self, block: &Block) -> &[Command] {
        self.commands.get(block.range.clone()).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The deepest the primary stack gets while executing the sequence.
    pub fn max_primary_depth(&self) -> usize {
        self.max_primary_depth
    }

    /// The deepest the secondary stack gets while executing the sequence.
    pub fn max_secondary_depth(&self) -> usize {
        self.max_secondary_depth
    }
}

/// Wraps commands built outside the compiler. No block boundaries or depth
/// information is recorded.
impl From<Vec<Command>> for CommandSequence {
    fn from(commands: Vec<Command>) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Renders the sequence as a listing with one line per command and a header
/// line per block.
impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks = self.blocks.iter().peekable();
        for (index, command) in self.commands.iter().enumerate() {
            if let Some(block) = blocks.next_if(|block| block.range.start == index) {
                writeln!(f, "; {} #{}", block.unit, block.circuit)?;
            }
            writeln!(f, "{index:>5}  {command}")?;
        }
        Ok(())
    }
}

/// Fluent builder for constructing a [`CommandSequence`] block by block.
#[derive(Default)]
pub struct CommandSequenceBuilder {
    commands: Vec<Command>,
    blocks: Vec<Block>,
    max_primary_depth: usize,
    max_secondary_depth: usize,
}

impl CommandSequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the commands compiled from one circuit.
    pub fn add_block(mut self, unit: &str, circuit: usize, commands: Vec<Command>) -> Self {
        let start = self.commands.len();
        self.commands.extend(commands);
        self.blocks.push(Block {
            unit: unit.to_string(),
            circuit,
            range: start..self.commands.len(),
        });
        self
    }

    /// Records stack depths, keeping the largest seen so far.
    pub fn max_depth(mut self, primary: usize, secondary: usize) -> Self {
        self.max_primary_depth = self.max_primary_depth.max(primary);
        self.max_secondary_depth = self.max_secondary_depth.max(secondary);
        self
    }

    pub fn build(self) -> CommandSequence {
        CommandSequence {
            commands: self.commands,
            blocks: self.blocks,
            max_primary_depth: self.max_primary_depth,
            max_secondary_depth: self.max_secondary_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BitRef, DeviceRef, Effect, Operand, TargetRef};

    fn load(address: u32) -> Command {
        Command::Load(Operand::Bit {
            bit: BitRef::Input(DeviceRef::new("X", address)),
            inverse: false,
        })
    }

    fn out(address: u32) -> Command {
        Command::Apply {
            effect: Effect::Output,
            target: TargetRef::Bit(BitRef::Contact(DeviceRef::new("Y", address))),
        }
    }

    #[test]
    fn build_when_two_blocks_then_ranges_are_contiguous() {
        let sequence = CommandSequenceBuilder::new()
            .add_block("main", 0, vec![load(0), out(0), Command::Pop])
            .add_block("main", 1, vec![load(1), out(1), Command::Pop])
            .max_depth(1, 0)
            .build();

        assert_eq!(sequence.len(), 6);
        assert_eq!(sequence.blocks()[0].range, 0..3);
        assert_eq!(sequence.blocks()[1].range, 3..6);
        assert_eq!(sequence.block_commands(&sequence.blocks()[1])[0], load(1));
        assert_eq!(sequence.max_primary_depth(), 1);
    }

    #[test]
    fn block_commands_when_block_from_longer_sequence_then_empty() {
        let long = CommandSequenceBuilder::new()
            .add_block("main", 0, vec![load(0), out(0), Command::Pop])
            .add_block("main", 1, vec![load(1), out(1), Command::Pop])
            .build();
        let short = CommandSequenceBuilder::new()
            .add_block("main", 0, vec![load(0), out(0), Command::Pop])
            .build();

        assert!(short.block_commands(&long.blocks()[1]).is_empty());
        assert_eq!(short.block_commands(&long.blocks()[0]).len(), 3);
    }

    #[test]
    fn max_depth_when_recorded_twice_then_keeps_largest() {
        let sequence = CommandSequenceBuilder::new()
            .max_depth(3, 1)
            .max_depth(2, 2)
            .build();

        assert_eq!(sequence.max_primary_depth(), 3);
        assert_eq!(sequence.max_secondary_depth(), 2);
    }

    #[test]
    fn display_when_blocks_then_listing_with_headers() {
        let sequence = CommandSequenceBuilder::new()
            .add_block("main", 0, vec![load(0), out(0), Command::Pop])
            .build();

        assert_eq!(
            sequence.to_string(),
            "; main #0\n    0  LD X0\n    1  OUT Y0\n    2  POP\n"
        );
    }

    #[test]
    fn from_when_raw_commands_then_no_blocks() {
        let sequence = CommandSequence::from(vec![load(0), Command::Pop]);

        assert!(sequence.blocks().is_empty());
        assert_eq!(sequence.iter().count(), 2);
    }
}
