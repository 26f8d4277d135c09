use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ladder_codegen::operand::{bit_ref, load_operand, value_ref};
use ladder_codegen::Source;
use ladder_dsl::device::{Bit, Input, Word};
use ladder_dsl::diagnostic::Diagnostic;
use ladder_il::{BitRef, Command, CommandSequence, DeviceRef};
use log::trace;

use crate::error::{Trap, VmError};
use crate::image::ProcessImage;
use crate::stack::Stacks;

/// Executes a command sequence once against a process image.
///
/// This is one scan: the commands run in order, without branching, on a
/// fresh pair of stacks. Both stacks must be empty when the sequence ends.
pub fn execute(sequence: &CommandSequence, image: &mut ProcessImage) -> Result<(), Trap> {
    let mut stacks = Stacks::new();

    for command in sequence {
        step(command, &mut stacks, image)?;
    }

    let (primary, secondary) = stacks.depth();
    if primary != 0 || secondary != 0 {
        return Err(Trap::UnbalancedStacks { primary, secondary });
    }
    Ok(())
}

fn step(command: &Command, stacks: &mut Stacks, image: &mut ProcessImage) -> Result<(), Trap> {
    match command {
        Command::Load(operand) => stacks.push(image.evaluate(operand)),
        Command::Stash => stacks.stash()?,
        Command::AndBlock => {
            let current = stacks.pop()?;
            let stashed = stacks.unstash()?;
            stacks.push(stashed && current);
        }
        Command::OrBlock => {
            let current = stacks.pop()?;
            let stashed = stacks.unstash()?;
            stacks.push(stashed || current);
        }
        Command::AndTop2 => {
            let right = stacks.pop()?;
            let left = stacks.pop()?;
            stacks.push(left && right);
        }
        Command::OrTop2 => {
            let right = stacks.pop()?;
            let left = stacks.pop()?;
            stacks.push(left || right);
        }
        Command::Duplicate => {
            let top = stacks.peek()?;
            stacks.push(top);
        }
        Command::Apply { effect, target } => {
            let value = stacks.peek()?;
            image.apply(effect, target, value);
        }
        Command::Pop => {
            stacks.pop()?;
        }
    }
    Ok(())
}

/// Compiles programs and runs the compiled sequences.
pub trait Driver {
    /// Compiles a program or a single logic unit.
    fn compile<'a>(&self, source: impl Into<Source<'a>>) -> Result<CommandSequence, Diagnostic> {
        ladder_codegen::compile(source)
    }

    /// Runs one scan of the sequence.
    fn run(&mut self, sequence: &CommandSequence) -> Result<(), Trap>;
}

/// A cloneable handle for requesting the VM to stop.
/// Used by signal handlers to stop the VM from another context.
#[derive(Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Requests the VM to stop after the current scan.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// A machine that owns a process image and runs scans against it.
///
/// Device state persists from one scan to the next; stacks do not.
pub struct Vm {
    image: ProcessImage,
    scan_count: u64,
    stop_flag: Arc<AtomicBool>,
}

impl Vm {
    /// Creates a VM with every device OFF or 0.
    pub fn new() -> Self {
        Vm {
            image: ProcessImage::new(),
            scan_count: 0,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn image(&self) -> &ProcessImage {
        &self.image
    }

    /// Returns the number of completed scans.
    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    /// Drives an input from the field. The state is stored as the field
    /// reports it, whatever the polarity of `input`.
    pub fn set_input(&mut self, input: &Input, state: bool) {
        self.image.write_bit(
            &BitRef::Input(DeviceRef::new(input.name(), input.address())),
            state,
        );
    }

    /// Forces a bit device so that it reads as `state` through the same
    /// polarity, so forcing an inverted contact ON stores OFF.
    /// Comparisons have no storage and are rejected.
    pub fn set_bit(&mut self, bit: impl Into<Bit>, state: bool) -> Result<(), VmError> {
        let bit = bit.into();
        let reference = bit_ref(&bit).ok_or_else(|| VmError::NotStorable(bit.to_string()))?;
        self.image.write_bit(&reference, state != bit.inverse());
        Ok(())
    }

    /// Forces a value device. Constants have no storage and are rejected.
    pub fn set_value(&mut self, word: impl Into<Word>, value: i64) -> Result<(), VmError> {
        let word = word.into();
        if let Word::Constant(_) = word {
            return Err(VmError::NotStorable(word.to_string()));
        }
        self.image.write_value(&value_ref(&word), value);
        Ok(())
    }

    /// Reads a bit device as a condition leaf would, so an inverted contact
    /// reads inverted and a comparison reads its result.
    pub fn read_bit(&self, bit: impl Into<Bit>) -> bool {
        self.image.evaluate(&load_operand(&bit.into()))
    }

    /// Reads a value device. Timers and counters read as their current value.
    pub fn read_value(&self, word: impl Into<Word>) -> i64 {
        self.image.read_value(&value_ref(&word.into()))
    }

    /// Returns a cloneable handle that can request the VM to stop.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: self.stop_flag.clone(),
        }
    }

    /// Returns true if a stop has been requested.
    pub fn stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for Vm {
    fn run(&mut self, sequence: &CommandSequence) -> Result<(), Trap> {
        execute(sequence, &mut self.image)?;
        self.scan_count += 1;
        trace!(
            "Scan {} complete ({} commands)",
            self.scan_count,
            sequence.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackKind;
    use ladder_il::{Effect, Operand, TargetRef};

    fn ld(address: u32) -> Command {
        Command::Load(Operand::Bit {
            bit: BitRef::Input(DeviceRef::new("X", address)),
            inverse: false,
        })
    }

    #[test]
    fn execute_when_pop_on_empty_then_primary_underflow() {
        let sequence = CommandSequence::from(vec![Command::Pop]);

        let result = execute(&sequence, &mut ProcessImage::new());

        assert_eq!(result, Err(Trap::StackUnderflow(StackKind::Primary)));
    }

    #[test]
    fn execute_when_block_combine_without_stash_then_secondary_underflow() {
        let sequence = CommandSequence::from(vec![ld(0), ld(1), Command::AndBlock]);

        let result = execute(&sequence, &mut ProcessImage::new());

        assert_eq!(result, Err(Trap::StackUnderflow(StackKind::Secondary)));
    }

    #[test]
    fn execute_when_value_left_then_unbalanced_stacks() {
        let sequence = CommandSequence::from(vec![ld(0), ld(1), Command::Stash]);

        let result = execute(&sequence, &mut ProcessImage::new());

        assert_eq!(
            result,
            Err(Trap::UnbalancedStacks {
                primary: 1,
                secondary: 1
            })
        );
    }

    #[test]
    fn execute_when_stashed_or_block_then_combines_with_stashed_value() {
        let y0 = BitRef::Contact(DeviceRef::new("Y", 0));
        let sequence = CommandSequence::from(vec![
            ld(0),
            Command::Stash,
            ld(1),
            Command::OrBlock,
            Command::Apply {
                effect: Effect::Output,
                target: TargetRef::Bit(y0.clone()),
            },
            Command::Pop,
        ]);
        let mut image = ProcessImage::new();
        image.write_bit(&BitRef::Input(DeviceRef::new("X", 0)), true);

        execute(&sequence, &mut image).unwrap();

        assert!(image.read_bit(&y0));
    }

    #[test]
    fn run_when_sequence_ok_then_scan_count_increments() {
        let mut vm = Vm::new();
        let sequence = CommandSequence::from(vec![ld(0), Command::Pop]);

        vm.run(&sequence).unwrap();
        vm.run(&sequence).unwrap();

        assert_eq!(vm.scan_count(), 2);
    }

    #[test]
    fn run_when_trap_then_scan_not_counted() {
        let mut vm = Vm::new();

        let result = vm.run(&CommandSequence::from(vec![Command::Pop]));

        assert!(result.is_err());
        assert_eq!(vm.scan_count(), 0);
    }
}
