//! The command set executed by the ladder virtual machine.
//!
//! Commands operate on two boolean stacks: the primary stack that holds
//! partial condition results and the secondary stack that holds results
//! stashed while a nested block is evaluated. Commands refer to devices by
//! name and address only, so this crate is shared by the compiler and the
//! machine without either depending on the other.

mod command;
mod sequence;

pub use command::{
    BitRef, Command, Comparison, DeviceRef, Effect, Operand, StackEffect, TargetRef, ValueRef,
};
pub use sequence::{Block, CommandSequence, CommandSequenceBuilder};
