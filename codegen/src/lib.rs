#![allow(clippy::result_large_err)]
//! Code generation for ladder programs.
//!
//! This crate lowers the circuits of a [`Program`](ladder_dsl::unit::Program)
//! or a single [`LogicUnit`](ladder_dsl::unit::LogicUnit) into a flat
//! [`CommandSequence`](ladder_il::CommandSequence) for the two-stack machine.
//!
//! Each circuit becomes a self-contained block: the condition is evaluated
//! depth first onto the primary stack, every action reads the result from the
//! top of the stack, and a final pop leaves both stacks empty for the next
//! circuit.
//!
//! # Example
//!
//! ```
//! use ladder_codegen::compile;
//! use ladder_dsl::action::Action;
//! use ladder_dsl::allocator::Allocator;
//! use ladder_dsl::condition::Condition;
//! use ladder_dsl::unit::LogicUnit;
//!
//! let mut inputs = Allocator::input("X", 8, 0);
//! let mut outputs = Allocator::contact("Y", 8, 0);
//! let start = inputs.allocate(None).unwrap();
//! let lamp = outputs.allocate(None).unwrap();
//!
//! let mut unit = LogicUnit::new("main");
//! unit.circuit(Condition::from(start).then(Action::output(lamp)));
//!
//! let sequence = compile(&unit).unwrap();
//! assert_eq!(sequence.len(), 3);
//! ```

mod compile;
mod emit;
pub mod operand;

pub use compile::{compile, Source};
