#![allow(clippy::result_large_err)]
//! Executes compiled ladder programs.
//!
//! A scan runs a [`CommandSequence`](ladder_il::CommandSequence) once, from
//! start to end, against a [`ProcessImage`] that holds the state of every
//! device. Each scan uses a fresh pair of stacks.

pub mod cli;
pub mod error;
mod image;
pub mod logger;
pub(crate) mod stack;
mod vm;

pub use image::ProcessImage;
pub use vm::{execute, Driver, StopHandle, Vm};
