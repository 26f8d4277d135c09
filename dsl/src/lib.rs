#![allow(clippy::result_large_err)]
//! Provides the objects that describe a ladder program: devices and the
//! allocators that issue them, conditions over bit devices, actions on
//! output devices, circuits, and the logic units and programs that group
//! circuits.

pub mod action;
pub mod allocator;
pub mod circuit;
pub mod condition;
pub mod device;
pub mod diagnostic;
pub mod unit;
