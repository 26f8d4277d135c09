//! Shared test helpers for codegen integration tests.

use ladder_dsl::allocator::{Allocator, ContactFactory, InputFactory};
use ladder_il::{BitRef, Command, DeviceRef, Effect, Operand, TargetRef};

#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The allocators most tests need: inputs X, relays M and outputs Y.
#[allow(dead_code)]
pub struct Devices {
    pub inputs: Allocator<InputFactory>,
    pub relays: Allocator<ContactFactory>,
    pub outputs: Allocator<ContactFactory>,
}

impl Devices {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Devices {
            inputs: Allocator::input("X", 16, 0),
            relays: Allocator::contact("M", 16, 0),
            outputs: Allocator::contact("Y", 16, 0),
        }
    }
}

#[allow(dead_code)]
pub fn ld(name: &str, address: u32) -> Command {
    Command::Load(Operand::Bit {
        bit: bit(name, address),
        inverse: false,
    })
}

#[allow(dead_code)]
pub fn ldi(name: &str, address: u32) -> Command {
    Command::Load(Operand::Bit {
        bit: bit(name, address),
        inverse: true,
    })
}

#[allow(dead_code)]
pub fn out(name: &str, address: u32) -> Command {
    apply(Effect::Output, name, address)
}

#[allow(dead_code)]
pub fn apply(effect: Effect, name: &str, address: u32) -> Command {
    Command::Apply {
        effect,
        target: TargetRef::Bit(BitRef::Contact(DeviceRef::new(name, address))),
    }
}

fn bit(name: &str, address: u32) -> BitRef {
    if name == "X" {
        BitRef::Input(DeviceRef::new(name, address))
    } else {
        BitRef::Contact(DeviceRef::new(name, address))
    }
}
