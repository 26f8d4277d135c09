//! Shared test helpers for VM integration tests.

use ladder_dsl::allocator::{Allocator, ContactFactory, InputFactory};
use ladder_dsl::unit::LogicUnit;
use ladder_vm::{Driver, Vm};

#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Allocators for inputs X, relays M and outputs Y.
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
            inputs: Allocator::input("X", 8, 0),
            relays: Allocator::contact("M", 8, 0),
            outputs: Allocator::contact("Y", 8, 0),
        }
    }
}

/// Compiles the unit and runs `count` scans of it.
#[allow(dead_code)]
pub fn scan(vm: &mut Vm, unit: &LogicUnit, count: usize) {
    let sequence = vm.compile(unit).unwrap();
    for _ in 0..count {
        vm.run(&sequence).unwrap();
    }
}
