//! Maps devices onto the references the machine commands use.
//!
//! A reference keeps only what the machine needs to locate a value in the
//! process image: the allocator name and the address, plus the bit index for
//! memory bits and the preset for timers and counters.

use ladder_dsl::device::{Bit, Compare, Device, Relation, Word};
use ladder_il::{BitRef, Comparison, DeviceRef, Operand, TargetRef, ValueRef};

/// Returns the operand that loads the state of `bit`.
pub fn load_operand(bit: &Bit) -> Operand {
    let reference = match bit {
        Bit::Input(input) => BitRef::Input(DeviceRef::new(input.name(), input.address())),
        Bit::Contact(contact) => BitRef::Contact(DeviceRef::new(contact.name(), contact.address())),
        Bit::BitOf(bit_of) => BitRef::MemoryBit {
            memory: DeviceRef::new(bit_of.name(), bit_of.address()),
            bit: bit_of.bit(),
        },
        Bit::Compare(compare) => return compare_operand(compare),
    };
    Operand::Bit {
        bit: reference,
        inverse: bit.inverse(),
    }
}

/// Returns the reference for a bit device, or `None` for a comparison,
/// which has no storage of its own.
pub fn bit_ref(bit: &Bit) -> Option<BitRef> {
    match load_operand(bit) {
        Operand::Bit { bit, .. } => Some(bit),
        Operand::Compare { .. } => None,
    }
}

fn compare_operand(compare: &Compare) -> Operand {
    Operand::Compare {
        left: value_ref(compare.left()),
        comparison: comparison(compare.relation()),
        right: value_ref(compare.right()),
    }
}

pub fn comparison(relation: Relation) -> Comparison {
    match relation {
        Relation::Eq => Comparison::Eq,
        Relation::Ne => Comparison::Ne,
        Relation::Lt => Comparison::Lt,
        Relation::Le => Comparison::Le,
        Relation::Gt => Comparison::Gt,
        Relation::Ge => Comparison::Ge,
    }
}

/// Returns the reference that reads the value of `word`. Timers and counters
/// read as their current value.
pub fn value_ref(word: &Word) -> ValueRef {
    match word {
        Word::Memory(memory) => ValueRef::Memory(DeviceRef::new(memory.name(), memory.address())),
        Word::Constant(constant) => ValueRef::Constant(constant.value()),
        Word::Timer(timer) => ValueRef::Timer(DeviceRef::new(timer.name(), timer.address())),
        Word::Counter(counter) => {
            ValueRef::Counter(DeviceRef::new(counter.name(), counter.address()))
        }
    }
}

/// Returns the reference an action writes, or `None` when the device kind
/// cannot be the target of an action.
pub fn target_ref(device: &Device) -> Option<TargetRef> {
    match device {
        Device::Contact(contact) => Some(TargetRef::Bit(BitRef::Contact(DeviceRef::new(
            contact.name(),
            contact.address(),
        )))),
        Device::BitOf(bit_of) => Some(TargetRef::Bit(BitRef::MemoryBit {
            memory: DeviceRef::new(bit_of.name(), bit_of.address()),
            bit: bit_of.bit(),
        })),
        Device::Memory(memory) => Some(TargetRef::Memory(DeviceRef::new(
            memory.name(),
            memory.address(),
        ))),
        Device::Timer(timer) => Some(TargetRef::Timer {
            timer: DeviceRef::new(timer.name(), timer.address()),
            preset: value_ref(timer.preset()),
        }),
        Device::Counter(counter) => Some(TargetRef::Counter {
            counter: DeviceRef::new(counter.name(), counter.address()),
            preset: value_ref(counter.preset()),
        }),
        Device::Input(_) | Device::Compare(_) | Device::Constant(_) | Device::StringBuffer(_) => {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladder_dsl::allocator::Allocator;
    use ladder_dsl::device::{Constant, WordSize};

    #[test]
    fn load_operand_when_inverse_input_then_inverse_bit() {
        let mut inputs = Allocator::input("X", 4, 0);
        let input = inputs.allocate(None).unwrap();

        let operand = load_operand(&Bit::from(input).negate());

        assert_eq!(
            operand,
            Operand::Bit {
                bit: BitRef::Input(DeviceRef::new("X", 0)),
                inverse: true,
            }
        );
    }

    #[test]
    fn load_operand_when_negated_compare_then_inverse_comparison() {
        let mut memory = Allocator::memory("D", 4, 100, WordSize::Int16);
        let word = memory.allocate(None).unwrap();
        let compare = Compare::new(word, Relation::Gt, Constant::new(5));

        let operand = load_operand(&Bit::from(compare).negate());

        assert_eq!(
            operand,
            Operand::Compare {
                left: ValueRef::Memory(DeviceRef::new("D", 100)),
                comparison: Comparison::Le,
                right: ValueRef::Constant(5),
            }
        );
    }

    #[test]
    fn target_ref_when_timer_then_carries_preset() {
        let mut timers = Allocator::timer("T", 4, 0, Constant::new(30));
        let timer = timers.allocate(None).unwrap();

        let target = target_ref(&Device::from(timer));

        assert_eq!(
            target,
            Some(TargetRef::Timer {
                timer: DeviceRef::new("T", 0),
                preset: ValueRef::Constant(30),
            })
        );
    }

    #[test]
    fn target_ref_when_memory_bit_then_bit_target() {
        let mut memory = Allocator::memory("D", 4, 0, WordSize::Int32);
        let word = memory.allocate(None).unwrap();

        let target = target_ref(&Device::from(word.bit(5).unwrap()));

        assert_eq!(
            target,
            Some(TargetRef::Bit(BitRef::MemoryBit {
                memory: DeviceRef::new("D", 0),
                bit: 5,
            }))
        );
    }

    #[test]
    fn target_ref_when_input_or_constant_then_none() {
        let mut inputs = Allocator::input("X", 4, 0);
        let input = inputs.allocate(None).unwrap();

        assert_eq!(target_ref(&Device::from(input)), None);
        assert_eq!(target_ref(&Device::from(Constant::new(3))), None);
    }
}
