//! The process image: the state of every device the machine reads and writes.
//!
//! Devices are identified by allocator name and address, so devices issued
//! by different allocators never share storage. Devices that have never been
//! written read as OFF or 0.

use std::collections::BTreeMap;

use ladder_il::{BitRef, DeviceRef, Effect, Operand, TargetRef, ValueRef};

/// State of inputs, contacts, memory words, timers and counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessImage {
    inputs: BTreeMap<DeviceRef, bool>,
    contacts: BTreeMap<DeviceRef, bool>,
    memory: BTreeMap<DeviceRef, i64>,
    timers: BTreeMap<DeviceRef, i64>,
    counters: BTreeMap<DeviceRef, i64>,
    /// The condition that drove each counter on the previous scan.
    counter_coils: BTreeMap<DeviceRef, bool>,
}

impl ProcessImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_bit(&self, bit: &BitRef) -> bool {
        match bit {
            BitRef::Input(device) => self.inputs.get(device).copied().unwrap_or(false),
            BitRef::Contact(device) => self.contacts.get(device).copied().unwrap_or(false),
            BitRef::MemoryBit { memory, bit } => {
                let word = self.memory.get(memory).copied().unwrap_or(0);
                word.checked_shr(u32::from(*bit)).unwrap_or(0) & 1 == 1
            }
        }
    }

    /// Writes a bit. Bits of a memory word outside the 64-bit range are
    /// ignored.
    pub fn write_bit(&mut self, bit: &BitRef, state: bool) {
        match bit {
            BitRef::Input(device) => {
                self.inputs.insert(device.clone(), state);
            }
            BitRef::Contact(device) => {
                self.contacts.insert(device.clone(), state);
            }
            BitRef::MemoryBit { memory, bit } => {
                let Some(mask) = 1i64.checked_shl(u32::from(*bit)) else {
                    return;
                };
                let word = self.memory.entry(memory.clone()).or_insert(0);
                if state {
                    *word |= mask;
                } else {
                    *word &= !mask;
                }
            }
        }
    }

    /// Reads a value. Timers and counters read as their current value.
    pub fn read_value(&self, value: &ValueRef) -> i64 {
        match value {
            ValueRef::Memory(device) => self.memory.get(device).copied().unwrap_or(0),
            ValueRef::Constant(value) => *value,
            ValueRef::Timer(device) => self.timers.get(device).copied().unwrap_or(0),
            ValueRef::Counter(device) => self.counters.get(device).copied().unwrap_or(0),
        }
    }

    /// Writes a value. Constants cannot be written and are left unchanged.
    pub fn write_value(&mut self, value: &ValueRef, to: i64) {
        match value {
            ValueRef::Memory(device) => {
                self.memory.insert(device.clone(), to);
            }
            ValueRef::Timer(device) => {
                self.timers.insert(device.clone(), to);
            }
            ValueRef::Counter(device) => {
                self.counters.insert(device.clone(), to);
            }
            ValueRef::Constant(_) => {}
        }
    }

    /// Evaluates the operand of a load.
    pub fn evaluate(&self, operand: &Operand) -> bool {
        match operand {
            Operand::Bit { bit, inverse } => self.read_bit(bit) != *inverse,
            Operand::Compare {
                left,
                comparison,
                right,
            } => comparison.evaluate(self.read_value(left), self.read_value(right)),
        }
    }

    /// Applies an action's effect to its target given the circuit value.
    ///
    /// Outputs follow the value on every scan; the other effects only act
    /// while the value is ON.
    pub fn apply(&mut self, effect: &Effect, target: &TargetRef, value: bool) {
        match (effect, target) {
            (Effect::Output, TargetRef::Bit(bit)) => self.write_bit(bit, value),
            (Effect::Output, TargetRef::Memory(device)) => {
                self.memory.insert(device.clone(), i64::from(value));
            }
            (Effect::Output, TargetRef::Timer { timer, preset }) => {
                let preset = self.read_value(preset);
                let current = self.timers.entry(timer.clone()).or_insert(0);
                if !value {
                    *current = 0;
                } else if *current < preset {
                    *current += 1;
                }
            }
            (Effect::Output, TargetRef::Counter { counter, preset }) => {
                let preset = self.read_value(preset);
                let previous = self
                    .counter_coils
                    .insert(counter.clone(), value)
                    .unwrap_or(false);
                let current = self.counters.entry(counter.clone()).or_insert(0);
                if value && !previous && *current < preset {
                    *current += 1;
                }
            }
            (_, _) if !value => {}
            (Effect::Set, TargetRef::Bit(bit)) => self.write_bit(bit, true),
            (Effect::Reset, TargetRef::Bit(bit)) => self.write_bit(bit, false),
            (Effect::Write(source), TargetRef::Bit(bit)) => {
                let state = self.read_value(source) != 0;
                self.write_bit(bit, state)
            }
            (Effect::Set, TargetRef::Memory(device)) => {
                self.memory.insert(device.clone(), 1);
            }
            (Effect::Set, TargetRef::Timer { timer: device, preset })
            | (Effect::Set, TargetRef::Counter { counter: device, preset }) => {
                let preset = self.read_value(preset);
                self.write_value(&word_of(target, device), preset);
            }
            (Effect::Reset, TargetRef::Memory(device))
            | (Effect::Reset, TargetRef::Timer { timer: device, .. })
            | (Effect::Reset, TargetRef::Counter { counter: device, .. }) => {
                self.write_value(&word_of(target, device), 0);
            }
            (Effect::Write(source), TargetRef::Memory(device))
            | (Effect::Write(source), TargetRef::Timer { timer: device, .. })
            | (Effect::Write(source), TargetRef::Counter { counter: device, .. }) => {
                let to = self.read_value(source);
                self.write_value(&word_of(target, device), to);
            }
        }
    }

    /// The inputs that have been written, ordered by name and address.
    pub fn inputs(&self) -> impl Iterator<Item = (&DeviceRef, bool)> {
        self.inputs.iter().map(|(device, state)| (device, *state))
    }

    /// The contacts that have been written, ordered by name and address.
    pub fn contacts(&self) -> impl Iterator<Item = (&DeviceRef, bool)> {
        self.contacts.iter().map(|(device, state)| (device, *state))
    }
}

/// Returns the value reference of the word behind a word-valued target.
fn word_of(target: &TargetRef, device: &DeviceRef) -> ValueRef {
    match target {
        TargetRef::Timer { .. } => ValueRef::Timer(device.clone()),
        TargetRef::Counter { .. } => ValueRef::Counter(device.clone()),
        TargetRef::Memory(_) | TargetRef::Bit(_) => ValueRef::Memory(device.clone()),
    }
}
