//! Command definitions shared between the compiler and the machine.

use std::fmt;

/// Identifies an addressed device by its allocator name and address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceRef {
    pub name: String,
    pub address: u32,
}

impl DeviceRef {
    pub fn new(name: impl Into<String>, address: u32) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.address)
    }
}

/// A readable bit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BitRef {
    Input(DeviceRef),
    Contact(DeviceRef),
    /// One bit of a memory word.
    MemoryBit { memory: DeviceRef, bit: u8 },
}

impl fmt::Display for BitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitRef::Input(device) | BitRef::Contact(device) => write!(f, "{device}"),
            BitRef::MemoryBit { memory, bit } => write!(f, "{memory}.{bit}"),
        }
    }
}

/// A readable numeric value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueRef {
    Memory(DeviceRef),
    Constant(i64),
    /// The current value of a timer.
    Timer(DeviceRef),
    /// The current value of a counter.
    Counter(DeviceRef),
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Memory(device) | ValueRef::Timer(device) | ValueRef::Counter(device) => {
                write!(f, "{device}")
            }
            ValueRef::Constant(value) => write!(f, "K{value}"),
        }
    }
}

/// A device that an action command writes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Bit(BitRef),
    Memory(DeviceRef),
    Timer { timer: DeviceRef, preset: ValueRef },
    Counter { counter: DeviceRef, preset: ValueRef },
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Bit(bit) => write!(f, "{bit}"),
            TargetRef::Memory(device) => write!(f, "{device}"),
            TargetRef::Timer { timer, preset } => write!(f, "{timer} {preset}"),
            TargetRef::Counter { counter, preset } => write!(f, "{counter} {preset}"),
        }
    }
}

/// Relation tested by a comparison load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn evaluate(self, left: i64, right: i64) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

/// What a load pushes onto the primary stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// The state of a bit, inverted when `inverse` is set.
    Bit { bit: BitRef, inverse: bool },
    /// The result of comparing two values.
    Compare {
        left: ValueRef,
        comparison: Comparison,
        right: ValueRef,
    },
}

/// The effect an action command applies to its target when the top of the
/// primary stack is ON (or on every scan for [`Effect::Output`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    Output,
    Set,
    Reset,
    Write(ValueRef),
}

/// One stack-machine instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Pushes the operand's value onto the primary stack.
    Load(Operand),
    /// Moves the top of the primary stack to the secondary stack.
    Stash,
    /// Pops the primary top and the secondary top, pushes their AND.
    AndBlock,
    /// Pops the primary top and the secondary top, pushes their OR.
    OrBlock,
    /// Pops the top two primary values, pushes their AND.
    AndTop2,
    /// Pops the top two primary values, pushes their OR.
    OrTop2,
    /// Pushes a copy of the primary top.
    Duplicate,
    /// Applies the effect to the target, gated by the primary top, which is
    /// left in place.
    Apply { effect: Effect, target: TargetRef },
    /// Discards the primary top.
    Pop,
}

/// How many values a command takes from and puts onto each stack.
///
/// Values are taken before they are put, so a command that reads the top
/// without removing it takes one and puts one back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackEffect {
    pub primary_pops: usize,
    pub primary_pushes: usize,
    pub secondary_pops: usize,
    pub secondary_pushes: usize,
}

impl StackEffect {
    const fn new(
        primary_pops: usize,
        primary_pushes: usize,
        secondary_pops: usize,
        secondary_pushes: usize,
    ) -> Self {
        Self {
            primary_pops,
            primary_pushes,
            secondary_pops,
            secondary_pushes,
        }
    }
}

impl Command {
    pub fn stack_effect(&self) -> StackEffect {
        match self {
            Command::Load(_) => StackEffect::new(0, 1, 0, 0),
            Command::Stash => StackEffect::new(1, 0, 0, 1),
            Command::AndBlock | Command::OrBlock => StackEffect::new(1, 1, 1, 0),
            Command::AndTop2 | Command::OrTop2 => StackEffect::new(2, 1, 0, 0),
            Command::Duplicate => StackEffect::new(1, 2, 0, 0),
            Command::Apply { .. } => StackEffect::new(1, 1, 0, 0),
            Command::Pop => StackEffect::new(1, 0, 0, 0),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Load(Operand::Bit { bit, inverse: false }) => write!(f, "LD {bit}"),
            Command::Load(Operand::Bit { bit, inverse: true }) => write!(f, "LDI {bit}"),
            Command::Load(Operand::Compare {
                left,
                comparison,
                right,
            }) => write!(f, "LD{} {left} {right}", comparison.mnemonic()),
            Command::Stash => write!(f, "STASH"),
            Command::AndBlock => write!(f, "ANB"),
            Command::OrBlock => write!(f, "ORB"),
            Command::AndTop2 => write!(f, "AND"),
            Command::OrTop2 => write!(f, "OR"),
            Command::Duplicate => write!(f, "DUP"),
            Command::Apply { effect, target } => match effect {
                Effect::Output => write!(f, "OUT {target}"),
                Effect::Set => write!(f, "SET {target}"),
                Effect::Reset => write!(f, "RST {target}"),
                Effect::Write(value) => write!(f, "MOV {value} {target}"),
            },
            Command::Pop => write!(f, "POP"),
        }
    }
}
