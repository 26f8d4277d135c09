//! Devices that make up a controller: contacts, memory, timers and counters.
//!
//! Devices come in two families. Bit-valued devices ([`Bit`]) can be used as
//! the leaves of a [`Condition`](crate::condition::Condition); numeric
//! value-valued devices ([`Word`]) can be compared with each other and
//! written by actions. [`Device`] is the closed set of every kind.
//!
//! Devices with an address are issued by an
//! [`Allocator`](crate::allocator::Allocator) so that addresses are
//! deterministic. Constants and comparisons have no address and report 0.

use std::fmt;

use ladder_problems::Problem;

use crate::diagnostic::{Diagnostic, Label};

/// Controllers speak of ON and OFF rather than true and false.
pub const ON: bool = true;
pub const OFF: bool = false;

/// The kind of a device, without its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Input,
    Contact,
    Compare,
    BitOf,
    Memory,
    Constant,
    Timer,
    Counter,
    StringBuffer,
}

/// Storage size of a memory word.
///
/// The machine computes with 64-bit integers; the size describes how a
/// memory device is laid out on the target controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WordSize {
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
}

impl WordSize {
    /// Returns the number of bits of the word.
    pub fn bit_size(self) -> u8 {
        match self {
            WordSize::Int16 | WordSize::Float16 => 16,
            WordSize::Int32 | WordSize::Float32 => 32,
            WordSize::Int64 | WordSize::Float64 => 64,
        }
    }
}

/// Relation between the two operands of a [`Compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    /// Returns the relation that holds exactly when this one does not.
    pub fn inverse(self) -> Relation {
        match self {
            Relation::Eq => Relation::Ne,
            Relation::Ne => Relation::Eq,
            Relation::Lt => Relation::Ge,
            Relation::Ge => Relation::Lt,
            Relation::Le => Relation::Gt,
            Relation::Gt => Relation::Le,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Ne => "<>",
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
        }
    }
}

/// An input contact. Inputs are driven by the field and can never be the
/// target of an action.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Input {
    name: String,
    address: u32,
    inverse: bool,
}

impl Input {
    pub(crate) fn new(name: &str, address: u32) -> Self {
        Self {
            name: name.to_string(),
            address,
            inverse: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    /// True when the contact reads as closed while the device is OFF.
    pub fn inverse(&self) -> bool {
        self.inverse
    }
}

/// Any contact other than an input: internal relays and outputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Contact {
    name: String,
    address: u32,
    inverse: bool,
}

impl Contact {
    pub(crate) fn new(name: &str, address: u32) -> Self {
        Self {
            name: name.to_string(),
            address,
            inverse: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn inverse(&self) -> bool {
        self.inverse
    }
}

/// One bit of a memory word used as a contact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitOf {
    memory: Memory,
    bit: u8,
    inverse: bool,
}

impl BitOf {
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn bit(&self) -> u8 {
        self.bit
    }

    pub fn name(&self) -> &str {
        self.memory.name()
    }

    pub fn address(&self) -> u32 {
        self.memory.address()
    }

    pub fn inverse(&self) -> bool {
        self.inverse
    }
}

/// A pseudo-contact that is closed while a relation between two values holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Compare {
    left: Word,
    relation: Relation,
    right: Word,
}

impl Compare {
    pub fn new(left: impl Into<Word>, relation: Relation, right: impl Into<Word>) -> Self {
        Self {
            left: left.into(),
            relation,
            right: right.into(),
        }
    }

    pub fn left(&self) -> &Word {
        &self.left
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn right(&self) -> &Word {
        &self.right
    }
}

/// A memory word.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Memory {
    name: String,
    address: u32,
    size: WordSize,
}

impl Memory {
    pub(crate) fn new(name: &str, address: u32, size: WordSize) -> Self {
        Self {
            name: name.to_string(),
            address,
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn size(&self) -> WordSize {
        self.size
    }

    /// Returns the contact for one bit of this word.
    ///
    /// Returns an error if `bit` is not below the word's bit size.
    pub fn bit(&self, bit: u8) -> Result<BitOf, Diagnostic> {
        if bit >= self.size.bit_size() {
            return Err(Diagnostic::problem(
                Problem::BitIndexOutOfRange,
                Label::device(&self.name, self.address, "Bit index exceeds word size"),
            )
            .with_context("bit", bit)
            .with_context("bit_size", self.size.bit_size()));
        }
        Ok(BitOf {
            memory: self.clone(),
            bit,
            inverse: false,
        })
    }
}

/// A constant value. Constants have no address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constant {
    name: String,
    value: i64,
}

impl Constant {
    pub fn new(value: i64) -> Self {
        Self {
            name: String::new(),
            value,
        }
    }

    pub fn named(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

/// An on-delay timer. Its current value counts scans while the timer is
/// driven and its contact closes once the current value reaches the preset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Timer {
    name: String,
    address: u32,
    preset: Box<Word>,
}

impl Timer {
    pub(crate) fn new(name: &str, address: u32, preset: Word) -> Self {
        Self {
            name: name.to_string(),
            address,
            preset: Box::new(preset),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn preset(&self) -> &Word {
        &self.preset
    }

    /// The timer contact: current value >= preset.
    pub fn contact(&self) -> Compare {
        Compare::new(self.clone(), Relation::Ge, (*self.preset).clone())
    }
}

/// An up counter. Its current value counts rising edges of the condition
/// that drives it and its contact closes once the count reaches the preset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Counter {
    name: String,
    address: u32,
    preset: Box<Word>,
}

impl Counter {
    pub(crate) fn new(name: &str, address: u32, preset: Word) -> Self {
        Self {
            name: name.to_string(),
            address,
            preset: Box::new(preset),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn preset(&self) -> &Word {
        &self.preset
    }

    /// The counter contact: current value >= preset.
    pub fn contact(&self) -> Compare {
        Compare::new(self.clone(), Relation::Ge, (*self.preset).clone())
    }
}

/// A buffer of text spanning a number of words. Layout is highly target
/// specific so only the extent and initial text are described.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StringBuffer {
    name: String,
    address: u32,
    word_count: u32,
    initial: String,
}

impl StringBuffer {
    pub(crate) fn new(name: &str, address: u32, word_count: u32) -> Self {
        Self {
            name: name.to_string(),
            address,
            word_count,
            initial: String::new(),
        }
    }

    /// Returns a copy of the buffer with the given initial text.
    pub fn with_initial(mut self, text: impl Into<String>) -> Self {
        self.initial = text.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    pub fn initial(&self) -> &str {
        &self.initial
    }
}

/// A bit-valued device: anything that can be a leaf of a condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Bit {
    Input(Input),
    Contact(Contact),
    BitOf(BitOf),
    Compare(Compare),
}

impl Bit {
    /// Returns the leaf that is closed exactly when this one is open.
    ///
    /// Contacts toggle their inverse flag; comparisons switch to the
    /// inverse relation.
    pub fn negate(&self) -> Bit {
        match self {
            Bit::Input(input) => Bit::Input(Input {
                inverse: !input.inverse,
                ..input.clone()
            }),
            Bit::Contact(contact) => Bit::Contact(Contact {
                inverse: !contact.inverse,
                ..contact.clone()
            }),
            Bit::BitOf(bit_of) => Bit::BitOf(BitOf {
                inverse: !bit_of.inverse,
                ..bit_of.clone()
            }),
            Bit::Compare(compare) => Bit::Compare(Compare {
                relation: compare.relation.inverse(),
                ..compare.clone()
            }),
        }
    }

    /// Returns the inverse flag. Comparisons carry their polarity in the
    /// relation and always report false.
    pub fn inverse(&self) -> bool {
        match self {
            Bit::Input(input) => input.inverse,
            Bit::Contact(contact) => contact.inverse,
            Bit::BitOf(bit_of) => bit_of.inverse,
            Bit::Compare(_) => false,
        }
    }
}

/// A numeric value-valued device.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Word {
    Memory(Memory),
    Constant(Constant),
    Timer(Timer),
    Counter(Counter),
}

/// Any device.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    Input(Input),
    Contact(Contact),
    Compare(Compare),
    BitOf(BitOf),
    Memory(Memory),
    Constant(Constant),
    Timer(Timer),
    Counter(Counter),
    StringBuffer(StringBuffer),
}

impl Device {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Input(_) => DeviceKind::Input,
            Device::Contact(_) => DeviceKind::Contact,
            Device::Compare(_) => DeviceKind::Compare,
            Device::BitOf(_) => DeviceKind::BitOf,
            Device::Memory(_) => DeviceKind::Memory,
            Device::Constant(_) => DeviceKind::Constant,
            Device::Timer(_) => DeviceKind::Timer,
            Device::Counter(_) => DeviceKind::Counter,
            Device::StringBuffer(_) => DeviceKind::StringBuffer,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Device::Input(d) => d.name(),
            Device::Contact(d) => d.name(),
            Device::Compare(_) => "",
            Device::BitOf(d) => d.name(),
            Device::Memory(d) => d.name(),
            Device::Constant(d) => d.name(),
            Device::Timer(d) => d.name(),
            Device::Counter(d) => d.name(),
            Device::StringBuffer(d) => d.name(),
        }
    }

    pub fn address(&self) -> u32 {
        match self {
            Device::Input(d) => d.address(),
            Device::Contact(d) => d.address(),
            Device::Compare(_) | Device::Constant(_) => 0,
            Device::BitOf(d) => d.address(),
            Device::Memory(d) => d.address(),
            Device::Timer(d) => d.address(),
            Device::Counter(d) => d.address(),
            Device::StringBuffer(d) => d.address(),
        }
    }

    /// Returns true if the device kind may be the target of an action.
    pub fn is_outable(&self) -> bool {
        match self.kind() {
            DeviceKind::Contact
            | DeviceKind::BitOf
            | DeviceKind::Memory
            | DeviceKind::Timer
            | DeviceKind::Counter => true,
            DeviceKind::Input
            | DeviceKind::Compare
            | DeviceKind::Constant
            | DeviceKind::StringBuffer => false,
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Contact {}
    impl Sealed for super::BitOf {}
    impl Sealed for super::Memory {}
    impl Sealed for super::Timer {}
    impl Sealed for super::Counter {}
}

/// Marks devices that may be the target of an action.
///
/// Inputs, comparisons, constants and string buffers do not implement this
/// trait, so an action on them does not compile.
pub trait Outable: Into<Device> + sealed::Sealed {}

impl Outable for Contact {}
impl Outable for BitOf {}
impl Outable for Memory {}
impl Outable for Timer {}
impl Outable for Counter {}

macro_rules! device_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Device {
                fn from(device: $kind) -> Self {
                    Device::$kind(device)
                }
            }
        )*
    };
}

device_from!(Input, Contact, Compare, BitOf, Memory, Constant, Timer, Counter, StringBuffer);

macro_rules! bit_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Bit {
                fn from(device: $kind) -> Self {
                    Bit::$kind(device)
                }
            }
        )*
    };
}

bit_from!(Input, Contact, BitOf, Compare);

macro_rules! word_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Word {
                fn from(device: $kind) -> Self {
                    Word::$kind(device)
                }
            }
        )*
    };
}

word_from!(Memory, Constant, Timer, Counter);

impl From<Bit> for Device {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Input(d) => Device::Input(d),
            Bit::Contact(d) => Device::Contact(d),
            Bit::BitOf(d) => Device::BitOf(d),
            Bit::Compare(d) => Device::Compare(d),
        }
    }
}

impl From<Word> for Device {
    fn from(word: Word) -> Self {
        match word {
            Word::Memory(d) => Device::Memory(d),
            Word::Constant(d) => Device::Constant(d),
            Word::Timer(d) => Device::Timer(d),
            Word::Counter(d) => Device::Counter(d),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Word::Memory(d) => write!(f, "{}{}", d.name, d.address),
            Word::Constant(d) if d.name.is_empty() => write!(f, "K{}", d.value),
            Word::Constant(d) => write!(f, "{}", d.name),
            Word::Timer(d) => write!(f, "{}{}", d.name, d.address),
            Word::Counter(d) => write!(f, "{}{}", d.name, d.address),
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse() {
            write!(f, "!")?;
        }
        match self {
            Bit::Input(d) => write!(f, "{}{}", d.name, d.address),
            Bit::Contact(d) => write!(f, "{}{}", d.name, d.address),
            Bit::BitOf(d) => write!(f, "{}{}.{}", d.name(), d.address(), d.bit),
            Bit::Compare(d) => write!(f, "{}{}{}", d.left, d.relation.symbol(), d.right),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Input(d) => write!(f, "{}", Bit::Input(d.clone())),
            Device::Contact(d) => write!(f, "{}", Bit::Contact(d.clone())),
            Device::Compare(d) => write!(f, "{}", Bit::Compare(d.clone())),
            Device::BitOf(d) => write!(f, "{}", Bit::BitOf(d.clone())),
            Device::Memory(d) => write!(f, "{}", Word::Memory(d.clone())),
            Device::Constant(d) => write!(f, "{}", Word::Constant(d.clone())),
            Device::Timer(d) => write!(f, "{}", Word::Timer(d.clone())),
            Device::Counter(d) => write!(f, "{}", Word::Counter(d.clone())),
            Device::StringBuffer(d) => write!(f, "{}{}", d.name, d.address),
        }
    }
}
