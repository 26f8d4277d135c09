//! Allocators that issue devices with sequential, bounded addresses.
//!
//! An allocator owns a contiguous address range `[origin, origin + size)` and
//! a cursor. Each allocation issues the device at the cursor and advances it,
//! so the same sequence of calls always yields the same addresses.

use std::fmt;

use log::trace;

use ladder_problems::Problem;

use crate::device::{
    Contact, Counter, Device, DeviceKind, Input, Memory, StringBuffer, Timer, Word, WordSize,
};
use crate::diagnostic::{Diagnostic, Label};

/// Creates the devices of one concrete kind for an [`Allocator`].
pub trait DeviceFactory {
    type Device: Clone + Into<Device>;

    const KIND: DeviceKind;

    fn create(&self, name: &str, address: u32) -> Self::Device;
}

pub struct InputFactory;

impl DeviceFactory for InputFactory {
    type Device = Input;
    const KIND: DeviceKind = DeviceKind::Input;

    fn create(&self, name: &str, address: u32) -> Input {
        Input::new(name, address)
    }
}

pub struct ContactFactory;

impl DeviceFactory for ContactFactory {
    type Device = Contact;
    const KIND: DeviceKind = DeviceKind::Contact;

    fn create(&self, name: &str, address: u32) -> Contact {
        Contact::new(name, address)
    }
}

pub struct MemoryFactory {
    size: WordSize,
}

impl DeviceFactory for MemoryFactory {
    type Device = Memory;
    const KIND: DeviceKind = DeviceKind::Memory;

    fn create(&self, name: &str, address: u32) -> Memory {
        Memory::new(name, address, self.size)
    }
}

/// Issues timers that share one preset.
pub struct TimerFactory {
    preset: Word,
}

impl DeviceFactory for TimerFactory {
    type Device = Timer;
    const KIND: DeviceKind = DeviceKind::Timer;

    fn create(&self, name: &str, address: u32) -> Timer {
        Timer::new(name, address, self.preset.clone())
    }
}

/// Issues counters that share one preset.
pub struct CounterFactory {
    preset: Word,
}

impl DeviceFactory for CounterFactory {
    type Device = Counter;
    const KIND: DeviceKind = DeviceKind::Counter;

    fn create(&self, name: &str, address: u32) -> Counter {
        Counter::new(name, address, self.preset.clone())
    }
}

pub struct StringBufferFactory {
    word_count: u32,
}

impl DeviceFactory for StringBufferFactory {
    type Device = StringBuffer;
    const KIND: DeviceKind = DeviceKind::StringBuffer;

    fn create(&self, name: &str, address: u32) -> StringBuffer {
        StringBuffer::new(name, address, self.word_count)
    }
}

/// A comment attached to an issued device, kept for documentation tools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    device: Device,
    text: String,
}

impl Comment {
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The address range an allocator owned, with the comments it recorded.
///
/// A [`LogicUnit`](crate::unit::LogicUnit) keeps one of these for every
/// allocator registered with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressRange {
    name: String,
    kind: DeviceKind,
    origin: u32,
    size: u32,
    comments: Vec<Comment>,
}

impl AddressRange {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn origin(&self) -> u32 {
        self.origin
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Returns true if both ranges have the same name and share an address.
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.name == other.name
            && u64::from(self.origin) < other.end()
            && u64::from(other.origin) < self.end()
    }

    fn end(&self) -> u64 {
        u64::from(self.origin) + u64::from(self.size)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{})", self.name, self.origin, self.end())
    }
}

impl<F: DeviceFactory> From<Allocator<F>> for AddressRange {
    fn from(allocator: Allocator<F>) -> Self {
        Self {
            name: allocator.name,
            kind: F::KIND,
            origin: allocator.origin,
            size: allocator.size,
            comments: allocator.comments,
        }
    }
}

pub type InputAllocator = Allocator<InputFactory>;
pub type ContactAllocator = Allocator<ContactFactory>;
pub type MemoryAllocator = Allocator<MemoryFactory>;
pub type TimerAllocator = Allocator<TimerFactory>;
pub type CounterAllocator = Allocator<CounterFactory>;
pub type StringBufferAllocator = Allocator<StringBufferFactory>;

/// Issues devices of one kind from an address range.
pub struct Allocator<F: DeviceFactory> {
    name: String,
    origin: u32,
    size: u32,
    cursor: u64,
    comments: Vec<Comment>,
    factory: F,
}

impl Allocator<InputFactory> {
    pub fn input(name: impl Into<String>, size: u32, origin: u32) -> Self {
        Self::new(name, size, origin, InputFactory)
    }
}

impl Allocator<ContactFactory> {
    pub fn contact(name: impl Into<String>, size: u32, origin: u32) -> Self {
        Self::new(name, size, origin, ContactFactory)
    }
}

impl Allocator<MemoryFactory> {
    pub fn memory(name: impl Into<String>, size: u32, origin: u32, word_size: WordSize) -> Self {
        Self::new(name, size, origin, MemoryFactory { size: word_size })
    }
}

impl Allocator<TimerFactory> {
    pub fn timer(name: impl Into<String>, size: u32, origin: u32, preset: impl Into<Word>) -> Self {
        Self::new(
            name,
            size,
            origin,
            TimerFactory {
                preset: preset.into(),
            },
        )
    }
}

impl Allocator<CounterFactory> {
    pub fn counter(
        name: impl Into<String>,
        size: u32,
        origin: u32,
        preset: impl Into<Word>,
    ) -> Self {
        Self::new(
            name,
            size,
            origin,
            CounterFactory {
                preset: preset.into(),
            },
        )
    }
}

impl Allocator<StringBufferFactory> {
    pub fn string_buffer(name: impl Into<String>, size: u32, origin: u32, word_count: u32) -> Self {
        Self::new(name, size, origin, StringBufferFactory { word_count })
    }
}

impl<F: DeviceFactory> Allocator<F> {
    pub fn new(name: impl Into<String>, size: u32, origin: u32, factory: F) -> Self {
        Self {
            name: name.into(),
            origin,
            size,
            cursor: u64::from(origin),
            comments: Vec::new(),
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> u32 {
        self.origin
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// The address the next call to [`allocate`](Self::allocate) issues.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Comments recorded for issued devices, in allocation order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Issues the device at the cursor and advances the cursor.
    ///
    /// Returns an error once the range is exhausted.
    pub fn allocate(&mut self, comment: Option<&str>) -> Result<F::Device, Diagnostic> {
        if self.cursor >= self.bound() {
            return Err(self.overflow("Address range is exhausted"));
        }
        self.issue(comment)
    }

    /// Moves the cursor forward to `skip_to` and issues the device there.
    ///
    /// The skip must move strictly forward and stay inside the range.
    pub fn allocate_at(
        &mut self,
        skip_to: u32,
        comment: Option<&str>,
    ) -> Result<F::Device, Diagnostic> {
        let target = u64::from(skip_to);
        if !(self.cursor < target && target < self.bound()) {
            return Err(self
                .overflow("Skip target is not ahead of the cursor within the range")
                .with_context("skip_to", skip_to));
        }
        self.cursor = target;
        self.issue(comment)
    }

    fn bound(&self) -> u64 {
        u64::from(self.origin) + u64::from(self.size)
    }

    fn issue(&mut self, comment: Option<&str>) -> Result<F::Device, Diagnostic> {
        let address = u32::try_from(self.cursor)
            .map_err(|_| self.overflow("Address does not fit the address space"))?;
        let device = self.factory.create(&self.name, address);
        self.cursor += 1;

        trace!("Allocated {}{}", self.name, address);

        if let Some(text) = comment {
            self.comments.push(Comment {
                device: device.clone().into(),
                text: text.to_string(),
            });
        }
        Ok(device)
    }

    fn overflow(&self, message: &str) -> Diagnostic {
        Diagnostic::problem(
            Problem::AllocationOverflow,
            Label::allocator(&self.name, self.cursor, message),
        )
        .with_context("origin", self.origin)
        .with_context("size", self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Constant, DeviceKind};

    #[test]
    fn allocate_when_input_allocator_twice_then_sequential_addresses_with_base_name() {
        let mut inputs = Allocator::input("X", 8, 0);

        let first = inputs.allocate(None).unwrap();
        let second = inputs.allocate(None).unwrap();

        assert_eq!(first.address(), 0);
        assert_eq!(second.address(), 1);
        assert_eq!(first.name(), "X");
        assert_eq!(second.name(), "X");
    }

    #[test]
    fn allocate_when_range_exhausted_then_allocation_overflow() {
        let mut contacts = Allocator::contact("M", 4, 100);

        let addresses: Vec<u32> = (0..4)
            .map(|_| contacts.allocate(None).unwrap().address())
            .collect();
        let result = contacts.allocate(None);

        assert_eq!(addresses, vec![100, 101, 102, 103]);
        assert!(result.unwrap_err().is(Problem::AllocationOverflow));
    }

    #[test]
    fn allocate_when_size_zero_then_allocation_overflow() {
        let mut contacts = Allocator::contact("M", 0, 0);

        assert!(contacts.allocate(None).is_err());
    }

    #[test]
    fn allocate_at_when_forward_within_range_then_issues_and_continues() {
        let mut memory = Allocator::memory("D", 16, 0, WordSize::Int16);
        memory.allocate(None).unwrap();

        let skipped = memory.allocate_at(10, None).unwrap();
        let next = memory.allocate(None).unwrap();

        assert_eq!(skipped.address(), 10);
        assert_eq!(next.address(), 11);
    }

    #[test]
    fn allocate_at_when_target_is_cursor_then_allocation_overflow() {
        let mut memory = Allocator::memory("D", 16, 0, WordSize::Int16);
        memory.allocate(None).unwrap();

        let result = memory.allocate_at(1, None);

        assert!(result.unwrap_err().is(Problem::AllocationOverflow));
        assert_eq!(memory.cursor(), 1);
    }

    #[test]
    fn allocate_at_when_target_is_bound_then_allocation_overflow() {
        let mut memory = Allocator::memory("D", 16, 0, WordSize::Int16);

        assert!(memory.allocate_at(16, None).is_err());
        assert!(memory.allocate_at(15, None).is_ok());
    }

    #[test]
    fn allocate_at_when_backwards_then_allocation_overflow() {
        let mut memory = Allocator::memory("D", 16, 0, WordSize::Int16);
        memory.allocate_at(8, None).unwrap();

        let result = memory.allocate_at(4, None);

        let err = result.unwrap_err();
        assert!(err.is(Problem::AllocationOverflow));
        assert!(err.described.contains(&"skip_to=4".to_string()));
    }

    #[test]
    fn allocate_when_comment_then_recorded_with_device() {
        let mut timers = Allocator::timer("T", 8, 0, Constant::new(50));

        let timer = timers.allocate(Some("Lamp delay")).unwrap();
        timers.allocate(None).unwrap();

        assert_eq!(timers.comments().len(), 1);
        let comment = &timers.comments()[0];
        assert_eq!(comment.text(), "Lamp delay");
        assert_eq!(comment.device(), &Device::Timer(timer));
    }

    #[test]
    fn allocate_when_counter_allocator_then_devices_share_preset() {
        let mut counters = Allocator::counter("C", 2, 0, Constant::new(3));

        let counter = counters.allocate(None).unwrap();

        assert_eq!(counter.preset(), &Word::Constant(Constant::new(3)));
        assert_eq!(Device::from(counter).kind(), DeviceKind::Counter);
    }

    #[test]
    fn allocate_when_string_buffer_then_word_count_applied() {
        let mut buffers = Allocator::string_buffer("S", 4, 200, 8);

        let buffer = buffers.allocate(None).unwrap().with_initial("READY");

        assert_eq!(buffer.address(), 200);
        assert_eq!(buffer.word_count(), 8);
        assert_eq!(buffer.initial(), "READY");
    }

    #[test]
    fn overlaps_when_same_name_and_shared_address_then_true() {
        let low = AddressRange::from(Allocator::contact("M", 8, 0));
        let high = AddressRange::from(Allocator::contact("M", 8, 7));
        let adjacent = AddressRange::from(Allocator::contact("M", 8, 8));
        let other_name = AddressRange::from(Allocator::contact("Y", 8, 0));

        assert!(low.overlaps(&high));
        assert!(high.overlaps(&low));
        assert!(!low.overlaps(&adjacent));
        assert!(!low.overlaps(&other_name));
    }

    #[test]
    fn from_when_allocator_used_then_range_keeps_kind_and_comments() {
        let mut timers = Allocator::timer("T", 4, 10, Constant::new(5));
        timers.allocate(Some("Purge delay")).unwrap();

        let range = AddressRange::from(timers);

        assert_eq!(range.kind(), DeviceKind::Timer);
        assert_eq!(range.to_string(), "T[10..14)");
        assert_eq!(range.comments()[0].text(), "Purge delay");
    }

    #[test]
    fn allocate_when_range_at_top_of_address_space_then_overflow_instead_of_wrap() {
        let mut inputs = Allocator::input("X", 2, u32::MAX);

        assert_eq!(inputs.allocate(None).unwrap().address(), u32::MAX);
        assert!(inputs.allocate(None).is_err());
    }
}
