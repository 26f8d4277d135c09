//! Grouping of circuits into logic units and of units into a program.

use std::collections::BTreeMap;

use ladder_problems::Problem;
use log::trace;

use crate::allocator::{AddressRange, Comment};
use crate::circuit::Circuit;
use crate::diagnostic::{Diagnostic, Label};

/// A named, ordered list of circuits sharing one device address namespace.
///
/// Circuits can only be appended; their order is the compilation order.
/// The unit takes ownership of the allocators that issued its devices and
/// keeps their address ranges disjoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogicUnit {
    name: String,
    circuits: Vec<Circuit>,
    ranges: Vec<AddressRange>,
}

impl LogicUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            circuits: Vec::new(),
            ranges: Vec::new(),
        }
    }

    /// Takes ownership of an allocator once its devices have been issued.
    ///
    /// Returns an error and leaves the unit unchanged if the allocator's
    /// range overlaps the range of an allocator with the same name that is
    /// already registered.
    pub fn register(
        &mut self,
        allocator: impl Into<AddressRange>,
    ) -> Result<&mut Self, Diagnostic> {
        let range = allocator.into();
        if let Some(existing) = self.ranges.iter().find(|existing| existing.overlaps(&range)) {
            return Err(Diagnostic::problem(
                Problem::AddressRangeOverlap,
                Label::unit(&self.name, "Allocator range is already in use"),
            )
            .with_context("range", &range)
            .with_context("registered", existing)
            .with_secondary(Label::allocator(
                existing.name(),
                u64::from(existing.origin()),
                "Range registered here",
            )));
        }
        trace!("Registered {} with unit '{}'", range, self.name);
        self.ranges.push(range);
        Ok(self)
    }

    /// The address ranges of the registered allocators, in registration order.
    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    /// Comments of every registered allocator, in registration order.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.ranges.iter().flat_map(|range| range.comments())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a circuit.
    pub fn circuit(&mut self, circuit: Circuit) -> &mut Self {
        self.circuits.push(circuit);
        self
    }

    /// Appends the circuit built by `factory`.
    pub fn circuit_with(&mut self, factory: impl FnOnce() -> Circuit) -> &mut Self {
        self.circuit(factory())
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }
}

/// A named set of logic units, keyed by unit name.
///
/// Units are kept ordered by name so that everything derived from a
/// program is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    name: String,
    units: BTreeMap<String, LogicUnit>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a unit under `name`.
    ///
    /// Returns an error and keeps the existing unit if the name is taken.
    pub fn add(&mut self, name: impl Into<String>, unit: LogicUnit) -> Result<(), Diagnostic> {
        let name = name.into();
        if self.units.contains_key(&name) {
            return Err(Diagnostic::problem(
                Problem::UnitNameDuplicated,
                Label::unit(&name, "Unit name is already used"),
            )
            .with_context("program", &self.name));
        }
        self.units.insert(name, unit);
        Ok(())
    }

    pub fn unit(&self, name: &str) -> Option<&LogicUnit> {
        self.units.get(name)
    }

    /// The units with the names they were added under, ordered by name.
    pub fn units(&self) -> impl Iterator<Item = (&str, &LogicUnit)> {
        self.units.iter().map(|(name, unit)| (name.as_str(), unit))
    }

    /// Comments of every unit, with the name of the unit they belong to.
    pub fn comments(&self) -> impl Iterator<Item = (&str, &Comment)> {
        self.units()
            .flat_map(|(name, unit)| unit.comments().map(move |comment| (name, comment)))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
