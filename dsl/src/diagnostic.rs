//! Provides definition for diagnostics, which are the errors produced while
//! allocating devices, assembling programs and compiling them.
//!
//! Ladder programs are built in code rather than parsed from files, so a
//! diagnostic points at a domain location (an allocator, a logic unit or a
//! circuit within a unit) instead of a span in a source file.

use std::fmt;

use ladder_problems::Problem;

/// Where a diagnostic originates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// An allocator and the position of its cursor when the problem occurred.
    Allocator { name: String, cursor: u64 },
    /// A logic unit as a whole.
    Unit { name: String },
    /// A circuit, identified by its position in the unit's circuit list.
    Circuit { unit: String, index: usize },
    /// A single device.
    Device { name: String, address: u32 },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Allocator { name, cursor } => write!(f, "allocator '{name}' at {cursor}"),
            Location::Unit { name } => write!(f, "unit '{name}'"),
            Location::Circuit { unit, index } => write!(f, "unit '{unit}' circuit #{index}"),
            Location::Device { name, address } => write!(f, "device {name}{address}"),
        }
    }
}

/// A label that refers to a location and a message related to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// The location of the label.
    pub location: Location,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn allocator(name: impl Into<String>, cursor: u64, message: impl Into<String>) -> Self {
        Self {
            location: Location::Allocator {
                name: name.into(),
                cursor,
            },
            message: message.into(),
        }
    }

    pub fn unit(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Location::Unit { name: name.into() },
            message: message.into(),
        }
    }

    pub fn device(name: impl Into<String>, address: u32, message: impl Into<String>) -> Self {
        Self {
            location: Location::Device {
                name: name.into(),
                address,
            },
            message: message.into(),
        }
    }

    pub fn circuit(unit: impl Into<String>, index: usize, message: impl Into<String>) -> Self {
        Self {
            location: Location::Circuit {
                unit: unit.into(),
                index,
            },
            message: message.into(),
        }
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category,
/// a primary location and possibly a non-zero set of secondary locations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary or first label.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    ///
    /// The context forms part of the main description and does not need to be
    /// related to a location.
    pub fn with_context(mut self, description: &str, item: impl fmt::Display) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns true if this diagnostic was created for the problem.
    pub fn is(&self, problem: Problem) -> bool {
        self.code == problem.code()
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {}: {}",
            self.code,
            self.description(),
            self.primary.location,
            self.primary.message
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_when_context_then_appends_items() {
        let diagnostic = Diagnostic::problem(
            Problem::AllocationOverflow,
            Label::allocator("X", 8, "No address left"),
        )
        .with_context("size", 8)
        .with_context("origin", 0);

        assert_eq!(
            diagnostic.description(),
            format!("{} (size=8, origin=0)", Problem::AllocationOverflow.message())
        );
    }

    #[test]
    fn display_when_circuit_label_then_includes_code_and_location() {
        let diagnostic = Diagnostic::problem(
            Problem::StackInvariantViolation,
            Label::circuit("main", 3, "Primary stack depth 1"),
        );

        let text = diagnostic.to_string();

        assert!(text.starts_with("P0003: "));
        assert!(text.contains("unit 'main' circuit #3"));
        assert!(text.ends_with("Primary stack depth 1"));
    }

    #[test]
    fn is_when_same_problem_then_true() {
        let diagnostic =
            Diagnostic::problem(Problem::UnitNameDuplicated, Label::unit("main", "Duplicate"));

        assert!(diagnostic.is(Problem::UnitNameDuplicated));
        assert!(!diagnostic.is(Problem::AllocationOverflow));
    }
}
