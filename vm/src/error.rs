use std::fmt;

use ladder_dsl::diagnostic::Diagnostic;

/// Identifies one of the two machine stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackKind {
    Primary,
    Secondary,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Primary => write!(f, "primary"),
            StackKind::Secondary => write!(f, "secondary"),
        }
    }
}

/// Runtime traps that halt a scan.
///
/// Sequences produced by the compiler never trap; these only occur for
/// sequences assembled by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    StackUnderflow(StackKind),
    UnbalancedStacks { primary: usize, secondary: usize },
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::StackUnderflow(kind) => write!(f, "{kind} stack underflow"),
            Trap::UnbalancedStacks { primary, secondary } => write!(
                f,
                "stacks not empty at end of scan: primary {primary}, secondary {secondary}"
            ),
        }
    }
}

/// Errors produced by VM operations.
#[derive(Debug)]
pub enum VmError {
    /// A runtime trap occurred during a scan.
    Trap(Trap),
    /// The program could not be compiled.
    Compile(Diagnostic),
    /// The device has no storage in the process image.
    NotStorable(String),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::Trap(t) => write!(f, "trap: {t}"),
            VmError::Compile(d) => write!(f, "compile error: {d}"),
            VmError::NotStorable(device) => write!(f, "device {device} has no storage"),
        }
    }
}

impl std::error::Error for VmError {}

impl From<Trap> for VmError {
    fn from(t: Trap) -> Self {
        VmError::Trap(t)
    }
}

impl From<Diagnostic> for VmError {
    fn from(d: Diagnostic) -> Self {
        VmError::Compile(d)
    }
}
