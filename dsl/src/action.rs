//! Actions that a circuit performs on its target devices.
//!
//! Every action names exactly one target, and targets can only be built from
//! [`Outable`] devices, so an action on an input is rejected by the compiler
//! rather than at run time.

use std::fmt;

use crate::condition::Condition;
use crate::device::{Device, Outable, Word};

/// The device an action drives. Only constructible from [`Outable`] devices.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target(Device);

impl Target {
    pub fn device(&self) -> &Device {
        &self.0
    }
}

impl<D: Outable> From<D> for Target {
    fn from(device: D) -> Self {
        Target(device.into())
    }
}

/// An action gated by an additional condition.
///
/// The inner action fires only when both the circuit's condition and the
/// interlock hold. Everything else about the action is the inner action's.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Interlocked {
    interlock: Condition,
    action: Box<Action>,
}

impl Interlocked {
    pub fn interlock(&self) -> &Condition {
        &self.interlock
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Drives the target with the condition value.
    Output(Target),
    /// Latches the target on while the condition holds.
    Set(Target),
    /// Unlatches the target while the condition holds.
    Reset(Target),
    /// Writes a value to the target while the condition holds.
    SetValue(Target, Word),
    Interlocked(Interlocked),
}

impl Action {
    pub fn output(device: impl Outable) -> Self {
        Action::Output(Target::from(device))
    }

    pub fn set(device: impl Outable) -> Self {
        Action::Set(Target::from(device))
    }

    pub fn reset(device: impl Outable) -> Self {
        Action::Reset(Target::from(device))
    }

    pub fn set_value(device: impl Outable, value: impl Into<Word>) -> Self {
        Action::SetValue(Target::from(device), value.into())
    }

    /// Gates `action` with an additional condition.
    pub fn interlocked(interlock: impl Into<Condition>, action: Action) -> Self {
        Action::Interlocked(Interlocked {
            interlock: interlock.into(),
            action: Box::new(action),
        })
    }

    /// Returns the device the action drives. Interlocked actions report the
    /// target of the action they wrap.
    pub fn target(&self) -> &Target {
        match self {
            Action::Output(target)
            | Action::Set(target)
            | Action::Reset(target)
            | Action::SetValue(target, _) => target,
            Action::Interlocked(interlocked) => interlocked.action.target(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Output(target) => write!(f, "OUT {}", target.device()),
            Action::Set(target) => write!(f, "SET {}", target.device()),
            Action::Reset(target) => write!(f, "RST {}", target.device()),
            Action::SetValue(target, value) => write!(f, "MOV {} {}", value, target.device()),
            Action::Interlocked(interlocked) => {
                write!(f, "[{}] {}", interlocked.interlock, interlocked.action)
            }
        }
    }
}
