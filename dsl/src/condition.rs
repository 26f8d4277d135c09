//! Boolean conditions over bit devices.
//!
//! A [`Condition`] is an immutable tree. Leaves are bit devices (each with
//! its own polarity) and inner nodes are `And`/`Or` junctions. Junctions are
//! kept flat: an `And` never has an `And` child and an `Or` never has an
//! `Or` child. The children of a [`Junction`] are private so the only way to
//! build one is through the flattening constructors here.
//!
//! Negation is always pushed down to the leaves (De Morgan), so there is no
//! "not" node.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::device::{Bit, BitOf, Compare, Contact, Input};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    And,
    Or,
}

/// The ordered children of an `And` or `Or` node. Always holds at least two
/// children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Junction {
    children: Vec<Condition>,
}

impl Junction {
    pub fn children(&self) -> &[Condition] {
        &self.children
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Leaf(Bit),
    And(Junction),
    Or(Junction),
}

impl Condition {
    /// Conjunction of all the conditions.
    ///
    /// Returns `None` when there are no conditions and the condition itself
    /// when there is only one.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        Self::junction(Operator::And, conditions)
    }

    /// Disjunction of all the conditions.
    ///
    /// Returns `None` when there are no conditions and the condition itself
    /// when there is only one.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        Self::junction(Operator::Or, conditions)
    }

    pub fn and(&self, other: &Condition) -> Condition {
        Self::combine(Operator::And, self.clone(), other.clone())
    }

    pub fn or(&self, other: &Condition) -> Condition {
        Self::combine(Operator::Or, self.clone(), other.clone())
    }

    /// Returns the condition that holds exactly when this one does not.
    pub fn negate(&self) -> Condition {
        match self {
            Condition::Leaf(bit) => Condition::Leaf(bit.negate()),
            Condition::And(junction) => Self::build(
                Operator::Or,
                junction.children.iter().map(Condition::negate).collect(),
            ),
            Condition::Or(junction) => Self::build(
                Operator::And,
                junction.children.iter().map(Condition::negate).collect(),
            ),
        }
    }

    /// Returns true for `And` and `Or` nodes.
    pub fn is_junction(&self) -> bool {
        !matches!(self, Condition::Leaf(_))
    }

    fn combine(operator: Operator, left: Condition, right: Condition) -> Condition {
        let mut children = Vec::new();
        absorb(operator, left, &mut children);
        absorb(operator, right, &mut children);
        Self::build(operator, children)
    }

    fn junction(
        operator: Operator,
        conditions: impl IntoIterator<Item = Condition>,
    ) -> Option<Condition> {
        let mut children = Vec::new();
        for condition in conditions {
            absorb(operator, condition, &mut children);
        }
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(Self::build(operator, children)),
        }
    }

    /// Wraps already-flat children. Callers guarantee at least two.
    fn build(operator: Operator, children: Vec<Condition>) -> Condition {
        let junction = Junction { children };
        match operator {
            Operator::And => Condition::And(junction),
            Operator::Or => Condition::Or(junction),
        }
    }
}

/// Appends `condition` to `children`, splicing in its children when it is a
/// junction of the same operator.
fn absorb(operator: Operator, condition: Condition, children: &mut Vec<Condition>) {
    match (operator, condition) {
        (Operator::And, Condition::And(junction)) | (Operator::Or, Condition::Or(junction)) => {
            children.extend(junction.children)
        }
        (_, condition) => children.push(condition),
    }
}

impl<T: Into<Condition>> BitAnd<T> for Condition {
    type Output = Condition;

    fn bitand(self, rhs: T) -> Condition {
        Condition::combine(Operator::And, self, rhs.into())
    }
}

impl<T: Into<Condition>> BitOr<T> for Condition {
    type Output = Condition;

    fn bitor(self, rhs: T) -> Condition {
        Condition::combine(Operator::Or, self, rhs.into())
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        self.negate()
    }
}

impl From<Bit> for Condition {
    fn from(bit: Bit) -> Self {
        Condition::Leaf(bit)
    }
}

macro_rules! condition_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Condition {
                fn from(device: $kind) -> Self {
                    Condition::Leaf(Bit::$kind(device))
                }
            }
        )*
    };
}

condition_from!(Input, Contact, BitOf, Compare);

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (junction, separator) = match self {
            Condition::Leaf(bit) => return write!(f, "{bit}"),
            Condition::And(junction) => (junction, " & "),
            Condition::Or(junction) => (junction, " | "),
        };
        for (index, child) in junction.children.iter().enumerate() {
            if index > 0 {
                write!(f, "{separator}")?;
            }
            if child.is_junction() {
                write!(f, "({child})")?;
            } else {
                write!(f, "{child}")?;
            }
        }
        Ok(())
    }
}
