//! A circuit: one condition gating an ordered list of actions.

use std::fmt;

use crate::action::Action;
use crate::condition::Condition;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Circuit {
    condition: Condition,
    actions: Vec<Action>,
}

impl Circuit {
    pub fn new(condition: impl Into<Condition>, actions: Vec<Action>) -> Self {
        Self {
            condition: condition.into(),
            actions,
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// The actions in the order they are evaluated.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

impl Condition {
    /// A circuit with this condition and a single action.
    pub fn then(self, action: Action) -> Circuit {
        Circuit::new(self, vec![action])
    }

    /// A circuit with this condition driving several actions side by side.
    pub fn then_parallel(self, actions: impl IntoIterator<Item = Action>) -> Circuit {
        Circuit::new(self, actions.into_iter().collect())
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} =>", self.condition)?;
        for action in &self.actions {
            write!(f, " {action};")?;
        }
        Ok(())
    }
}
