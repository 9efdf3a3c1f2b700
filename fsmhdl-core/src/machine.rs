//! The Moore finite state machine aggregate.

use crate::arena::{Arena, StateId, TransitionId};
use crate::error::CoreError;
use crate::state::StateSet;
use crate::transition::TransitionSet;
use fsmhdl_expr::Symbol;
use std::collections::{BTreeMap, BTreeSet};

/// A Moore machine: registered states and transitions plus a default state.
///
/// The machine holds handles only; entity data lives in the [`Arena`] passed
/// to each operation.
#[derive(Debug, Clone, Default)]
pub struct FiniteStateMachine {
    states: StateSet,
    transitions: TransitionSet,
    default_state: Option<StateId>,
}

impl FiniteStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a state.
    ///
    /// With `default` set, the state becomes the machine's default and its
    /// own default flag is raised. A later default replaces an earlier one;
    /// the earlier state keeps its flag.
    pub fn add_state(
        &mut self,
        arena: &mut Arena,
        id: StateId,
        default: bool,
    ) -> Result<(), CoreError> {
        arena.check_state(id)?;
        self.states.insert(id);

        if default {
            if let Some(previous) = self.default_state.filter(|&p| p != id) {
                tracing::warn!(
                    previous = %arena[previous].name(),
                    state = %arena[id].name(),
                    "replacing default state"
                );
            }
            self.default_state = Some(id);
            arena[id].set_default(true);
        }
        Ok(())
    }

    /// Registers a transition. Transitions equal in value are still distinct.
    pub fn add_transition(&mut self, arena: &Arena, id: TransitionId) -> Result<(), CoreError> {
        arena.check_transition(id)?;
        self.transitions.insert(id);
        Ok(())
    }

    /// Returns every registered state named `name`.
    pub fn get_state(&self, arena: &Arena, name: &str) -> StateSet {
        self.states.by_name(arena, name)
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn transitions(&self) -> &TransitionSet {
        &self.transitions
    }

    pub fn default_state(&self) -> Option<StateId> {
        self.default_state
    }

    /// Returns the inputs read by any transition condition.
    pub fn inputs(&self, arena: &Arena) -> BTreeSet<Symbol> {
        self.transitions.conditions(arena).inputs()
    }

    /// Returns each output name with the number of states defining it.
    pub fn outputs<'a>(&self, arena: &'a Arena) -> BTreeMap<&'a str, usize> {
        self.states.outputs(arena)
    }
}
