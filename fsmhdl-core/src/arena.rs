//! Owning store for states and transitions.
//!
//! States and transitions have identity: two states with the same name and
//! outputs are still different states. The arena owns every entity and hands
//! out integer handles; sets and machines hold handles, never values.
//! Entities are never removed, so a handle stays valid for the arena's
//! lifetime.

use crate::error::CoreError;
use crate::state::State;
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Handle to a [`State`] in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(usize);

/// Handle to a [`Transition`] in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl TransitionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s#{}", self.0)
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t#{}", self.0)
    }
}

/// Owns the states and transitions of one or more machines.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    states: Vec<State>,
    transitions: Vec<Transition>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a state and returns its handle.
    pub fn add_state(&mut self, state: State) -> StateId {
        self.states.push(state);
        StateId(self.states.len() - 1)
    }

    /// Stores a transition and returns its handle.
    ///
    /// Both endpoints must already be stored in this arena.
    pub fn add_transition(&mut self, transition: Transition) -> Result<TransitionId, CoreError> {
        self.check_state(transition.source())?;
        self.check_state(transition.destination())?;
        self.transitions.push(transition);
        Ok(TransitionId(self.transitions.len() - 1))
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.get_mut(id.0)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id.0)
    }

    pub fn transition_mut(&mut self, id: TransitionId) -> Option<&mut Transition> {
        self.transitions.get_mut(id.0)
    }

    /// Returns an error unless `id` refers to a stored state.
    pub fn check_state(&self, id: StateId) -> Result<(), CoreError> {
        if id.0 < self.states.len() {
            Ok(())
        } else {
            Err(CoreError::UnknownState { id })
        }
    }

    /// Returns an error unless `id` refers to a stored transition.
    pub fn check_transition(&self, id: TransitionId) -> Result<(), CoreError> {
        if id.0 < self.transitions.len() {
            Ok(())
        } else {
            Err(CoreError::UnknownTransition { id })
        }
    }

    /// Iterates over all stored states with their handles.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states.iter().enumerate().map(|(i, s)| (StateId(i), s))
    }

    /// Iterates over all stored transitions with their handles.
    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions
            .iter()
            .enumerate()
            .map(|(i, t)| (TransitionId(i), t))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

/// # Panics
///
/// Panics if the handle was issued by a different arena.
impl Index<StateId> for Arena {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        &self.states[id.0]
    }
}

impl IndexMut<StateId> for Arena {
    fn index_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.0]
    }
}

/// # Panics
///
/// Panics if the handle was issued by a different arena.
impl Index<TransitionId> for Arena {
    type Output = Transition;

    fn index(&self, id: TransitionId) -> &Transition {
        &self.transitions[id.0]
    }
}

impl IndexMut<TransitionId> for Arena {
    fn index_mut(&mut self, id: TransitionId) -> &mut Transition {
        &mut self.transitions[id.0]
    }
}
