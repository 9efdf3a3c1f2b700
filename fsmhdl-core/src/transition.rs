//! Transitions and transition sets.

use crate::arena::{Arena, StateId, TransitionId};
use crate::condition::{Condition, ConditionSet};
use crate::error::CoreError;
use crate::state::StateSet;
use fsmhdl_expr::Bindings;
use std::collections::{btree_set, BTreeSet};
use std::str::FromStr;

/// A guarded edge between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    source: StateId,
    destination: StateId,
    condition: Condition,
}

impl Transition {
    pub fn new(source: StateId, destination: StateId, condition: Condition) -> Self {
        Self {
            source,
            destination,
            condition,
        }
    }

    pub fn source(&self) -> StateId {
        self.source
    }

    pub fn destination(&self) -> StateId {
        self.destination
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.condition = condition;
    }

    /// Returns whether both transitions connect the same pair of states in
    /// the same direction.
    pub fn parallels(&self, other: &Transition) -> bool {
        self.source == other.source && self.destination == other.destination
    }
}

/// How [`TransitionSet::from_states`] combines its two filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    And,
    Or,
}

impl FromStr for FilterMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(FilterMode::And),
            "or" => Ok(FilterMode::Or),
            other => Err(CoreError::InvalidFilterMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// An ordered set of transition handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionSet(BTreeSet<TransitionId>);

impl TransitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TransitionId) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: TransitionId) -> bool {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: TransitionId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.0.iter().copied()
    }

    pub fn sources(&self, arena: &Arena) -> StateSet {
        self.iter().map(|id| arena[id].source()).collect()
    }

    pub fn destinations(&self, arena: &Arena) -> StateSet {
        self.iter().map(|id| arena[id].destination()).collect()
    }

    /// Returns the member conditions, one per transition.
    pub fn conditions(&self, arena: &Arena) -> ConditionSet {
        self.iter().map(|id| arena[id].condition().clone()).collect()
    }

    /// Selects members by endpoint.
    ///
    /// With both filters and [`FilterMode::And`], a member must match both.
    /// Otherwise a member matching any supplied filter is selected. With no
    /// filters the result is empty.
    pub fn from_states(
        &self,
        arena: &Arena,
        source: Option<StateId>,
        destination: Option<StateId>,
        mode: FilterMode,
    ) -> TransitionSet {
        let from = |t: &Transition| source.is_some_and(|s| t.source() == s);
        let to = |t: &Transition| destination.is_some_and(|d| t.destination() == d);

        let both = source.is_some() && destination.is_some();
        self.iter()
            .filter(|&id| {
                let t = &arena[id];
                match mode {
                    FilterMode::And if both => from(t) && to(t),
                    _ => from(t) || to(t),
                }
            })
            .collect()
    }

    /// Returns the members whose condition holds under `bindings`.
    pub fn evaluate(&self, arena: &Arena, bindings: &Bindings) -> TransitionSet {
        self.iter()
            .filter(|&id| arena[id].condition().is_satisfied_by(bindings))
            .collect()
    }

    /// Checks that no two member conditions can hold at once.
    pub fn is_exclusive(&self, arena: &Arena) -> bool {
        self.conditions(arena).is_exclusive()
    }

    /// Checks that some member condition holds for every input assignment.
    pub fn is_exhaustive(&self, arena: &Arena) -> bool {
        self.conditions(arena).is_exhaustive()
    }

    /// Fails when a state is only ever left or only ever entered.
    ///
    /// Unreachable states are reported before unexitable ones.
    pub fn check_reachability(&self, arena: &Arena) -> Result<(), CoreError> {
        let sources = self.sources(arena);
        let destinations = self.destinations(arena);

        let unreachable = sources.difference(&destinations);
        if !unreachable.is_empty() {
            return Err(CoreError::UnreachableState {
                states: names(arena, &unreachable),
            });
        }

        let unexitable = destinations.difference(&sources);
        if !unexitable.is_empty() {
            return Err(CoreError::UnexitableState {
                states: names(arena, &unexitable),
            });
        }
        Ok(())
    }

    /// Returns the pairs of distinct members that parallel each other.
    pub fn parallel_pairs(&self, arena: &Arena) -> Vec<(TransitionId, TransitionId)> {
        let ids: Vec<TransitionId> = self.iter().collect();
        let mut pairs = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if arena[a].parallels(&arena[b]) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }
}

fn names(arena: &Arena, states: &StateSet) -> Vec<String> {
    states.iter().map(|id| arena[id].name().to_string()).collect()
}

impl FromIterator<TransitionId> for TransitionSet {
    fn from_iter<I: IntoIterator<Item = TransitionId>>(iter: I) -> Self {
        TransitionSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TransitionSet {
    type Item = TransitionId;
    type IntoIter = std::iter::Copied<btree_set::Iter<'a, TransitionId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
