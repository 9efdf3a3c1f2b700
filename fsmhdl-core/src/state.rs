//! Moore states and state sets.

use crate::arena::{Arena, StateId};
use crate::error::CoreError;
use fsmhdl_expr::{is_identifier, ExprError, LogicLevel};
use serde::{Deserialize, Serialize};
use std::collections::{btree_set, BTreeMap, BTreeSet};

/// Output assignments of a state: output name to logic level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, LogicLevel>")]
pub struct Outputs(BTreeMap<String, LogicLevel>);

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds outputs from name/value pairs, validating both.
    pub fn try_from_pairs<I, S, V>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: TryInto<LogicLevel>,
        CoreError: From<V::Error>,
    {
        let mut outputs = Self::new();
        for (name, value) in pairs {
            outputs.insert(name, value.try_into()?)?;
        }
        Ok(outputs)
    }

    /// Sets one output. The name must be an identifier.
    pub fn insert(&mut self, name: impl Into<String>, level: LogicLevel) -> Result<(), CoreError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(ExprError::InvalidIdentifier { name }.into());
        }
        self.0.insert(name, level);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<LogicLevel> {
        self.0.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LogicLevel)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<String, LogicLevel>> for Outputs {
    type Error = CoreError;

    fn try_from(map: BTreeMap<String, LogicLevel>) -> Result<Self, Self::Error> {
        Self::try_from_pairs(map)
    }
}

/// A Moore state: a name, its output levels and the default flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    name: String,
    outputs: Outputs,
    default: bool,
}

impl State {
    /// Creates a state with no outputs.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self {
            name,
            outputs: Outputs::new(),
            default: false,
        })
    }

    pub fn with_output<V>(mut self, name: impl Into<String>, value: V) -> Result<Self, CoreError>
    where
        V: TryInto<LogicLevel>,
        CoreError: From<V::Error>,
    {
        self.outputs.insert(name, value.try_into()?)?;
        Ok(self)
    }

    pub fn with_outputs(mut self, outputs: Outputs) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.names()
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), CoreError> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Replaces all outputs at once.
    pub fn set_outputs(&mut self, outputs: Outputs) {
        self.outputs = outputs;
    }

    pub fn set_default(&mut self, default: bool) {
        self.default = default;
    }
}

fn check_name(name: &str) -> Result<(), CoreError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ExprError::InvalidIdentifier {
            name: name.to_string(),
        }
        .into())
    }
}

/// An ordered set of state handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet(BTreeSet<StateId>);

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handle; returns false if it was already present.
    pub fn insert(&mut self, id: StateId) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: StateId) -> bool {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &StateSet) -> StateSet {
        StateSet(self.0.union(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &StateSet) -> StateSet {
        StateSet(self.0.difference(&other.0).copied().collect())
    }

    /// Returns the members named `name`.
    pub fn by_name(&self, arena: &Arena, name: &str) -> StateSet {
        self.iter().filter(|&id| arena[id].name() == name).collect()
    }

    /// Returns each member name with the number of members carrying it.
    pub fn names<'a>(&self, arena: &'a Arena) -> BTreeMap<&'a str, usize> {
        let mut counts = BTreeMap::new();
        for id in self.iter() {
            *counts.entry(arena[id].name()).or_insert(0) += 1;
        }
        counts
    }

    /// Returns each output name with the number of members defining it.
    pub fn outputs<'a>(&self, arena: &'a Arena) -> BTreeMap<&'a str, usize> {
        let mut counts = BTreeMap::new();
        for id in self.iter() {
            for name in arena[id].output_names() {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Returns whether names are unique and every member defines the same outputs.
    pub fn is_valid(&self, arena: &Arena) -> bool {
        self.validate(arena).is_ok()
    }

    /// Like [`is_valid`](Self::is_valid), but reports the first violation.
    pub fn validate(&self, arena: &Arena) -> Result<(), CoreError> {
        if let Some((name, count)) = self.names(arena).into_iter().find(|(_, n)| *n > 1) {
            return Err(CoreError::InvalidStates {
                reason: format!("state name '{}' is used {} times", name, count),
            });
        }

        let members = self.len();
        if let Some((name, count)) = self
            .outputs(arena)
            .into_iter()
            .find(|(_, n)| *n != members)
        {
            return Err(CoreError::InvalidStates {
                reason: format!(
                    "output '{}' is defined by {} of {} states",
                    name, count, members
                ),
            });
        }
        Ok(())
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        StateSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = std::iter::Copied<btree_set::Iter<'a, StateId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
