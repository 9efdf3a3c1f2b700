//! Machine definition documents.
//!
//! Machines can be described in JSON or YAML:
//!
//! ```yaml
//! name: detector
//! states:
//!   - name: s0
//!     default: true
//!     outputs: { u: 0 }
//!   - name: s1
//!     outputs: { u: "1" }
//! transitions:
//!   - { from: s0, to: s1, condition: "x" }
//!   - { from: [s0, s1], to: s0, condition: "~x" }
//! ```
//!
//! Transitions name their endpoints; `from` may list several sources, each
//! producing its own transition.

use crate::arena::{Arena, StateId};
use crate::condition::Condition;
use crate::error::CoreError;
use crate::export::DEFAULT_MACHINE_NAME;
use crate::machine::FiniteStateMachine;
use crate::state::{Outputs, State};
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A state entry in a definition document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,

    #[serde(default)]
    pub outputs: Outputs,
}

/// A transition entry in a definition document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    /// Source state(s). Can be a single state or multiple.
    #[serde(deserialize_with = "deserialize_from_states")]
    pub from: Vec<String>,

    pub to: String,

    /// Guard condition; a missing condition always holds.
    #[serde(default = "always")]
    pub condition: String,
}

fn always() -> String {
    "TRUE".to_string()
}

fn deserialize_from_states<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct FromStatesVisitor;

    impl<'de> Visitor<'de> for FromStatesVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a state name or array of state names")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut states = Vec::new();
            while let Some(s) = seq.next_element::<String>()? {
                states.push(s);
            }
            Ok(states)
        }
    }

    deserializer.deserialize_any(FromStatesVisitor)
}

/// Raw machine definition as read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDefinitionRaw {
    /// Entity name for generated code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub states: Vec<StateDefinition>,

    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

/// A machine built from a definition document.
#[derive(Debug, Clone)]
pub struct MachineDefinition {
    /// Entity name, defaulting to [`DEFAULT_MACHINE_NAME`].
    pub name: String,

    /// Owns the machine's states and transitions.
    pub arena: Arena,

    pub machine: FiniteStateMachine,

    /// Original raw definition.
    pub raw: MachineDefinitionRaw,

    /// CRC32C of the canonical JSON encoding of `raw`.
    pub checksum: String,
}

impl MachineDefinition {
    /// Parses a machine definition from a JSON value.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, CoreError> {
        let raw: MachineDefinitionRaw = serde_json::from_value(json.clone())?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CoreError> {
        let raw: MachineDefinitionRaw = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CoreError> {
        let raw: MachineDefinitionRaw = serde_yaml::from_str(text)?;
        Self::from_raw(raw)
    }

    /// Loads a definition, choosing the format by file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let definition = match extension.as_deref() {
            Some("json") => Self::from_json_str(&text)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text)?,
            _ => {
                return Err(CoreError::InvalidDefinition {
                    reason: format!(
                        "cannot tell the format of '{}': expected .json, .yaml or .yml",
                        path.display()
                    ),
                })
            }
        };

        tracing::info!(
            path = %path.display(),
            name = %definition.name,
            checksum = %definition.checksum,
            "loaded machine definition"
        );
        Ok(definition)
    }

    /// Builds the machine from raw parts.
    pub fn from_raw(raw: MachineDefinitionRaw) -> Result<Self, CoreError> {
        let name = raw
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_MACHINE_NAME.to_string());

        let mut arena = Arena::new();
        let mut machine = FiniteStateMachine::new();

        // Build states, indexing handles by name
        let mut by_name: HashMap<&str, Vec<StateId>> = HashMap::new();
        for s in &raw.states {
            let state = State::new(s.name.as_str())?.with_outputs(s.outputs.clone());
            let id = arena.add_state(state);
            machine.add_state(&mut arena, id, s.default)?;
            by_name.entry(s.name.as_str()).or_default().push(id);
        }

        let lookup = |name: &str, role: &str| -> Result<StateId, CoreError> {
            match by_name.get(name).map(Vec::as_slice) {
                Some([id]) => Ok(*id),
                Some(ids) if ids.len() > 1 => Err(CoreError::InvalidDefinition {
                    reason: format!(
                        "transition {} '{}' is ambiguous: {} states share the name",
                        role,
                        name,
                        ids.len()
                    ),
                }),
                _ => Err(CoreError::InvalidDefinition {
                    reason: format!("transition {} '{}' not in states list", role, name),
                }),
            }
        };

        // Build transitions, one per source state
        for t in &raw.transitions {
            if t.from.is_empty() {
                return Err(CoreError::InvalidDefinition {
                    reason: format!("transition to '{}' has no source state", t.to),
                });
            }
            let destination = lookup(&t.to, "target")?;
            let condition = Condition::parse(&t.condition)?;

            for from in &t.from {
                let source = lookup(from, "source")?;
                let id = arena.add_transition(Transition::new(
                    source,
                    destination,
                    condition.clone(),
                ))?;
                machine.add_transition(&arena, id)?;
            }
        }

        // Compute checksum
        let json_bytes = serde_json::to_vec(&raw)?;
        let checksum = format!("{:08x}", crc32c::crc32c(&json_bytes));

        Ok(Self {
            name,
            arena,
            machine,
            raw,
            checksum,
        })
    }

    /// Returns the raw definition as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::to_value(&self.raw)?)
    }

    pub fn to_yaml(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(&self.raw)?)
    }
}
