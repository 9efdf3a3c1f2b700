//! Serializable model consumed by the VHDL template.

use crate::arena::Arena;
use crate::error::CoreError;
use crate::machine::FiniteStateMachine;
use fsmhdl_expr::{is_identifier, ExprError, LogicLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entity name used when none is given.
pub const DEFAULT_MACHINE_NAME: &str = "MooreFSM";

/// Everything a template needs to render one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateModel {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_state: Option<String>,
    pub states: Vec<TemplateState>,
    pub transitions: Vec<TemplateTransition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateState {
    pub name: String,
    #[serde(default)]
    pub default: bool,
    pub outputs: BTreeMap<String, LogicLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTransition {
    pub source: String,
    pub destination: String,
    /// Condition in canonical expression syntax.
    pub condition: String,
    /// Condition as VHDL relational text.
    pub vhdl: String,
}

impl FiniteStateMachine {
    /// Builds the template model for this machine under entity name `name`.
    pub fn template_model(&self, arena: &Arena, name: &str) -> Result<TemplateModel, CoreError> {
        if !is_identifier(name) {
            return Err(ExprError::InvalidIdentifier {
                name: name.to_string(),
            }
            .into());
        }

        let states = self
            .states()
            .iter()
            .map(|id| {
                let state = &arena[id];
                TemplateState {
                    name: state.name().to_string(),
                    default: state.is_default(),
                    outputs: state
                        .outputs()
                        .iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect(),
                }
            })
            .collect();

        let mut transitions = Vec::with_capacity(self.transitions().len());
        for id in self.transitions().iter() {
            let transition = &arena[id];
            transitions.push(TemplateTransition {
                source: arena[transition.source()].name().to_string(),
                destination: arena[transition.destination()].name().to_string(),
                condition: transition.condition().to_string(),
                vhdl: transition.condition().vhdl()?.to_string(),
            });
        }

        Ok(TemplateModel {
            name: name.to_string(),
            inputs: self.inputs(arena).into_iter().map(String::from).collect(),
            outputs: self.outputs(arena).into_keys().map(str::to_string).collect(),
            default_state: self.default_state().map(|id| arena[id].name().to_string()),
            states,
            transitions,
        })
    }
}
