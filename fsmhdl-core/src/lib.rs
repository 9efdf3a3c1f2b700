//! # fsmhdl-core
//!
//! Moore state machine model for fsmhdl.
//!
//! This crate provides:
//! - Conditions with cached VHDL lowering
//! - States, transitions and the sets that analyse them
//! - An arena that gives states and transitions identity
//! - Machine definition documents and diagnostics
//! - The model consumed by VHDL templates

pub mod arena;
pub mod condition;
pub mod definition;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod machine;
pub mod state;
pub mod transition;

pub use arena::{Arena, StateId, TransitionId};
pub use condition::{Condition, ConditionSet};
pub use definition::{MachineDefinition, MachineDefinitionRaw};
pub use diagnostics::{Diagnostics, Finding};
pub use error::CoreError;
pub use export::{TemplateModel, DEFAULT_MACHINE_NAME};
pub use machine::FiniteStateMachine;
pub use state::{Outputs, State, StateSet};
pub use transition::{FilterMode, Transition, TransitionSet};
