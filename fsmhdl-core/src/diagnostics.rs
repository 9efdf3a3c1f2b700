//! Well-formedness report for a machine.
//!
//! Unlike the fail-fast checks on [`StateSet`](crate::StateSet) and
//! [`TransitionSet`](crate::TransitionSet), [`FiniteStateMachine::diagnose`]
//! collects every problem it finds.

use crate::arena::{Arena, StateId, TransitionId};
use crate::machine::FiniteStateMachine;
use crate::transition::FilterMode;
use serde::Serialize;
use std::fmt;

/// One problem found in a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    DuplicateName {
        name: String,
        count: usize,
    },
    MissingOutput {
        output: String,
        states: Vec<String>,
    },
    Unreachable {
        states: Vec<String>,
    },
    Unexitable {
        states: Vec<String>,
    },
    MissingDefault,
    ParallelTransitions {
        source: String,
        destination: String,
        conditions: Vec<String>,
    },
    /// Two transitions leaving `state` can fire together.
    OverlappingConditions {
        state: String,
        first: String,
        second: String,
    },
    /// No transition leaving `state` fires for some inputs.
    NonExhaustive {
        state: String,
    },
}

impl Finding {
    pub fn code(&self) -> &'static str {
        match self {
            Finding::DuplicateName { .. } => "DUPLICATE_NAME",
            Finding::MissingOutput { .. } => "MISSING_OUTPUT",
            Finding::Unreachable { .. } => "UNREACHABLE_STATE",
            Finding::Unexitable { .. } => "UNEXITABLE_STATE",
            Finding::MissingDefault => "MISSING_DEFAULT",
            Finding::ParallelTransitions { .. } => "PARALLEL_TRANSITIONS",
            Finding::OverlappingConditions { .. } => "OVERLAPPING_CONDITIONS",
            Finding::NonExhaustive { .. } => "NON_EXHAUSTIVE",
        }
    }

    /// Returns true for the per-state condition checks.
    pub fn is_condition_check(&self) -> bool {
        matches!(
            self,
            Finding::OverlappingConditions { .. } | Finding::NonExhaustive { .. }
        )
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::DuplicateName { name, count } => {
                write!(f, "state name '{}' is used {} times", name, count)
            }
            Finding::MissingOutput { output, states } => {
                write!(f, "output '{}' is missing from {}", output, states.join(", "))
            }
            Finding::Unreachable { states } => {
                write!(f, "states {} are not reachable", states.join(", "))
            }
            Finding::Unexitable { states } => {
                write!(f, "states {} are not exitable", states.join(", "))
            }
            Finding::MissingDefault => write!(f, "no default state"),
            Finding::ParallelTransitions {
                source,
                destination,
                conditions,
            } => write!(
                f,
                "{} transitions from {} to {} ({})",
                conditions.len(),
                source,
                destination,
                conditions.join("; ")
            ),
            Finding::OverlappingConditions {
                state,
                first,
                second,
            } => write!(f, "leaving {}: '{}' overlaps '{}'", state, first, second),
            Finding::NonExhaustive { state } => {
                write!(f, "leaving {}: conditions do not cover every input", state)
            }
        }
    }
}

/// Everything [`FiniteStateMachine::diagnose`] found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub findings: Vec<Finding>,
    /// Whole-set exclusivity of all transition conditions.
    pub exclusive: bool,
    /// Whole-set exhaustiveness of all transition conditions.
    pub exhaustive: bool,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

impl FiniteStateMachine {
    /// Runs every structural and condition check without failing fast.
    pub fn diagnose(&self, arena: &Arena) -> Diagnostics {
        let mut findings = Vec::new();
        let states = self.states();
        let transitions = self.transitions();

        for (name, count) in states.names(arena) {
            if count > 1 {
                findings.push(Finding::DuplicateName {
                    name: name.to_string(),
                    count,
                });
            }
        }

        let members = states.len();
        for (output, count) in states.outputs(arena) {
            if count != members {
                let lacking = states
                    .iter()
                    .filter(|&id| arena[id].outputs().get(output).is_none())
                    .map(|id| arena[id].name().to_string())
                    .collect();
                findings.push(Finding::MissingOutput {
                    output: output.to_string(),
                    states: lacking,
                });
            }
        }

        let sources = transitions.sources(arena);
        let destinations = transitions.destinations(arena);
        let unreachable = names(arena, sources.difference(&destinations).iter());
        if !unreachable.is_empty() {
            findings.push(Finding::Unreachable {
                states: unreachable,
            });
        }
        let unexitable = names(arena, destinations.difference(&sources).iter());
        if !unexitable.is_empty() {
            findings.push(Finding::Unexitable { states: unexitable });
        }

        if self.default_state().is_none() {
            findings.push(Finding::MissingDefault);
        }

        let mut parallel: Vec<Vec<TransitionId>> = Vec::new();
        for (a, b) in transitions.parallel_pairs(arena) {
            match parallel.iter_mut().find(|group| group.contains(&a)) {
                Some(group) => {
                    if !group.contains(&b) {
                        group.push(b);
                    }
                }
                None => parallel.push(vec![a, b]),
            }
        }
        for group in parallel {
            let first = &arena[group[0]];
            findings.push(Finding::ParallelTransitions {
                source: arena[first.source()].name().to_string(),
                destination: arena[first.destination()].name().to_string(),
                conditions: group
                    .iter()
                    .map(|&id| arena[id].condition().to_string())
                    .collect(),
            });
        }

        for state in states.iter() {
            let leaving = transitions.from_states(arena, Some(state), None, FilterMode::And);
            if leaving.is_empty() {
                continue;
            }
            let name = arena[state].name();
            let conditions = leaving.conditions(arena);
            let members: Vec<_> = conditions.iter().collect();
            for (i, j) in conditions.overlapping_pairs() {
                findings.push(Finding::OverlappingConditions {
                    state: name.to_string(),
                    first: members[i].to_string(),
                    second: members[j].to_string(),
                });
            }
            if !conditions.is_exhaustive() {
                findings.push(Finding::NonExhaustive {
                    state: name.to_string(),
                });
            }
        }

        let diagnostics = Diagnostics {
            findings,
            exclusive: transitions.is_exclusive(arena),
            exhaustive: transitions.is_exhaustive(arena),
        };
        tracing::debug!(
            findings = diagnostics.findings.len(),
            exclusive = diagnostics.exclusive,
            exhaustive = diagnostics.exhaustive,
            "diagnosed machine"
        );
        diagnostics
    }
}

fn names(arena: &Arena, ids: impl Iterator<Item = StateId>) -> Vec<String> {
    ids.map(|id| arena[id].name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::state::State;
    use crate::transition::Transition;

    struct Builder {
        arena: Arena,
        fsm: FiniteStateMachine,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                arena: Arena::new(),
                fsm: FiniteStateMachine::new(),
            }
        }

        fn state(&mut self, name: &str, outputs: &[(&str, u8)], default: bool) -> StateId {
            let mut state = State::new(name).unwrap();
            for (output, value) in outputs {
                state = state.with_output(*output, *value).unwrap();
            }
            let id = self.arena.add_state(state);
            self.fsm.add_state(&mut self.arena, id, default).unwrap();
            id
        }

        fn connect(&mut self, from: StateId, to: StateId, condition: &str) {
            let t = Transition::new(from, to, Condition::parse(condition).unwrap());
            let id = self.arena.add_transition(t).unwrap();
            self.fsm.add_transition(&self.arena, id).unwrap();
        }
    }

    #[test]
    fn test_complete_machine_is_clean() {
        let mut b = Builder::new();
        let s0 = b.state("s0", &[("u", 0), ("v", 0)], true);
        let s1 = b.state("s1", &[("u", 1), ("v", 0)], false);
        b.connect(s0, s0, "x");
        b.connect(s0, s1, "~x");
        b.connect(s1, s0, "x&~y");
        b.connect(s1, s1, "~x|y");

        let report = b.fsm.diagnose(&b.arena);
        assert!(report.is_clean(), "{:?}", report.findings);
        // whole-set checks mix the two states' conditions
        assert!(!report.exclusive);
        assert!(report.exhaustive);
    }

    #[test]
    fn test_structural_findings() {
        let mut b = Builder::new();
        let s0 = b.state("s0", &[("u", 0)], false);
        let s1 = b.state("s1", &[], false);
        let s2 = b.state("s1", &[("u", 1)], false);
        b.connect(s0, s1, "TRUE");
        b.connect(s1, s2, "TRUE");

        let report = b.fsm.diagnose(&b.arena);
        let codes: Vec<&str> = report.findings.iter().map(Finding::code).collect();
        assert_eq!(
            codes,
            vec![
                "DUPLICATE_NAME",
                "MISSING_OUTPUT",
                "UNREACHABLE_STATE",
                "UNEXITABLE_STATE",
                "MISSING_DEFAULT"
            ]
        );
        assert_eq!(
            report.findings[1],
            Finding::MissingOutput {
                output: "u".into(),
                states: vec!["s1".into()],
            }
        );
        assert_eq!(report.findings[2].to_string(), "states s0 are not reachable");
    }

    #[test]
    fn test_per_state_condition_findings() {
        let mut b = Builder::new();
        let s0 = b.state("s0", &[], true);
        let s1 = b.state("s1", &[], false);
        b.connect(s0, s1, "x");
        b.connect(s0, s1, "x & y");
        b.connect(s1, s0, "y");

        let report = b.fsm.diagnose(&b.arena);
        assert!(report.findings.contains(&Finding::ParallelTransitions {
            source: "s0".into(),
            destination: "s1".into(),
            conditions: vec!["x".into(), "x & y".into()],
        }));
        assert!(report.findings.contains(&Finding::OverlappingConditions {
            state: "s0".into(),
            first: "x".into(),
            second: "x & y".into(),
        }));
        assert!(report.findings.contains(&Finding::NonExhaustive { state: "s0".into() }));
        assert!(report.findings.contains(&Finding::NonExhaustive { state: "s1".into() }));
        assert!(report.findings.iter().filter(|f| f.is_condition_check()).count() >= 3);
    }

    #[test]
    fn test_findings_serialize_with_kind() {
        let json = serde_json::to_value(Finding::NonExhaustive { state: "s0".into() }).unwrap();
        assert_eq!(json["kind"], "non_exhaustive");
        assert_eq!(json["state"], "s0");
        let json = serde_json::to_value(Finding::MissingDefault).unwrap();
        assert_eq!(json["kind"], "missing_default");
    }
}
