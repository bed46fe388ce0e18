//! Construction-time validation of machine definitions.
//!
//! Validation accumulates every violation instead of stopping at the
//! first one, so a broken definition is reported in a single pass.

use super::definition::MachineDefinition;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single problem found in a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("No initial state defined")]
    NoInitialState,

    #[error("Multiple initial states defined: {}", .states.join(", "))]
    MultipleInitialStates { states: Vec<String> },

    #[error("State {state} routes event {event} to unknown state {target}")]
    UnknownTarget {
        state: String,
        event: String,
        target: String,
    },
}

/// Fatal error raised when a machine is constructed from an invalid definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", describe(.violations))]
pub struct ConfigurationError {
    violations: Vec<Violation>,
}

impl ConfigurationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

type Check = Validation<(), NonEmptyVec<Violation>>;

/// Check a definition, collecting ALL violations.
pub fn validate<C, P>(definition: &MachineDefinition<C, P>) -> Check {
    let mut checks: Vec<Check> = vec![check_initial(definition)];
    checks.extend(check_targets(definition));

    Validation::all_vec(checks).map(|_| ())
}

/// Validate for construction, returning the name of the initial state.
pub(crate) fn ensure_valid<C, P>(
    definition: &MachineDefinition<C, P>,
) -> Result<String, ConfigurationError> {
    match (validate(definition), definition.initial_state()) {
        (Validation::Success(_), Some(initial)) => Ok(initial.to_string()),
        (Validation::Success(_), None) => Err(ConfigurationError {
            violations: vec![Violation::NoInitialState],
        }),
        (Validation::Failure(errors), _) => Err(ConfigurationError {
            violations: errors.iter().cloned().collect(),
        }),
    }
}

fn check_initial<C, P>(definition: &MachineDefinition<C, P>) -> Check {
    let initial: Vec<String> = definition
        .states()
        .filter(|(_, state)| state.is_initial())
        .map(|(name, _)| name.to_string())
        .collect();

    match initial.len() {
        0 => Validation::fail(Violation::NoInitialState),
        1 => Validation::success(()),
        _ => Validation::fail(Violation::MultipleInitialStates { states: initial }),
    }
}

fn check_targets<C, P>(definition: &MachineDefinition<C, P>) -> Vec<Check> {
    definition
        .states()
        .flat_map(move |(state, def)| {
            def.events().filter_map(move |(event, handler)| {
                let target = handler.target()?.as_fixed()?;
                (!definition.contains(target)).then(|| {
                    Validation::fail(Violation::UnknownTarget {
                        state: state.to_string(),
                        event: event.to_string(),
                        target: target.to_string(),
                    })
                })
            })
        })
        .collect()
}
