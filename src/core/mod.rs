//! Core machine definition types.
//!
//! This module contains the static, immutable side of a state machine:
//! - Machine, state and event handler definitions
//! - Transition targets, fixed or computed
//! - Construction-time validation
//! - Immutable history of state changes
//!
//! Nothing here mutates; the engine owns all runtime state.

mod definition;
mod history;
mod target;
mod validation;

pub use definition::{
    Actions, EnterAction, EventHandler, ExitAction, MachineDefinition, Reducer, StateDefinition,
};
pub use history::{StateHistory, StateTransition};
pub use target::{Target, TargetFn};
pub use validation::{validate, ConfigurationError, Violation};

pub(crate) use validation::ensure_valid;
