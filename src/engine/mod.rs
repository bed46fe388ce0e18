//! The machine runtime.
//!
//! This module turns a static [`MachineDefinition`](crate::core::MachineDefinition)
//! into a live object:
//!
//! - **Machine**: owns the current state and context, resolves transitions
//! - **Outcome**: what a single dispatch produced, returned directly
//! - **Config**: runtime policies such as behaviour after an exit state
//!
//! Every dispatch runs to completion synchronously. Reducers and target
//! functions are expected to be pure; if one panics the panic propagates
//! and the machine keeps its previous state and context.

mod config;
mod machine;
mod outcome;

pub use config::{MachineConfig, TerminalPolicy};
pub use machine::Machine;
pub use outcome::{Outcome, Rejection, Snapshot};
