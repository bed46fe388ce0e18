//! Results of a dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The machine's observable state: current state name plus context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<C> {
    pub state: String,
    pub context: C,
}

/// Why a dispatch was refused.
///
/// A rejected dispatch leaves state and context exactly as they were.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("State {state} has no handler for event {event}")]
    NoHandler { state: String, event: String },

    #[error("State {state} is terminal and cannot handle event {event}")]
    Terminated { state: String, event: String },

    #[error("Event {event} in state {state} resolved to unknown state {target}")]
    UnknownTarget {
        state: String,
        event: String,
        target: String,
    },
}

/// Result of a single dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<C> {
    /// The event was handled. `snapshot` is the machine after the dispatch,
    /// even if nothing changed; `terminal` is set when it sits in an exit state.
    Transitioned { snapshot: Snapshot<C>, terminal: bool },

    /// The event was refused.
    Rejected { reason: Rejection },
}

impl<C> Outcome<C> {
    pub fn snapshot(&self) -> Option<&Snapshot<C>> {
        match self {
            Outcome::Transitioned { snapshot, .. } => Some(snapshot),
            Outcome::Rejected { .. } => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Transitioned { .. } => None,
            Outcome::Rejected { reason } => Some(reason),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected { .. })
    }

    /// Whether the dispatch left the machine in an exit state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Transitioned { terminal: true, .. })
    }

    /// Convert into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<Snapshot<C>, Rejection> {
        match self {
            Outcome::Transitioned { snapshot, .. } => Ok(snapshot),
            Outcome::Rejected { reason } => Err(reason),
        }
    }
}
