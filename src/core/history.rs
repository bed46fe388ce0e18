//! State change history.
//!
//! Provides immutable tracking of the state changes an entity's machine
//! went through, following functional programming principles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state change.
///
/// # Example
///
/// ```rust
/// use statebus::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "off".to_string(),
///     to: "on".to_string(),
///     event: "switch".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.event, "switch");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left
    pub from: String,
    /// The state being entered
    pub to: String,
    /// The event that caused the change
    pub event: String,
    /// When the change occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state changes.
///
/// `record` returns a new history with the transition added. Long-lived
/// owners use `push_bounded` instead, which appends in place and drops
/// the oldest entries beyond a limit.
///
/// # Example
///
/// ```rust
/// use statebus::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: "off".to_string(),
///         to: "on".to_string(),
///         event: "switch".to_string(),
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: "on".to_string(),
///         to: "off".to_string(),
///         event: "switch".to_string(),
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec!["off", "on", "off"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append a transition in place, keeping at most the newest `limit` entries.
    ///
    /// For owners that record continuously; nothing is cloned.
    pub fn push_bounded(&mut self, transition: StateTransition, limit: usize) {
        self.transitions.push(transition);
        if self.transitions.len() > limit {
            let excess = self.transitions.len() - limit;
            self.transitions.drain(..excess);
        }
    }

    /// Get the path of states traversed: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(from: &str, to: &str) -> StateTransition {
        StateTransition {
            from: from.to_string(),
            to: to.to_string(),
            event: "switch".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(change("off", "on"));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn push_bounded_keeps_newest_entries() {
        let mut history = StateHistory::new();
        for i in 0..10 {
            history.push_bounded(change(&format!("s{}", i), &format!("s{}", i + 1)), 3);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.get_path(), vec!["s7", "s8", "s9", "s10"]);
    }

    #[test]
    fn push_bounded_with_zero_limit_keeps_nothing() {
        let mut history = StateHistory::new();
        history.push_bounded(change("off", "on"), 0);

        assert!(history.is_empty());
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let history = StateHistory::new()
            .record(change("idle", "running"))
            .record(change("running", "done"));

        assert_eq!(history.get_path(), vec!["idle", "running", "done"]);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let history = StateHistory::new().record(change("off", "on"));

        std::thread::sleep(Duration::from_millis(10));

        let history = history.record(change("on", "off"));

        let duration = history.duration().unwrap();
        assert!(duration >= Duration::from_millis(10));
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let history = StateHistory::new().record(change("off", "on"));
        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(change("off", "on"));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(history, deserialized);
    }
}
