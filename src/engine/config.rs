//! Runtime configuration of a machine.

use serde::{Deserialize, Serialize};

/// What happens to dispatches after the machine reached an exit state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
    /// Exit states keep handling the events they declare.
    #[default]
    Permit,

    /// Every dispatch after reaching an exit state is rejected.
    Lockout,
}

/// Machine configuration. Missing fields take their defaults.
///
/// # Example
///
/// ```rust
/// use statebus::{MachineConfig, TerminalPolicy};
///
/// let config = MachineConfig::from_json(r#"{ "terminal_policy": "lockout" }"#).unwrap();
/// assert_eq!(config.terminal_policy, TerminalPolicy::Lockout);
///
/// let config = MachineConfig::from_json("{}").unwrap();
/// assert_eq!(config.terminal_policy, TerminalPolicy::Permit);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub terminal_policy: TerminalPolicy,
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the terminal policy.
    pub fn terminal_policy(mut self, policy: TerminalPolicy) -> Self {
        self.terminal_policy = policy;
        self
    }
}
