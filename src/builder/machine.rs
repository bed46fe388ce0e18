//! Builder for complete machine definitions.

use crate::builder::state::StateBuilder;
use crate::core::{MachineDefinition, StateDefinition};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Builder for constructing a [`MachineDefinition`] with a fluent API.
///
/// Building never fails; the definition is validated when a
/// [`Machine`](crate::Machine) is constructed from it.
///
/// # Example
///
/// ```rust
/// use statebus::builder::MachineBuilder;
///
/// let definition = MachineBuilder::<u32, ()>::new()
///     .state("off", |s| s.initial().on("switch", |h| h.target("on").reducer(|n, _| n + 1)))
///     .state("on", |s| s.on("switch", |h| h.target("off")))
///     .build();
///
/// assert_eq!(definition.initial_state(), Some("off"));
/// assert_eq!(*definition.initial_context(), 0);
/// ```
pub struct MachineBuilder<C, P = serde_json::Value> {
    initial_context: C,
    states: BTreeMap<String, StateDefinition<C, P>>,
}

impl<C: Default, P> MachineBuilder<C, P> {
    /// Create a new builder starting from `C::default()`.
    ///
    /// For a `serde_json::Value` context that default is `null`; use
    /// [`MachineBuilder::with_empty_object`] to start from `{}` instead.
    pub fn new() -> Self {
        Self::with_context(C::default())
    }
}

impl<P> MachineBuilder<Value, P> {
    /// Create a builder for a JSON context starting from an empty object.
    ///
    /// # Example
    ///
    /// ```rust
    /// use serde_json::json;
    /// use statebus::builder::MachineBuilder;
    ///
    /// let definition = MachineBuilder::<serde_json::Value, ()>::with_empty_object()
    ///     .state("idle", |s| s.initial())
    ///     .build();
    ///
    /// assert_eq!(*definition.initial_context(), json!({}));
    /// ```
    pub fn with_empty_object() -> Self {
        Self::with_context(Value::Object(Map::new()))
    }
}

impl<C, P> MachineBuilder<C, P> {
    /// Create a new builder with an explicit initial context.
    pub fn with_context(initial_context: C) -> Self {
        Self {
            initial_context,
            states: BTreeMap::new(),
        }
    }

    /// Replace the initial context.
    pub fn initial_context(mut self, context: C) -> Self {
        self.initial_context = context;
        self
    }

    /// Add a state, configuring it in a closure.
    ///
    /// A second state with the same name replaces the first.
    pub fn state<F>(self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StateBuilder<C, P>) -> StateBuilder<C, P>,
    {
        self.add_state(name, configure(StateBuilder::new()).build())
    }

    /// Add a pre-built state.
    pub fn add_state(mut self, name: impl Into<String>, state: StateDefinition<C, P>) -> Self {
        self.states.insert(name.into(), state);
        self
    }

    /// Build the definition.
    pub fn build(self) -> MachineDefinition<C, P> {
        MachineDefinition {
            initial_context: self.initial_context,
            states: self.states,
        }
    }
}

impl<C: Default, P> Default for MachineBuilder<C, P> {
    fn default() -> Self {
        Self::new()
    }
}
