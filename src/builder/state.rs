//! Builder for a single state.

use crate::builder::handler::HandlerBuilder;
use crate::core::{EventHandler, StateDefinition};
use std::sync::Arc;

/// Builder for constructing a [`StateDefinition`] with a fluent API.
pub struct StateBuilder<C, P> {
    state: StateDefinition<C, P>,
}

impl<C, P> StateBuilder<C, P> {
    /// Create a new state builder: not initial, not terminal, no events.
    pub fn new() -> Self {
        Self {
            state: StateDefinition::default(),
        }
    }

    /// Mark this as the state the machine starts in.
    pub fn initial(mut self) -> Self {
        self.state.is_initial = true;
        self
    }

    /// Mark this as a terminal state.
    pub fn exit(mut self) -> Self {
        self.state.is_exit = true;
        self
    }

    /// Side effect run after the machine enters this state.
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.state.actions.on_enter = Some(Arc::new(f));
        self
    }

    /// Side effect run before the machine leaves this state.
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&C) + Send + Sync + 'static,
    {
        self.state.actions.on_exit = Some(Arc::new(f));
        self
    }

    /// Accept `event`, configuring its handler in a closure.
    pub fn on<F>(self, event: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(HandlerBuilder<C, P>) -> HandlerBuilder<C, P>,
    {
        self.handle(event, configure(HandlerBuilder::new()).build())
    }

    /// Accept `event` with a pre-built handler.
    pub fn handle(mut self, event: impl Into<String>, handler: EventHandler<C, P>) -> Self {
        self.state.events.insert(event.into(), handler);
        self
    }

    /// Build the state.
    pub fn build(self) -> StateDefinition<C, P> {
        self.state
    }
}

impl<C, P> Default for StateBuilder<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn default_state_is_plain() {
        let state: StateDefinition<(), ()> = StateBuilder::new().build();

        assert!(!state.is_initial());
        assert!(!state.is_exit());
        assert_eq!(state.events().count(), 0);
    }

    #[test]
    fn flags_are_set() {
        let state: StateDefinition<(), ()> = StateBuilder::new().initial().exit().build();

        assert!(state.is_initial());
        assert!(state.is_exit());
    }

    #[test]
    fn events_are_registered() {
        let state: StateDefinition<(), ()> = StateBuilder::new()
            .on("switch", |h| h.target("on"))
            .handle("poke", EventHandler::noop())
            .build();

        let events: Vec<&str> = state.events().map(|(name, _)| name).collect();
        assert_eq!(events, vec!["poke", "switch"]);
        assert!(state.handler("poke").unwrap().target().is_none());
    }

    #[test]
    fn later_handler_replaces_earlier() {
        let state: StateDefinition<(), ()> = StateBuilder::new()
            .on("switch", |h| h.target("on"))
            .on("switch", |h| h.target("off"))
            .build();

        let target = state.handler("switch").unwrap().target().unwrap();
        assert_eq!(target.as_fixed(), Some("off"));
    }

    #[test]
    fn actions_are_stored() {
        let entered = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&entered);

        let state: StateDefinition<u32, ()> = StateBuilder::new()
            .on_enter(move || flag.store(true, Ordering::SeqCst))
            .on_exit(|_ctx: &u32| {})
            .build();

        state.actions().enter();
        assert!(entered.load(Ordering::SeqCst));
        assert!(state.actions().on_exit.is_some());
    }
}
