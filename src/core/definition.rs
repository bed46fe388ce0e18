//! Static machine definitions.
//!
//! A definition is supplied once and never mutated. It describes the states,
//! which events each state accepts, where those events lead, how they
//! rewrite the context, and which side effects run on entry and exit.

use super::target::Target;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Pure function computing the next context from the current one and a payload.
pub type Reducer<C, P> = Arc<dyn Fn(C, Option<&P>) -> C + Send + Sync>;

/// Side effect run when a state is entered.
pub type EnterAction = Arc<dyn Fn() + Send + Sync>;

/// Side effect run when a state is left. Receives a read-only view of the context.
pub type ExitAction<C> = Arc<dyn Fn(&C) + Send + Sync>;

/// How a state reacts to one event.
///
/// Without a target the event is a context-only update: the reducer (if any)
/// runs and the state stays put, with no lifecycle actions.
pub struct EventHandler<C, P> {
    pub(crate) target: Option<Target<C, P>>,
    pub(crate) reducer: Option<Reducer<C, P>>,
}

impl<C, P> EventHandler<C, P> {
    /// A handler that accepts the event and changes nothing.
    pub fn noop() -> Self {
        Self {
            target: None,
            reducer: None,
        }
    }

    pub fn target(&self) -> Option<&Target<C, P>> {
        self.target.as_ref()
    }

    pub fn reducer(&self) -> Option<&Reducer<C, P>> {
        self.reducer.as_ref()
    }
}

impl<C, P> Clone for EventHandler<C, P> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            reducer: self.reducer.clone(),
        }
    }
}

impl<C, P> fmt::Debug for EventHandler<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("target", &self.target)
            .field("reducer", &self.reducer.is_some())
            .finish()
    }
}

/// Entry and exit side effects of a state.
pub struct Actions<C> {
    pub(crate) on_enter: Option<EnterAction>,
    pub(crate) on_exit: Option<ExitAction<C>>,
}

impl<C> Actions<C> {
    pub(crate) fn enter(&self) {
        if let Some(on_enter) = &self.on_enter {
            on_enter();
        }
    }

    pub(crate) fn exit(&self, context: &C) {
        if let Some(on_exit) = &self.on_exit {
            on_exit(context);
        }
    }
}

impl<C> Default for Actions<C> {
    fn default() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
        }
    }
}

impl<C> Clone for Actions<C> {
    fn clone(&self) -> Self {
        Self {
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

/// One named state of a machine.
pub struct StateDefinition<C, P> {
    pub(crate) is_initial: bool,
    pub(crate) is_exit: bool,
    pub(crate) actions: Actions<C>,
    pub(crate) events: BTreeMap<String, EventHandler<C, P>>,
}

impl<C, P> StateDefinition<C, P> {
    /// Whether the machine starts in this state.
    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    /// Whether this state is terminal.
    pub fn is_exit(&self) -> bool {
        self.is_exit
    }

    /// The handler registered for `event`, if the state accepts it.
    pub fn handler(&self, event: &str) -> Option<&EventHandler<C, P>> {
        self.events.get(event)
    }

    /// All accepted events, ordered by name.
    pub fn events(&self) -> impl Iterator<Item = (&str, &EventHandler<C, P>)> {
        self.events.iter().map(|(name, handler)| (name.as_str(), handler))
    }

    pub(crate) fn actions(&self) -> &Actions<C> {
        &self.actions
    }
}

impl<C, P> Default for StateDefinition<C, P> {
    fn default() -> Self {
        Self {
            is_initial: false,
            is_exit: false,
            actions: Actions::default(),
            events: BTreeMap::new(),
        }
    }
}

impl<C, P> Clone for StateDefinition<C, P> {
    fn clone(&self) -> Self {
        Self {
            is_initial: self.is_initial,
            is_exit: self.is_exit,
            actions: self.actions.clone(),
            events: self.events.clone(),
        }
    }
}

impl<C, P> fmt::Debug for StateDefinition<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDefinition")
            .field("is_initial", &self.is_initial)
            .field("is_exit", &self.is_exit)
            .field("on_enter", &self.actions.on_enter.is_some())
            .field("on_exit", &self.actions.on_exit.is_some())
            .field("events", &self.events)
            .finish()
    }
}

/// Complete, immutable description of a state machine.
///
/// `C` is the context type, `P` the event payload type. Build one with
/// [`MachineBuilder`](crate::builder::MachineBuilder).
pub struct MachineDefinition<C, P = serde_json::Value> {
    pub(crate) initial_context: C,
    pub(crate) states: BTreeMap<String, StateDefinition<C, P>>,
}

impl<C, P> MachineDefinition<C, P> {
    pub fn initial_context(&self) -> &C {
        &self.initial_context
    }

    /// Look up a state by name.
    pub fn state(&self, name: &str) -> Option<&StateDefinition<C, P>> {
        self.states.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// All states, ordered by name.
    pub fn states(&self) -> impl Iterator<Item = (&str, &StateDefinition<C, P>)> {
        self.states.iter().map(|(name, state)| (name.as_str(), state))
    }

    /// Name of the first state flagged as initial.
    ///
    /// Validation guarantees there is exactly one for any definition a
    /// machine was constructed from.
    pub fn initial_state(&self) -> Option<&str> {
        self.states()
            .find(|(_, state)| state.is_initial)
            .map(|(name, _)| name)
    }
}

impl<C: Clone, P> Clone for MachineDefinition<C, P> {
    fn clone(&self) -> Self {
        Self {
            initial_context: self.initial_context.clone(),
            states: self.states.clone(),
        }
    }
}

impl<C: fmt::Debug, P> fmt::Debug for MachineDefinition<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("initial_context", &self.initial_context)
            .field("states", &self.states)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn two_states() -> MachineDefinition<u32, ()> {
        let mut off = StateDefinition::default();
        off.is_initial = true;
        off.events.insert(
            "switch".to_string(),
            EventHandler {
                target: Some(Target::fixed("on")),
                reducer: Some(Arc::new(|count: u32, _: Option<&()>| count + 1)),
            },
        );

        let mut states = BTreeMap::new();
        states.insert("off".to_string(), off);
        states.insert("on".to_string(), StateDefinition::default());

        MachineDefinition {
            initial_context: 0,
            states,
        }
    }

    #[test]
    fn initial_state_is_found() {
        let definition = two_states();
        assert_eq!(definition.initial_state(), Some("off"));
    }

    #[test]
    fn initial_state_is_none_without_flag() {
        let mut definition = two_states();
        definition.states.values_mut().for_each(|s| s.is_initial = false);
        assert_eq!(definition.initial_state(), None);
    }

    #[test]
    fn handler_lookup() {
        let definition = two_states();
        let off = definition.state("off").unwrap();

        assert!(off.handler("switch").is_some());
        assert!(off.handler("missing").is_none());
        assert!(definition.state("on").unwrap().handler("switch").is_none());
        assert!(definition.contains("on"));
        assert!(!definition.contains("nowhere"));
    }

    #[test]
    fn noop_handler_has_nothing() {
        let handler: EventHandler<u32, ()> = EventHandler::noop();
        assert!(handler.target().is_none());
        assert!(handler.reducer().is_none());
    }

    #[test]
    fn actions_run_callbacks() {
        let entered = Arc::new(AtomicUsize::new(0));
        let exited = Arc::new(AtomicUsize::new(0));
        let e = Arc::clone(&entered);
        let x = Arc::clone(&exited);

        let actions: Actions<u32> = Actions {
            on_enter: Some(Arc::new(move || {
                e.fetch_add(1, Ordering::SeqCst);
            })),
            on_exit: Some(Arc::new(move |ctx: &u32| {
                x.fetch_add(*ctx as usize, Ordering::SeqCst);
            })),
        };

        actions.enter();
        actions.exit(&5);

        assert_eq!(entered.load(Ordering::SeqCst), 1);
        assert_eq!(exited.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn missing_actions_are_silent() {
        let actions: Actions<u32> = Actions::default();
        actions.enter();
        actions.exit(&1);
    }

    #[test]
    fn clone_shares_reducers() {
        let definition = two_states();
        let cloned = definition.clone();

        let a = definition.state("off").unwrap().handler("switch").unwrap();
        let b = cloned.state("off").unwrap().handler("switch").unwrap();
        assert!(Arc::ptr_eq(a.reducer().unwrap(), b.reducer().unwrap()));
    }
}
