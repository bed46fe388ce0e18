//! The dispatch-driven machine runtime.

use crate::bus::Message;
use crate::channel::{Observable, Sink};
use crate::core::{ensure_valid, ConfigurationError, MachineDefinition};
use crate::engine::config::{MachineConfig, TerminalPolicy};
use crate::engine::outcome::{Outcome, Rejection, Snapshot};
use std::fmt;
use std::sync::Arc;

type BoxedSink<C> = Box<dyn Sink<Snapshot<C>, Rejection> + Send>;

/// A live state machine built from a [`MachineDefinition`].
///
/// The machine owns its current state name and context and nothing else.
/// Construction validates the definition and immediately enters the
/// initial state, running that state's `on_enter` action.
///
/// # Example
///
/// ```rust
/// use statebus::builder::MachineBuilder;
/// use statebus::Machine;
///
/// let definition = MachineBuilder::<u32, ()>::new()
///     .state("off", |s| s.initial().on("switch", |h| h.target("on").reducer(|n, _| n + 1)))
///     .state("on", |s| s.on("switch", |h| h.target("off")))
///     .build();
///
/// let mut machine = Machine::new(definition).unwrap();
/// assert_eq!(machine.state(), "off");
///
/// let snapshot = machine.dispatch("switch", None).into_result().unwrap();
/// assert_eq!(snapshot.state, "on");
/// assert_eq!(snapshot.context, 1);
///
/// let rejected = machine.dispatch("explode", None);
/// assert_eq!(
///     rejected.rejection().unwrap().to_string(),
///     "State on has no handler for event explode"
/// );
/// assert_eq!(machine.state(), "on");
/// ```
pub struct Machine<C, P = serde_json::Value> {
    definition: Arc<MachineDefinition<C, P>>,
    config: MachineConfig,
    initial: String,
    current: Snapshot<C>,
    sink: Option<BoxedSink<C>>,
}

impl<C: Clone, P> Machine<C, P> {
    /// Construct a machine with the default configuration.
    pub fn new(definition: MachineDefinition<C, P>) -> Result<Self, ConfigurationError> {
        Self::shared_with_config(Arc::new(definition), MachineConfig::default())
    }

    /// Construct a machine from a definition shared with other machines.
    pub fn shared(definition: Arc<MachineDefinition<C, P>>) -> Result<Self, ConfigurationError> {
        Self::shared_with_config(definition, MachineConfig::default())
    }

    /// Construct a machine with an explicit configuration.
    pub fn with_config(
        definition: MachineDefinition<C, P>,
        config: MachineConfig,
    ) -> Result<Self, ConfigurationError> {
        Self::shared_with_config(Arc::new(definition), config)
    }

    /// Construct a machine from a shared definition with an explicit configuration.
    pub fn shared_with_config(
        definition: Arc<MachineDefinition<C, P>>,
        config: MachineConfig,
    ) -> Result<Self, ConfigurationError> {
        let initial = ensure_valid(&definition)?;
        let context = definition.initial_context().clone();

        let mut machine = Self {
            definition,
            config,
            initial,
            current: Snapshot {
                state: String::new(),
                context,
            },
            sink: None,
        };
        // Synthetic dispatch: the empty state resolves to the initial state.
        machine.step("", None);

        Ok(machine)
    }

    /// Deliver `event` to the machine.
    ///
    /// Runs, in order: reducer, target resolution, `on_exit` of the current
    /// state, state change, `on_enter` of the new state, then notifies the
    /// subscribed sink (`next`, followed by `complete` when the new state is
    /// an exit state, or `error` on rejection).
    ///
    /// Events without a target only run their reducer and still report the
    /// (possibly unchanged) snapshot. Unknown events are rejected and leave
    /// the machine untouched.
    ///
    /// Dispatching from inside a reducer, action or sink is not supported.
    pub fn dispatch(&mut self, event: &str, payload: Option<&P>) -> Outcome<C> {
        let outcome = self.step(event, payload);
        self.emit(&outcome);
        outcome
    }

    /// Dispatch a bus message, using its type as the event name.
    pub fn send(&mut self, message: &Message<P>) -> Outcome<C> {
        self.dispatch(&message.kind, message.payload.as_ref())
    }

    /// Attach the single subscriber.
    ///
    /// The current snapshot is replayed to `sink` first (followed by
    /// `complete` if the machine already sits in an exit state), so the
    /// subscriber always observes the initial transition. Subscribing again
    /// replaces the previous sink.
    pub fn subscribe<S>(&mut self, sink: S)
    where
        S: Sink<Snapshot<C>, Rejection> + Send + 'static,
        C: Send + Sync + 'static,
    {
        let mut sink = sink;
        self.replay().subscribe(&mut sink);
        self.sink = Some(Box::new(sink));
    }

    /// Detach the subscriber, returning whether one was attached.
    pub fn unsubscribe(&mut self) -> bool {
        self.sink.take().is_some()
    }

    pub fn state(&self) -> &str {
        &self.current.state
    }

    pub fn context(&self) -> &C {
        &self.current.context
    }

    pub fn snapshot(&self) -> &Snapshot<C> {
        &self.current
    }

    /// Whether the machine sits in an exit state.
    pub fn is_terminal(&self) -> bool {
        self.definition
            .state(&self.current.state)
            .is_some_and(|state| state.is_exit())
    }

    pub fn definition(&self) -> &Arc<MachineDefinition<C, P>> {
        &self.definition
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    fn replay(&self) -> Observable<Snapshot<C>, Rejection>
    where
        C: Send + Sync + 'static,
    {
        let snapshot = self.current.clone();
        let terminal = self.is_terminal();

        Observable::new(move |sink| {
            sink.next(snapshot.clone());
            if terminal {
                sink.complete();
            }
        })
    }

    fn step(&mut self, event: &str, payload: Option<&P>) -> Outcome<C> {
        let definition = Arc::clone(&self.definition);
        let booting = self.current.state.is_empty();
        let current = definition.state(&self.current.state);

        let handler = if booting {
            None
        } else {
            if self.config.terminal_policy == TerminalPolicy::Lockout
                && current.is_some_and(|state| state.is_exit())
            {
                return reject(Rejection::Terminated {
                    state: self.current.state.clone(),
                    event: event.to_string(),
                });
            }

            match current.and_then(|state| state.handler(event)) {
                Some(handler) => Some(handler),
                None => {
                    return reject(Rejection::NoHandler {
                        state: self.current.state.clone(),
                        event: event.to_string(),
                    })
                }
            }
        };

        // Nothing is committed until the target is known to exist.
        let reduced = handler
            .and_then(|handler| handler.reducer())
            .map(|reducer| reducer(self.current.context.clone(), payload));
        let context = reduced.as_ref().unwrap_or(&self.current.context);

        let target = if booting {
            Some(self.initial.clone())
        } else {
            handler
                .and_then(|handler| handler.target())
                .map(|target| target.resolve(payload, context))
        };

        if let Some(target) = &target {
            if !definition.contains(target) {
                return reject(Rejection::UnknownTarget {
                    state: self.current.state.clone(),
                    event: event.to_string(),
                    target: target.clone(),
                });
            }
        }

        if let Some(context) = reduced {
            self.current.context = context;
        }

        match target {
            Some(target) => {
                if let Some(state) = current {
                    state.actions().exit(&self.current.context);
                }
                let from = std::mem::replace(&mut self.current.state, target);
                if let Some(state) = definition.state(&self.current.state) {
                    state.actions().enter();
                }

                if booting {
                    tracing::debug!(state = %self.current.state, "machine entered initial state");
                } else {
                    tracing::debug!(
                        from = %from,
                        to = %self.current.state,
                        event = %event,
                        "state changed"
                    );
                }
            }
            None => {
                tracing::trace!(state = %self.current.state, event = %event, "event handled in place");
            }
        }

        Outcome::Transitioned {
            snapshot: self.current.clone(),
            terminal: self.is_terminal(),
        }
    }

    fn emit(&mut self, outcome: &Outcome<C>) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        match outcome {
            Outcome::Transitioned { snapshot, terminal } => {
                sink.next(snapshot.clone());
                if *terminal {
                    sink.complete();
                }
            }
            Outcome::Rejected { reason } => sink.error(reason.clone()),
        }
    }
}

fn reject<C>(reason: Rejection) -> Outcome<C> {
    tracing::debug!(%reason, "dispatch rejected");
    Outcome::Rejected { reason }
}

impl<C: fmt::Debug, P> fmt::Debug for Machine<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("current", &self.current)
            .field("config", &self.config)
            .field("subscribed", &self.sink.is_some())
            .finish()
    }
}
