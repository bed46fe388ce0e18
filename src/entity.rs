//! Entities: a machine with a bus address and a mailbox.
//!
//! Messages delivered through the bus are queued in the entity's mailbox
//! and only reach the machine when [`Entity::update`] drains it. After each
//! accepted message an optional outbox function may produce messages for
//! other entities, which are sent through the bus.

use crate::bus::{Bus, Envelope, Message, Outbound, Receptor};
use crate::core::{ConfigurationError, MachineDefinition, StateHistory, StateTransition};
use crate::engine::{Machine, MachineConfig, Outcome, Snapshot};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

type Mailbox<P> = Arc<Mutex<VecDeque<Envelope<P>>>>;

/// Number of state changes an entity keeps unless told otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Produces outbound messages from an accepted message and the resulting snapshot.
pub type OutboxFn<C, P> = Box<dyn Fn(&Envelope<P>, &Snapshot<C>) -> Vec<Outbound<P>> + Send + Sync>;

/// A machine registered on a bus.
///
/// # Example
///
/// ```rust
/// use statebus::builder::MachineBuilder;
/// use statebus::bus::{Bus, Message};
/// use statebus::Entity;
/// use std::sync::Arc;
///
/// let bus: Arc<Bus<()>> = Arc::new(Bus::new());
/// let definition = MachineBuilder::<(), ()>::new()
///     .state("off", |s| s.initial().on("switch", |h| h.target("on")))
///     .state("on", |s| s.on("switch", |h| h.target("off")))
///     .build();
///
/// let mut lamp = Entity::with_id("lamp", definition, bus.clone()).unwrap();
///
/// bus.send("wall", "lamp", &Message::new("switch"));
/// assert_eq!(lamp.pending(), 1);
///
/// lamp.update();
/// assert_eq!(lamp.snapshot().state, "on");
/// ```
pub struct Entity<C, P = serde_json::Value> {
    id: String,
    mailbox: Mailbox<P>,
    receptor: Receptor<P>,
    machine: Machine<C, P>,
    bus: Arc<Bus<P>>,
    outbox: Option<OutboxFn<C, P>>,
    history: StateHistory,
    history_limit: usize,
}

impl<C, P> Entity<C, P>
where
    C: Clone,
    P: Clone + Send + 'static,
{
    /// Create an entity with a random id and register it on `bus`.
    pub fn new(
        definition: MachineDefinition<C, P>,
        bus: Arc<Bus<P>>,
    ) -> Result<Self, ConfigurationError> {
        Self::with_id(Uuid::new_v4().to_string(), definition, bus)
    }

    /// Create an entity with a chosen id and register it on `bus`.
    pub fn with_id(
        id: impl Into<String>,
        definition: MachineDefinition<C, P>,
        bus: Arc<Bus<P>>,
    ) -> Result<Self, ConfigurationError> {
        Self::from_machine(id, Machine::new(definition)?, bus)
    }

    /// Create an entity around a shared definition and explicit configuration.
    pub fn shared(
        id: impl Into<String>,
        definition: Arc<MachineDefinition<C, P>>,
        config: MachineConfig,
        bus: Arc<Bus<P>>,
    ) -> Result<Self, ConfigurationError> {
        Self::from_machine(id, Machine::shared_with_config(definition, config)?, bus)
    }

    fn from_machine(
        id: impl Into<String>,
        machine: Machine<C, P>,
        bus: Arc<Bus<P>>,
    ) -> Result<Self, ConfigurationError> {
        let id = id.into();
        let mailbox: Mailbox<P> = Arc::default();

        let inbox = Arc::clone(&mailbox);
        let receptor: Receptor<P> = Arc::new(move |sender: &str, message: &Message<P>| {
            inbox.lock().push_back(Envelope {
                sender: sender.to_string(),
                message: message.clone(),
            });
        });
        bus.register_receptor(id.clone(), Arc::clone(&receptor));

        Ok(Self {
            id,
            mailbox,
            receptor,
            machine,
            bus,
            outbox: None,
            history: StateHistory::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    /// Attach the function producing outbound messages.
    pub fn with_outbox<F>(mut self, outbox: F) -> Self
    where
        F: Fn(&Envelope<P>, &Snapshot<C>) -> Vec<Outbound<P>> + Send + Sync + 'static,
    {
        self.outbox = Some(Box::new(outbox));
        self
    }

    /// Keep at most `limit` state changes, dropping the oldest first.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn machine(&self) -> &Machine<C, P> {
        &self.machine
    }

    pub fn snapshot(&self) -> &Snapshot<C> {
        self.machine.snapshot()
    }

    /// The most recent state changes made while draining the mailbox.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Number of queued messages.
    pub fn pending(&self) -> usize {
        self.mailbox.lock().len()
    }

    /// Queue a message directly, bypassing the bus.
    pub fn receive(&self, sender: &str, message: Message<P>) {
        self.mailbox.lock().push_back(Envelope {
            sender: sender.to_string(),
            message,
        });
    }

    /// Send a message to another entity through the bus.
    pub fn send(&self, recipient: &str, message: &Message<P>) {
        self.bus.send(&self.id, recipient, message);
    }

    /// Drain the mailbox, dispatching each message in arrival order.
    ///
    /// Messages arriving while draining (for example replies to this
    /// entity's own outbound messages) wait for the next call.
    pub fn update(&mut self) -> Vec<Outcome<C>> {
        let queued: Vec<Envelope<P>> = self.mailbox.lock().drain(..).collect();
        let mut outcomes = Vec::with_capacity(queued.len());

        for envelope in queued {
            let from = self.machine.state().to_string();
            let outcome = self.machine.send(&envelope.message);

            if let Some(snapshot) = outcome.snapshot() {
                if snapshot.state != from {
                    let transition = StateTransition {
                        from,
                        to: snapshot.state.clone(),
                        event: envelope.message.kind.clone(),
                        timestamp: Utc::now(),
                    };
                    self.history.push_bounded(transition, self.history_limit);
                }

                if let Some(outbox) = &self.outbox {
                    for outbound in outbox(&envelope, snapshot) {
                        self.bus.send(&self.id, &outbound.recipient, &outbound.message);
                    }
                }
            } else if let Some(reason) = outcome.rejection() {
                tracing::debug!(
                    entity = %self.id,
                    sender = %envelope.sender,
                    %reason,
                    "message rejected"
                );
            }

            outcomes.push(outcome);
        }

        outcomes
    }
}

impl<C, P> Drop for Entity<C, P> {
    fn drop(&mut self) {
        // A newer entity may have taken over the id; leave its receptor in place.
        self.bus.deregister_if(&self.id, &self.receptor);
    }
}

impl<C: fmt::Debug, P> fmt::Debug for Entity<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("machine", &self.machine)
            .field("pending", &self.mailbox.lock().len())
            .finish()
    }
}
