//! Directory of entity receptors.

use super::message::Message;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback receiving `(sender_id, message)` for one registered entity.
pub type Receptor<P> = Arc<dyn Fn(&str, &Message<P>) + Send + Sync>;

/// In-process message router keyed by entity id.
///
/// The bus is an ordinary value owned by the host application and handed
/// to every entity that should be reachable. Delivery is synchronous and
/// best effort: no queuing, no retries, no confirmation.
///
/// # Example
///
/// ```rust
/// use statebus::bus::{Bus, Message};
/// use std::sync::{Arc, Mutex};
///
/// let bus: Bus<()> = Bus::new();
/// let inbox = Arc::new(Mutex::new(Vec::new()));
/// let sink = inbox.clone();
///
/// bus.register("printer", move |sender: &str, message: &Message<()>| {
///     sink.lock().unwrap().push(format!("{} from {}", message.kind, sender));
/// });
///
/// bus.send("desk", "printer", &Message::new("print"));
/// bus.send("desk", "nobody", &Message::new("print"));
///
/// assert_eq!(*inbox.lock().unwrap(), vec!["print from desk".to_string()]);
/// ```
pub struct Bus<P = serde_json::Value> {
    directory: RwLock<HashMap<String, Receptor<P>>>,
}

impl<P> Bus<P> {
    pub fn new() -> Self {
        Self {
            directory: RwLock::new(HashMap::new()),
        }
    }

    /// Register `receptor` under `id`.
    ///
    /// Registering an existing id replaces its receptor. Returns whether a
    /// previous receptor was replaced.
    pub fn register<F>(&self, id: impl Into<String>, receptor: F) -> bool
    where
        F: Fn(&str, &Message<P>) + Send + Sync + 'static,
    {
        self.register_receptor(id, Arc::new(receptor))
    }

    /// Register an already shared receptor under `id`.
    ///
    /// Keeping a clone of `receptor` lets the owner later remove exactly
    /// this registration with [`Bus::deregister_if`].
    pub fn register_receptor(&self, id: impl Into<String>, receptor: Receptor<P>) -> bool {
        let id = id.into();
        let replaced = self
            .directory
            .write()
            .insert(id.clone(), receptor)
            .is_some();

        tracing::debug!(entity = %id, replaced, "entity registered");
        replaced
    }

    /// Remove `id` from the directory. Returns whether it was registered.
    pub fn deregister(&self, id: &str) -> bool {
        let removed = self.directory.write().remove(id).is_some();
        if removed {
            tracing::debug!(entity = %id, "entity deregistered");
        }
        removed
    }

    /// Remove `id` only while it still maps to `receptor`.
    ///
    /// A registration that has since been replaced under the same id is
    /// left alone. Returns whether an entry was removed.
    pub fn deregister_if(&self, id: &str, receptor: &Receptor<P>) -> bool {
        let mut directory = self.directory.write();
        let owned = directory
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, receptor));
        if owned {
            directory.remove(id);
            tracing::debug!(entity = %id, "entity deregistered");
        } else {
            tracing::trace!(entity = %id, "registration no longer owned, keeping entry");
        }
        owned
    }

    /// Deliver `message` from `sender` to `recipient`.
    ///
    /// Unknown recipients are silently ignored. The receptor runs after the
    /// directory lock is released, so it may itself send or register.
    pub fn send(&self, sender: &str, recipient: &str, message: &Message<P>) {
        let receptor = self.directory.read().get(recipient).cloned();

        match receptor {
            Some(receptor) => {
                tracing::trace!(sender, recipient, kind = %message.kind, "delivering message");
                receptor(sender, message);
            }
            None => {
                tracing::trace!(sender, recipient, kind = %message.kind, "no such recipient");
            }
        }
    }

    /// Snapshot of the directory.
    pub fn entities(&self) -> HashMap<String, Receptor<P>> {
        self.directory.read().clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.directory.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.directory.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.read().is_empty()
    }
}

impl<P> Default for Bus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Bus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<String> = self.directory.read().keys().cloned().collect();
        ids.sort();
        f.debug_struct("Bus").field("entities", &ids).finish()
    }
}
