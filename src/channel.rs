//! Push-based notification primitive.
//!
//! An [`Observable`] wraps a producer that is handed a [`Sink`] when someone
//! subscribes. There is no buffering and no multicast: every call to
//! `subscribe` re-runs the producer against that one sink.

use parking_lot::Mutex;
use std::sync::Arc;

/// Receiver of `next`/`error`/`complete` notifications.
pub trait Sink<T, E> {
    /// A new value was produced.
    fn next(&mut self, value: T);

    /// The producer reports a recoverable failure.
    fn error(&mut self, reason: E);

    /// The producer will emit nothing further of interest.
    fn complete(&mut self);
}

/// One notification delivered to a sink.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification<T, E> {
    Next(T),
    Error(E),
    Complete,
}

impl<T, E> Sink<T, E> for Vec<Notification<T, E>> {
    fn next(&mut self, value: T) {
        self.push(Notification::Next(value));
    }

    fn error(&mut self, reason: E) {
        self.push(Notification::Error(reason));
    }

    fn complete(&mut self) {
        self.push(Notification::Complete);
    }
}

/// Producer function driving a sink.
pub type Producer<T, E> = Box<dyn Fn(&mut dyn Sink<T, E>) + Send + Sync>;

/// The simplest possible push-based notification source.
///
/// # Example
///
/// ```rust
/// use statebus::channel::{Notification, Observable};
///
/// let observable: Observable<&str, String> = Observable::new(|sink| {
///     sink.next("hello");
///     sink.complete();
/// });
///
/// let mut seen: Vec<Notification<&str, String>> = Vec::new();
/// observable.subscribe(&mut seen);
///
/// assert_eq!(seen, vec![Notification::Next("hello"), Notification::Complete]);
/// ```
pub struct Observable<T, E> {
    producer: Producer<T, E>,
}

impl<T, E> Observable<T, E> {
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn(&mut dyn Sink<T, E>) + Send + Sync + 'static,
    {
        Self {
            producer: Box::new(producer),
        }
    }

    /// Run the producer synchronously against `sink`.
    pub fn subscribe(&self, sink: &mut dyn Sink<T, E>) {
        (self.producer)(sink);
    }
}

/// Cloneable sink that records every notification it receives.
///
/// Clones share the same log, so one handle can be given away to a machine
/// while another is kept for inspection.
#[derive(Debug)]
pub struct Recorder<T, E> {
    log: Arc<Mutex<Vec<Notification<T, E>>>>,
}

impl<T: Clone, E: Clone> Recorder<T, E> {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Copy of everything recorded so far, in arrival order.
    pub fn notifications(&self) -> Vec<Notification<T, E>> {
        self.log.lock().clone()
    }

    /// Values delivered through `next`.
    pub fn values(&self) -> Vec<T> {
        self.log
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Reasons delivered through `error`.
    pub fn errors(&self) -> Vec<E> {
        self.log
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `complete` notifications.
    pub fn completions(&self) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|n| matches!(n, Notification::Complete))
            .count()
    }
}

impl<T: Clone, E: Clone> Default for Recorder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Recorder<T, E> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<T, E> Sink<T, E> for Recorder<T, E> {
    fn next(&mut self, value: T) {
        self.log.lock().push(Notification::Next(value));
    }

    fn error(&mut self, reason: E) {
        self.log.lock().push(Notification::Error(reason));
    }

    fn complete(&mut self) {
        self.log.lock().push(Notification::Complete);
    }
}
