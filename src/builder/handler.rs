//! Builder for event handlers.

use crate::core::{EventHandler, Reducer, Target};
use std::sync::Arc;

/// Builder for constructing an [`EventHandler`] with a fluent API.
///
/// Both parts are optional: a handler with neither target nor reducer
/// accepts the event and changes nothing.
pub struct HandlerBuilder<C, P> {
    target: Option<Target<C, P>>,
    reducer: Option<Reducer<C, P>>,
}

impl<C, P> HandlerBuilder<C, P> {
    /// Create a new handler builder.
    pub fn new() -> Self {
        Self {
            target: None,
            reducer: None,
        }
    }

    /// Move to a fixed state.
    pub fn target(mut self, state: impl Into<String>) -> Self {
        self.target = Some(Target::fixed(state));
        self
    }

    /// Move to a state computed from `(payload, context)` at dispatch time.
    pub fn computed<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&P>, &C) -> String + Send + Sync + 'static,
    {
        self.target = Some(Target::computed(f));
        self
    }

    /// Rewrite the context. Runs before the target is resolved.
    pub fn reducer<F>(mut self, f: F) -> Self
    where
        F: Fn(C, Option<&P>) -> C + Send + Sync + 'static,
    {
        self.reducer = Some(Arc::new(f));
        self
    }

    /// Build the handler.
    pub fn build(self) -> EventHandler<C, P> {
        EventHandler {
            target: self.target,
            reducer: self.reducer,
        }
    }
}

impl<C, P> Default for HandlerBuilder<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_is_noop() {
        let handler: EventHandler<u32, ()> = HandlerBuilder::new().build();

        assert!(handler.target().is_none());
        assert!(handler.reducer().is_none());
    }

    #[test]
    fn target_sets_fixed_state() {
        let handler: EventHandler<u32, ()> = HandlerBuilder::new().target("on").build();

        assert_eq!(handler.target().and_then(|t| t.as_fixed()), Some("on"));
    }

    #[test]
    fn computed_replaces_fixed_target() {
        let handler: EventHandler<u32, ()> = HandlerBuilder::new()
            .target("on")
            .computed(|_, count: &u32| format!("level-{}", count))
            .build();

        let target = handler.target().unwrap();
        assert!(target.as_fixed().is_none());
        assert_eq!(target.resolve(None, &2), "level-2");
    }

    #[test]
    fn reducer_is_stored() {
        let handler: EventHandler<u32, u32> = HandlerBuilder::new()
            .reducer(|count: u32, step: Option<&u32>| count + step.copied().unwrap_or(1))
            .build();

        let reducer = handler.reducer().unwrap();
        assert_eq!(reducer(1, Some(&5)), 6);
        assert_eq!(reducer(1, None), 2);
    }
}
