//! Transition targets.
//!
//! A target names the state an event moves the machine to. It is either a
//! fixed state name known when the definition is built, or a function that
//! computes the name from the event payload and the freshly reduced context.

use std::fmt;
use std::sync::Arc;

/// Function computing a target state name at dispatch time.
pub type TargetFn<C, P> = Arc<dyn Fn(Option<&P>, &C) -> String + Send + Sync>;

/// Where an event handler sends the machine.
///
/// # Example
///
/// ```rust
/// use statebus::core::Target;
///
/// let fixed: Target<u32, ()> = Target::fixed("on");
/// assert_eq!(fixed.resolve(None, &0), "on");
///
/// let computed: Target<u32, ()> = Target::computed(|_payload, count: &u32| {
///     if *count > 2 { "full".to_string() } else { "filling".to_string() }
/// });
/// assert_eq!(computed.resolve(None, &1), "filling");
/// assert_eq!(computed.resolve(None, &3), "full");
/// ```
pub enum Target<C, P> {
    /// A literal state name.
    Fixed(String),

    /// A state name computed from `(payload, context)`.
    Computed(TargetFn<C, P>),
}

impl<C, P> Target<C, P> {
    /// Create a fixed target.
    pub fn fixed(state: impl Into<String>) -> Self {
        Target::Fixed(state.into())
    }

    /// Create a computed target from a function of payload and context.
    ///
    /// The function should be pure. It observes the context as already
    /// updated by the reducer of the same dispatch.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(Option<&P>, &C) -> String + Send + Sync + 'static,
    {
        Target::Computed(Arc::new(f))
    }

    /// Resolve the target to a state name.
    pub fn resolve(&self, payload: Option<&P>, context: &C) -> String {
        match self {
            Target::Fixed(state) => state.clone(),
            Target::Computed(f) => f(payload, context),
        }
    }

    /// The literal state name, if this target is fixed.
    pub fn as_fixed(&self) -> Option<&str> {
        match self {
            Target::Fixed(state) => Some(state),
            Target::Computed(_) => None,
        }
    }
}

impl<C, P> Clone for Target<C, P> {
    fn clone(&self) -> Self {
        match self {
            Target::Fixed(state) => Target::Fixed(state.clone()),
            Target::Computed(f) => Target::Computed(Arc::clone(f)),
        }
    }
}

impl<C, P> fmt::Debug for Target<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Fixed(state) => f.debug_tuple("Fixed").field(state).finish(),
            Target::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}
