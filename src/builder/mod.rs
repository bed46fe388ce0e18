//! Builder API for ergonomic machine definitions.
//!
//! Definitions are described once as data; these builders assemble that
//! data with closures so that reducers and computed targets are checked
//! against the machine's concrete context and payload types.

pub mod handler;
pub mod machine;
pub mod state;

pub use handler::HandlerBuilder;
pub use machine::MachineBuilder;
pub use state::StateBuilder;

use crate::core::EventHandler;

/// Create a handler that moves to `target` without touching the context.
///
/// # Example
///
/// ```
/// use statebus::builder::{goto, MachineBuilder};
///
/// let definition = MachineBuilder::<(), ()>::new()
///     .state("red", |s| s.initial().handle("tick", goto("green")))
///     .state("green", |s| s.handle("tick", goto("red")))
///     .build();
///
/// assert!(definition.state("red").unwrap().handler("tick").is_some());
/// ```
pub fn goto<C, P>(target: impl Into<String>) -> EventHandler<C, P> {
    HandlerBuilder::new().target(target).build()
}

/// Create a handler that only rewrites the context.
///
/// # Example
///
/// ```
/// use statebus::builder::{reduce, MachineBuilder};
///
/// let definition = MachineBuilder::<u32, u32>::new()
///     .state("counting", |s| {
///         s.initial()
///             .handle("add", reduce(|total: u32, n: Option<&u32>| total + n.copied().unwrap_or(0)))
///     })
///     .build();
///
/// let handler = definition.state("counting").unwrap().handler("add").unwrap();
/// assert!(handler.target().is_none());
/// ```
pub fn reduce<C, P, F>(f: F) -> EventHandler<C, P>
where
    F: Fn(C, Option<&P>) -> C + Send + Sync + 'static,
{
    HandlerBuilder::new().reducer(f).build()
}
