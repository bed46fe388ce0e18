//! Statebus: declarative state machines that talk over a message bus
//!
//! A machine is described once as data: named states, a flag for the initial
//! state, flags for exit states, optional `on_enter`/`on_exit` actions, and a
//! table of event handlers. Each handler may rewrite the context with a pure
//! reducer and may name the next state, either fixed or computed from the
//! payload and the freshly reduced context.
//!
//! # Core Concepts
//!
//! - **Definition**: Immutable description of states and handlers ([`core`], [`builder`])
//! - **Machine**: Live instance holding the current state and context ([`engine`])
//! - **Channel**: Push notifications of every accepted transition ([`channel`])
//! - **Bus**: Id-addressed routing between machines ([`bus`], [`entity`])
//!
//! # Example
//!
//! ```rust
//! use statebus::builder::MachineBuilder;
//! use statebus::channel::Recorder;
//! use statebus::{Machine, Snapshot};
//!
//! let definition = MachineBuilder::<u32, ()>::new()
//!     .state("off", |s| {
//!         s.initial()
//!             .on("switch", |h| h.target("on").reducer(|count, _| count + 1))
//!     })
//!     .state("on", |s| s.on("switch", |h| h.target("off")))
//!     .build();
//!
//! let mut machine = Machine::new(definition).unwrap();
//! let recorder = Recorder::new();
//! machine.subscribe(recorder.clone());
//!
//! machine.dispatch("switch", None);
//!
//! assert_eq!(
//!     recorder.values(),
//!     vec![
//!         Snapshot { state: "off".to_string(), context: 0 },
//!         Snapshot { state: "on".to_string(), context: 1 },
//!     ]
//! );
//! ```

pub mod builder;
pub mod bus;
pub mod channel;
pub mod core;
pub mod engine;
pub mod entity;

// Re-export commonly used types
pub use builder::MachineBuilder;
pub use bus::{Bus, Envelope, Message, Outbound};
pub use core::{ConfigurationError, MachineDefinition, StateHistory, Target, Violation};
pub use engine::{Machine, MachineConfig, Outcome, Rejection, Snapshot, TerminalPolicy};
pub use entity::Entity;
