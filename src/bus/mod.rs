//! Message routing between independently built machines.
//!
//! A [`Bus`] maps entity ids to receptor callbacks. Entities register once
//! and are then reachable by id from any other holder of the bus.
//!
//! ## Rules
//! - **Synchronous**: `send` runs the receptor before returning.
//! - **Best effort**: unknown recipients are ignored; the sender learns nothing.
//! - **Last writer wins**: registering an existing id replaces its receptor.
//! - **Ordering**: messages from one sender to one recipient arrive in send order.

mod directory;
mod message;

pub use directory::{Bus, Receptor};
pub use message::{Envelope, Message, Outbound};
