//! Light Switch
//!
//! This example demonstrates a two-state machine with lifecycle actions.
//!
//! Key concepts:
//! - Declaring states and event handlers with the builder
//! - Reducers rewriting the context before the transition
//! - `on_exit` / `on_enter` ordering around a state change
//! - Observing snapshots through a subscribed sink
//! - Rejections for events the current state does not handle
//!
//! Run with: RUST_LOG=debug cargo run --example light_switch

use serde::{Deserialize, Serialize};
use statebus::builder::MachineBuilder;
use statebus::channel::Sink;
use statebus::{Machine, Rejection, Snapshot};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Lamp {
    flips: u32,
}

struct Printer;

impl Sink<Snapshot<Lamp>, Rejection> for Printer {
    fn next(&mut self, snapshot: Snapshot<Lamp>) {
        println!(
            "  [next]     {}",
            serde_json::to_string(&snapshot).unwrap_or_default()
        );
    }

    fn error(&mut self, reason: Rejection) {
        println!("  [error]    {}", reason);
    }

    fn complete(&mut self) {
        println!("  [complete]");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Light Switch ===\n");

    let definition = MachineBuilder::<Lamp, ()>::new()
        .state("off", |s| {
            s.initial()
                .on_enter(|| println!("  [action]   lights out"))
                .on_exit(|lamp: &Lamp| println!("  [action]   leaving off after {} flips", lamp.flips))
                .on("switch", |h| {
                    h.target("on").reducer(|lamp: Lamp, _| Lamp {
                        flips: lamp.flips + 1,
                    })
                })
        })
        .state("on", |s| {
            s.on_enter(|| println!("  [action]   lights on"))
                .on("switch", |h| h.target("off"))
                .on("unplug", |h| h.target("unplugged"))
        })
        .state("unplugged", |s| s.exit())
        .build();

    let mut machine = match Machine::new(definition) {
        Ok(machine) => machine,
        Err(err) => {
            eprintln!("invalid definition: {}", err);
            return;
        }
    };

    println!("Subscribing:");
    machine.subscribe(Printer);

    for event in ["switch", "switch", "dance", "switch", "unplug"] {
        println!("\nDispatch {:?}:", event);
        machine.dispatch(event, None);
    }

    println!(
        "\nFinal state: {} ({} flips, terminal: {})",
        machine.state(),
        machine.context().flips,
        machine.is_terminal()
    );

    println!("\n=== Example Complete ===");
}
