//! Ping Pong
//!
//! This example demonstrates two entities exchanging messages over a bus.
//!
//! Key concepts:
//! - Owning a `Bus` and handing it to every entity
//! - Mailboxes drained explicitly with `update`
//! - Outbox functions replying to the sender
//! - Recorded history of state changes
//!
//! Run with: RUST_LOG=statebus=trace cargo run --example ping_pong

use serde_json::{json, Value};
use statebus::builder::MachineBuilder;
use statebus::bus::{Bus, Envelope, Message, Outbound};
use statebus::{Entity, MachineDefinition, Snapshot};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const RALLY: u64 = 6;

fn player() -> MachineDefinition<u64> {
    MachineBuilder::<u64>::new()
        .state("ready", |s| {
            s.initial().on("ball", |h| {
                h.reducer(|_, payload| payload.and_then(Value::as_u64).unwrap_or(0) + 1)
                    .computed(|_, hits: &u64| {
                        if *hits >= RALLY {
                            "won".to_string()
                        } else {
                            "ready".to_string()
                        }
                    })
            })
        })
        .state("won", |s| s.exit())
        .build()
}

fn volley(envelope: &Envelope, snapshot: &Snapshot<u64>) -> Vec<Outbound> {
    if snapshot.state == "won" {
        return Vec::new();
    }
    vec![Outbound::new(
        envelope.sender.clone(),
        Message::with_payload("ball", json!(snapshot.context)),
    )]
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Ping Pong ===\n");

    let bus: Arc<Bus> = Arc::new(Bus::new());

    let entities = Entity::with_id("ping", player(), bus.clone())
        .and_then(|ping| Entity::with_id("pong", player(), bus.clone()).map(|pong| (ping, pong)));
    let (ping, pong) = match entities {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("invalid definition: {}", err);
            return;
        }
    };
    let mut ping = ping.with_outbox(volley);
    let mut pong = pong.with_outbox(volley);

    println!("Registered entities: {:?}\n", bus);

    ping.send("pong", &Message::with_payload("ball", json!(0)));

    let mut round = 1;
    while ping.pending() + pong.pending() > 0 {
        for entity in [&mut pong, &mut ping] {
            for outcome in entity.update() {
                if let Some(snapshot) = outcome.snapshot() {
                    println!(
                        "  round {}: {} hit the ball (hits: {}, state: {})",
                        round,
                        entity.id(),
                        snapshot.context,
                        snapshot.state
                    );
                }
            }
        }
        round += 1;
    }

    for entity in [&ping, &pong] {
        println!("\n{} path: {:?}", entity.id(), entity.history().get_path());
    }

    println!("\n=== Example Complete ===");
}
