//! End-to-end behaviour of machines, channels and the bus.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use statebus::builder::{goto, reduce, MachineBuilder};
use statebus::bus::{Bus, Message, Outbound};
use statebus::channel::{Notification, Recorder};
use statebus::{
    Entity, Machine, MachineConfig, MachineDefinition, Rejection, Snapshot, TerminalPolicy,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Counter {
    count: u32,
}

fn counting_switch() -> MachineDefinition<Counter, ()> {
    MachineBuilder::<Counter, ()>::new()
        .state("off", |s| {
            s.initial().on("switch", |h| {
                h.target("on").reducer(|ctx: Counter, _| Counter {
                    count: ctx.count + 1,
                })
            })
        })
        .state("on", |s| s)
        .build()
}

#[test]
fn switch_increments_count_and_moves_on() {
    let mut machine = Machine::new(counting_switch()).unwrap();
    let recorder = Recorder::new();
    machine.subscribe(recorder.clone());

    machine.dispatch("switch", None);

    let last = recorder.values().pop().unwrap();
    assert_eq!(last.state, "on");
    assert_eq!(last.context.count, 1);
}

#[test]
fn omitted_context_starts_from_default() {
    let machine = Machine::new(counting_switch()).unwrap();

    assert_eq!(
        machine.snapshot(),
        &Snapshot {
            state: "off".to_string(),
            context: Counter::default()
        }
    );
}

#[test]
fn json_context_and_payload() {
    let definition = MachineBuilder::<Value, Value>::with_context(json!({ "log": [] }))
        .state("open", |s| {
            s.initial()
                .on("write", |h| {
                    h.reducer(|mut ctx: Value, payload: Option<&Value>| {
                        if let (Some(log), Some(line)) = (ctx["log"].as_array_mut(), payload) {
                            log.push(line.clone());
                        }
                        ctx
                    })
                })
                .on("close", |h| h.target("closed"))
        })
        .state("closed", |s| s.exit())
        .build();
    let mut machine = Machine::new(definition).unwrap();

    machine.send(&Message::with_payload("write", json!("first")));
    machine.send(&Message::with_payload("write", json!("second")));
    let outcome = machine.send(&Message::new("close"));

    assert!(outcome.is_terminal());
    assert_eq!(
        serde_json::to_value(machine.snapshot()).unwrap(),
        json!({ "state": "closed", "context": { "log": ["first", "second"] } })
    );
}

#[test]
fn unhandled_event_emits_single_error() {
    let mut machine = Machine::new(counting_switch()).unwrap();
    let recorder = Recorder::new();
    machine.subscribe(recorder.clone());

    machine.dispatch("Balls", None);

    assert_eq!(recorder.values().len(), 1);
    assert_eq!(
        recorder
            .errors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        vec!["State off has no handler for event Balls".to_string()]
    );
    assert_eq!(machine.state(), "off");
    assert_eq!(machine.context().count, 0);
}

#[test]
fn exit_state_completes_exactly_once_after_next() {
    let definition = MachineBuilder::<u32, ()>::new()
        .state("working", |s| {
            s.initial()
                .handle("finish", goto("done"))
                .handle("bump", reduce(|n: u32, _: Option<&()>| n + 1))
        })
        .state("done", |s| s.exit().handle("bump", reduce(|n: u32, _: Option<&()>| n + 1)))
        .build();
    let mut machine = Machine::new(definition).unwrap();
    let recorder = Recorder::new();
    machine.subscribe(recorder.clone());

    machine.dispatch("bump", None);
    machine.dispatch("finish", None);

    let notifications = recorder.notifications();
    assert_eq!(notifications.len(), 4);
    assert_eq!(
        notifications[2],
        Notification::Next(Snapshot {
            state: "done".to_string(),
            context: 1
        })
    );
    assert_eq!(notifications[3], Notification::Complete);
    assert_eq!(recorder.completions(), 1);
}

#[test]
fn lockout_policy_loaded_from_json_config() {
    let config = MachineConfig::from_json(r#"{ "terminal_policy": "lockout" }"#).unwrap();
    assert_eq!(config.terminal_policy, TerminalPolicy::Lockout);

    let definition = MachineBuilder::<u32, ()>::new()
        .state("a", |s| s.initial().handle("go", goto("b")))
        .state("b", |s| s.exit().handle("go", goto("a")))
        .build();
    let mut machine = Machine::with_config(definition, config).unwrap();
    machine.dispatch("go", None);

    let outcome = machine.dispatch("go", None);

    assert!(matches!(
        outcome.rejection(),
        Some(Rejection::Terminated { .. })
    ));
    assert_eq!(machine.state(), "b");
}

#[test]
fn panicking_reducer_leaves_machine_unchanged() {
    let definition = MachineBuilder::<u32, ()>::new()
        .state("off", |s| {
            s.initial()
                .on("boom", |h| h.target("on").reducer(|_, _| panic!("reducer failed")))
                .on("switch", |h| h.target("on"))
        })
        .state("on", |s| s)
        .build();
    let mut machine = Machine::new(definition).unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| machine.dispatch("boom", None)));

    assert!(result.is_err());
    assert_eq!(machine.state(), "off");
    assert_eq!(*machine.context(), 0);
    assert!(!machine.dispatch("switch", None).is_rejected());
}

#[test]
fn configuration_error_lists_every_violation() {
    let definition = MachineBuilder::<(), ()>::new()
        .state("a", |s| s.initial().handle("go", goto("missing")))
        .state("b", |s| s.initial())
        .build();

    let err = Machine::new(definition).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Multiple initial states defined: a, b; State a routes event go to unknown state missing"
    );
}

#[test]
fn ping_pong_between_entities() {
    let bus: Arc<Bus<u32>> = Arc::new(Bus::new());

    let player = || {
        MachineBuilder::<u32, u32>::new()
            .state("waiting", |s| {
                s.initial()
                    .on("ball", |h| h.reducer(|_, n| n.copied().unwrap_or(0)))
            })
            .build()
    };
    let reply = |envelope: &statebus::Envelope<u32>, snapshot: &Snapshot<u32>| {
        if snapshot.context < 5 {
            vec![Outbound::new(
                envelope.sender.clone(),
                Message::with_payload("ball", snapshot.context + 1),
            )]
        } else {
            Vec::new()
        }
    };

    let mut ping = Entity::with_id("ping", player(), bus.clone())
        .unwrap()
        .with_outbox(reply);
    let mut pong = Entity::with_id("pong", player(), bus.clone())
        .unwrap()
        .with_outbox(reply);

    ping.send("pong", &Message::with_payload("ball", 0));
    for _ in 0..10 {
        pong.update();
        ping.update();
    }

    assert_eq!(ping.pending() + pong.pending(), 0);
    assert_eq!(pong.snapshot().context, 4);
    assert_eq!(ping.snapshot().context, 5);
    assert!(ping.history().is_empty());
}

#[test]
fn bus_delivers_message_unchanged() {
    let bus: Bus = Bus::new();
    let received: Arc<Mutex<Vec<(String, Message)>>> = Arc::default();
    let sink = received.clone();
    bus.register("recipient", move |sender: &str, message: &Message| {
        sink.lock().unwrap().push((sender.to_string(), message.clone()));
    });
    let message = Message::with_payload("chat", json!({ "content": "Hello, recipient!" }));

    bus.send("sender", "recipient", &message);
    bus.send("sender", "nobody", &message);

    assert_eq!(
        *received.lock().unwrap(),
        vec![("sender".to_string(), message)]
    );
}
