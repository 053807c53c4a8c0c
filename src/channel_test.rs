use std::collections::BTreeSet;
use std::sync::OnceLock;

use engine::{DocumentId, Engine, EngineOptions, Notification, ObjectId};

use super::*;

const ROOT: ObjectId = ObjectId(1);

fn handle() -> Arc<EngineHandle> {
    let engine = Engine::boot(EngineOptions { width: 32, height: 32, ..EngineOptions::default() }).unwrap();
    Arc::new(EngineHandle::new(Box::new(engine)))
}

fn svg(name: &str) -> Command {
    Command::UploadSvg { name: name.into(), parent: ROOT, svg: "<svg/>".into() }
}

fn record(bus: &NotificationBus) -> Arc<Mutex<Vec<Notification>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in Notification::ALL {
        let seen = Arc::clone(&seen);
        bus.subscribe(kind, move |n| seen.lock().unwrap().push(n));
    }
    seen
}

#[test]
fn send_returns_ack_and_publishes_in_order() {
    let handle = handle();
    let bus = NotificationBus::new();
    let seen = record(&bus);

    let ack = handle.send(svg("a.svg"), &bus).unwrap();
    assert_eq!(ack.assigned_id, Some(ObjectId(2)));
    assert_eq!(*seen.lock().unwrap(), vec![Notification::StageChanged, Notification::Rerender]);
    assert!(!handle.is_busy());
}

#[test]
fn rejected_command_publishes_nothing() {
    let handle = handle();
    let bus = NotificationBus::new();
    let seen = record(&bus);

    let err = handle.send(Command::Delete { id: ObjectId(3) }, &bus).unwrap_err();
    assert_eq!(err, BridgeError::UnknownObjectId(ObjectId(3)));
    assert!(seen.lock().unwrap().is_empty());
    assert!(!handle.is_busy());
}

#[test]
fn stage_cache_follows_commands() {
    let handle = handle();
    let bus = NotificationBus::new();
    assert!(handle.stage().is_empty());

    let before = handle.stage();
    handle.send(svg("a.svg"), &bus).unwrap();
    assert_eq!(handle.stage().len(), 1);
    // Earlier snapshots are untouched.
    assert!(before.is_empty());
}

#[test]
fn reentrant_send_from_callback_is_busy() {
    let handle = handle();
    let bus = Arc::new(NotificationBus::new());
    let inner: OnceLock<Result<CommandAck, BridgeError>> = OnceLock::new();
    let inner = Arc::new(inner);
    {
        let handle = Arc::clone(&handle);
        let bus_ref = Arc::clone(&bus);
        let inner = Arc::clone(&inner);
        bus.subscribe(Notification::StageChanged, move |_| {
            inner.get_or_init(|| handle.send(svg("nested.svg"), &bus_ref));
        });
    }

    handle.send(svg("outer.svg"), &bus).unwrap();
    assert_eq!(inner.get(), Some(&Err(BridgeError::ChannelBusy)));
    // Only the outer upload happened.
    assert_eq!(handle.stage().len(), 1);

    // Once the outer call returned, the channel is free again.
    handle.send(Command::SwitchDocument { id: DocumentId(2) }, &NotificationBus::new()).unwrap();
}

#[test]
fn callbacks_see_the_new_stage_and_can_read_the_buffer() {
    let handle = handle();
    let bus = NotificationBus::new();
    let observed = Arc::new(Mutex::new(None));
    {
        let handle = Arc::clone(&handle);
        let observed = Arc::clone(&observed);
        bus.subscribe(Notification::Rerender, move |_| {
            let objects = handle.stage().len();
            let frame_ok = handle.buffer().map(|mut view| view.region(engine::RegionKind::Frame).width);
            *observed.lock().unwrap() = Some((objects, frame_ok));
        });
    }
    handle.send(svg("a.svg"), &bus).unwrap();
    assert_eq!(*observed.lock().unwrap(), Some((1, Ok(32))));
}

#[test]
fn live_buffer_view_blocks_commands() {
    let handle = handle();
    let bus = NotificationBus::new();
    let view = handle.buffer().unwrap();
    assert_eq!(handle.send(svg("a.svg"), &bus), Err(BridgeError::ChannelBusy));
    assert!(matches!(handle.buffer(), Err(BridgeError::ChannelBusy)));
    drop(view);
    assert!(handle.send(svg("a.svg"), &bus).is_ok());
}

#[test]
fn select_sequence_leaves_last_selection() {
    let handle = handle();
    let bus = NotificationBus::new();
    let ids: Vec<ObjectId> =
        (0..3).map(|i| handle.send(svg(&format!("{i}.svg")), &bus).unwrap().assigned_id.unwrap()).collect();
    handle.send(Command::Select { ids: BTreeSet::from([ids[0], ids[1]]) }, &bus).unwrap();
    handle.send(Command::Select { ids: BTreeSet::from([ids[2]]) }, &bus).unwrap();
    assert_eq!(handle.stage().selection, vec![ids[2]]);
}

#[test]
fn concurrent_senders_never_interleave() {
    let handle = handle();
    let bus = Arc::new(NotificationBus::new());
    let threads: Vec<_> = (0..4)
        .map(|t| {
            let handle = Arc::clone(&handle);
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || {
                let mut acked = 0;
                for i in 0..25 {
                    match handle.send(svg(&format!("{t}-{i}.svg")), &bus) {
                        Ok(_) => acked += 1,
                        Err(BridgeError::ChannelBusy) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
                acked
            })
        })
        .collect();
    let acked: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
    assert_eq!(handle.stage().len(), acked);
}
