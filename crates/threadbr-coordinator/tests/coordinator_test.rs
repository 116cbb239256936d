//! Coordinator integration tests against a scripted RCP and an in-memory
//! record store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use spinel_protocol::{
    encode_bool, encode_data, encode_eui64, encode_uint16, encode_uint8, encode_utf8, Command,
    DeviceRole, DeviceState, Eui64, Frame, Property, Status,
};
use tokio::sync::mpsc;

use threadbr_client::{ClientError, FrameAccumulator, RcpLink, SpinelClient};
use threadbr_common::{
    ConnectionState, DeviceType, JoinerRecord, JoinerState, MemoryStore, NetworkRecord,
    NetworkRole, RecordStore,
};
use threadbr_coordinator::{
    encode_child_table, encode_router_table, ChildEntry, Coordinator, CoordinatorConfig,
    CoordinatorError, RouterEntry,
};

/// Every get/set the scripted RCP saw, in arrival order.
type Log = Arc<Mutex<Vec<(Command, Property, Vec<u8>)>>>;

#[derive(Clone)]
enum PropBehavior {
    /// Reply with a `prop_value_is` carrying this value.
    Value(Vec<u8>),
    /// Reply with a `last_status` carrying this status.
    Status(Status),
}

struct FakeRcp {
    log: Log,
    /// Frames written to the host unprompted.
    inject: mpsc::Sender<Frame>,
}

/// Scripted RCP: answers every set with `last_status ok` and every get
/// from the behavior map, recording all traffic.
fn spawn_rcp(mut link: RcpLink, behaviors: HashMap<Property, PropBehavior>) -> FakeRcp {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let (inject_tx, mut inject_rx) = mpsc::channel::<Frame>(8);
    let task_log = log.clone();
    tokio::spawn(async move {
        let mut framing = FrameAccumulator::new();
        loop {
            tokio::select! {
                chunk = link.recv() => {
                    let Some(chunk) = chunk else { break };
                    framing.push(&chunk);
                    while let Some(frame) = framing.next_frame() {
                        let Some(reply) = respond(&frame, &behaviors, &task_log) else {
                            continue;
                        };
                        if link.write(&reply.encode()).await.is_err() {
                            return;
                        }
                    }
                }
                Some(frame) = inject_rx.recv() => {
                    if link.write(&frame.encode()).await.is_err() {
                        return;
                    }
                }
            }
        }
    });
    FakeRcp {
        log,
        inject: inject_tx,
    }
}

fn respond(
    frame: &Frame,
    behaviors: &HashMap<Property, PropBehavior>,
    log: &Log,
) -> Option<Frame> {
    let tid = frame.tid();
    match frame.command {
        Command::Reset => reply_status(tid, Status::Reset(112)),
        Command::PropValueGet | Command::PropValueSet => {
            let property = frame.property()?;
            let value = frame.value().unwrap_or(&[]).to_vec();
            log.lock().unwrap().push((frame.command, property, value));
            match behaviors.get(&property) {
                Some(PropBehavior::Value(bytes)) => reply_value(tid, property, bytes),
                Some(PropBehavior::Status(status)) => reply_status(tid, *status),
                None if frame.command == Command::PropValueSet => {
                    reply_status(tid, Status::Ok)
                }
                None => reply_status(tid, Status::ItemNotFound),
            }
        }
        _ => None,
    }
}

fn reply_status(tid: u8, status: Status) -> Option<Frame> {
    let payload = vec![Property::LastStatus.code(), u8::from(status)];
    Frame::new(Command::PropValueIs, payload, tid).ok()
}

fn reply_value(tid: u8, property: Property, value: &[u8]) -> Option<Frame> {
    let mut payload = vec![property.code()];
    payload.extend_from_slice(value);
    Frame::new(Command::PropValueIs, payload, tid).ok()
}

fn own_addr() -> Eui64 {
    Eui64::new([0xAA, 1, 2, 3, 4, 5, 6, 7])
}

fn network(id: &str) -> NetworkRecord {
    NetworkRecord {
        id: id.to_string(),
        name: "br-main".to_string(),
        channel: 15,
        pan_id: 0xDEAD,
        ext_pan_id: [1, 2, 3, 4, 5, 6, 7, 8],
        network_key: vec![0x42; 16],
        role: NetworkRole::Detached,
        state: ConnectionState::Detached,
    }
}

fn joiner(id: &str, eui: u8) -> JoinerRecord {
    JoinerRecord {
        id: id.to_string(),
        network_id: "net-1".to_string(),
        eui64: Eui64::new([eui; 8]),
        pskd: "J01NME".to_string(),
        state: JoinerState::Pending,
        expires_at: Utc::now() + ChronoDuration::minutes(5),
        started_at: None,
        completed_at: None,
    }
}

fn fast_config() -> CoordinatorConfig {
    CoordinatorConfig {
        topology_interval: Duration::from_millis(50),
        joiner_poll_interval: Duration::from_millis(50),
        joiner_session_timeout: Duration::from_secs(300),
    }
}

struct Harness {
    coordinator: Coordinator,
    store: Arc<MemoryStore>,
    rcp: FakeRcp,
}

fn setup(behaviors: HashMap<Property, PropBehavior>, config: CoordinatorConfig) -> Harness {
    let (host, device) = RcpLink::pair();
    let rcp = spawn_rcp(device, behaviors);
    let client = SpinelClient::spawn_with_timeout(host, Duration::from_millis(500));
    let store = Arc::new(MemoryStore::new());
    store.insert_network(network("net-1"));
    let coordinator = Coordinator::spawn(client, store.clone(), config);
    Harness {
        coordinator,
        store,
        rcp,
    }
}

/// Poll until the condition holds; the coordinator worker applies store
/// updates asynchronously.
async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

fn set_log(log: &Log) -> Vec<(Property, Vec<u8>)> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(command, _, _)| *command == Command::PropValueSet)
        .map(|(_, property, value)| (*property, value.clone()))
        .collect()
}

#[tokio::test]
async fn test_attach_configures_device_in_order() {
    let mut behaviors = HashMap::new();
    behaviors.insert(
        Property::HwAddr,
        PropBehavior::Value(encode_eui64(&own_addr())),
    );
    let h = setup(behaviors, fast_config());

    h.coordinator.attach_network("net-1").await.unwrap();

    let record = network("net-1");
    let expected = vec![
        (Property::NetNetworkKey, encode_data(&record.network_key)),
        (Property::Mac154PanId, encode_uint16(record.pan_id)),
        (Property::NetXpanId, record.ext_pan_id.to_vec()),
        (Property::PhyChan, encode_uint8(record.channel)),
        (Property::NetNetworkName, encode_utf8(&record.name)),
        (Property::NetIfUp, encode_bool(true)),
        (Property::NetStackUp, encode_bool(true)),
    ];
    assert_eq!(set_log(&h.rcp.log), expected);
    assert!(h
        .rcp
        .log
        .lock()
        .unwrap()
        .iter()
        .any(|(c, p, _)| *c == Command::PropValueGet && *p == Property::HwAddr));

    let stored = h.store.read_network("net-1").unwrap();
    assert_eq!(stored.role, NetworkRole::Child);
    assert_eq!(stored.state, ConnectionState::Joining);
}

#[tokio::test]
async fn test_attach_step_failure_rolls_back() {
    let mut behaviors = HashMap::new();
    behaviors.insert(
        Property::PhyChan,
        PropBehavior::Status(Status::InvalidArgument),
    );
    let h = setup(behaviors, fast_config());

    let err = h.coordinator.attach_network("net-1").await.unwrap_err();
    assert_eq!(
        err,
        CoordinatorError::AttachStep {
            property: Property::PhyChan,
            source: ClientError::Protocol(Status::InvalidArgument),
        }
    );

    // Everything up to the failing step, then stack down and interface
    // down, nothing else.
    let sets = set_log(&h.rcp.log);
    let properties: Vec<Property> = sets.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        properties,
        vec![
            Property::NetNetworkKey,
            Property::Mac154PanId,
            Property::NetXpanId,
            Property::PhyChan,
            Property::NetStackUp,
            Property::NetIfUp,
        ]
    );
    assert_eq!(sets[4].1, encode_bool(false));
    assert_eq!(sets[5].1, encode_bool(false));

    // The store never saw the failed attach.
    let stored = h.store.read_network("net-1").unwrap();
    assert_eq!(stored.role, NetworkRole::Detached);

    // The session stayed clear, so a retry goes through.
    let err = h.coordinator.attach_network("net-1").await.unwrap_err();
    assert!(matches!(err, CoordinatorError::AttachStep { .. }));
}

#[tokio::test]
async fn test_attach_twice_rejected() {
    let h = setup(HashMap::new(), fast_config());

    h.coordinator.attach_network("net-1").await.unwrap();
    let err = h.coordinator.attach_network("net-1").await.unwrap_err();
    assert_eq!(err, CoordinatorError::AlreadyAttached("net-1".to_string()));
}

#[tokio::test]
async fn test_attach_unknown_network() {
    let h = setup(HashMap::new(), fast_config());

    let err = h.coordinator.attach_network("nope").await.unwrap_err();
    assert!(matches!(err, CoordinatorError::Store(_)));
    // No device traffic for a network the store does not know.
    assert!(h.rcp.log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_detach_is_idempotent() {
    let h = setup(HashMap::new(), fast_config());

    // Detaching while detached is a no-op, not an error.
    h.coordinator.detach_network().await.unwrap();
    assert!(h.rcp.log.lock().unwrap().is_empty());

    h.coordinator.attach_network("net-1").await.unwrap();
    h.coordinator.detach_network().await.unwrap();

    let sets = set_log(&h.rcp.log);
    let tail: Vec<(Property, Vec<u8>)> = sets[sets.len() - 2..].to_vec();
    assert_eq!(
        tail,
        vec![
            (Property::NetStackUp, encode_bool(false)),
            (Property::NetIfUp, encode_bool(false)),
        ]
    );

    let stored = h.store.read_network("net-1").unwrap();
    assert_eq!(stored.role, NetworkRole::Detached);
    assert_eq!(stored.state, ConnectionState::Detached);

    h.coordinator.detach_network().await.unwrap();
    // And the session is reusable afterwards.
    h.coordinator.attach_network("net-1").await.unwrap();
}

#[tokio::test]
async fn test_topology_poll_records_devices() {
    let router = RouterEntry {
        ext_addr: Eui64::new([0x11; 8]),
        rloc16: 0x1C00,
        link_quality: 3,
        rssi: -60,
    };
    let child = ChildEntry {
        ext_addr: Eui64::new([0x22; 8]),
        rloc16: 0x1C01,
        timeout: 240,
        link_quality: 2,
        rssi: -75,
    };
    let mut behaviors = HashMap::new();
    behaviors.insert(
        Property::HwAddr,
        PropBehavior::Value(encode_eui64(&own_addr())),
    );
    behaviors.insert(
        Property::ThreadRouterTable,
        PropBehavior::Value(encode_router_table(&[router])),
    );
    behaviors.insert(
        Property::ThreadChildTable,
        PropBehavior::Value(encode_child_table(&[child])),
    );
    let h = setup(behaviors, fast_config());

    h.coordinator.attach_network("net-1").await.unwrap();
    wait_until("two device records", || {
        h.store.devices_for_network("net-1").len() == 2
    })
    .await;

    let devices = h.store.devices_for_network("net-1");
    let router_record = devices
        .iter()
        .find(|d| d.ext_addr == Eui64::new([0x11; 8]))
        .unwrap();
    assert_eq!(router_record.device_type, DeviceType::Router);
    assert_eq!(router_record.rloc16, 0x1C00);
    assert_eq!(router_record.rssi, -60);
    assert_eq!(router_record.parent, None);

    let child_record = devices
        .iter()
        .find(|d| d.ext_addr == Eui64::new([0x22; 8]))
        .unwrap();
    assert_eq!(child_record.device_type, DeviceType::Child);
    assert_eq!(child_record.parent, Some(own_addr()));
}

#[tokio::test]
async fn test_joiner_sessions_expire_while_attached() {
    let h = setup(HashMap::new(), fast_config());
    let mut stale = joiner("j-stale", 1);
    stale.expires_at = Utc::now() - ChronoDuration::minutes(1);
    h.store.insert_joiner(stale);
    h.store.insert_joiner(joiner("j-fresh", 2));

    // No expiry sweep runs while detached.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(h.store.joiner("j-stale").unwrap().state, JoinerState::Pending);

    h.coordinator.attach_network("net-1").await.unwrap();
    wait_until("stale joiner expired", || {
        h.store.joiner("j-stale").unwrap().state == JoinerState::Expired
    })
    .await;
    assert_eq!(h.store.joiner("j-fresh").unwrap().state, JoinerState::Pending);
}

#[tokio::test]
async fn test_joiner_start_and_complete() {
    let h = setup(HashMap::new(), fast_config());
    h.store.insert_joiner(joiner("j-1", 7));

    let before = Utc::now();
    h.coordinator.joiner_started(Eui64::new([7; 8])).await.unwrap();
    wait_until("joiner joining", || {
        h.store.joiner("j-1").unwrap().state == JoinerState::Joining
    })
    .await;
    let record = h.store.joiner("j-1").unwrap();
    assert!(record.started_at.is_some());
    // Deadline restarted from the commissioning handshake.
    assert!(record.expires_at >= before + ChronoDuration::minutes(4));

    h.coordinator.joiner_completed(Eui64::new([7; 8])).await.unwrap();
    wait_until("joiner joined", || {
        h.store.joiner("j-1").unwrap().state == JoinerState::Joined
    })
    .await;
    assert!(h.store.joiner("j-1").unwrap().completed_at.is_some());
}

#[tokio::test]
async fn test_joiner_event_for_unknown_eui64_ignored() {
    let h = setup(HashMap::new(), fast_config());
    h.store.insert_joiner(joiner("j-1", 7));

    h.coordinator.joiner_started(Eui64::new([9; 8])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.store.joiner("j-1").unwrap().state, JoinerState::Pending);
}

#[tokio::test]
async fn test_state_event_updates_connection() {
    let h = setup(HashMap::new(), fast_config());
    h.coordinator.attach_network("net-1").await.unwrap();

    // Unsolicited net_state report on a TID with no pending request.
    let payload = vec![Property::NetState.code(), u8::from(DeviceState::Active)];
    let frame = Frame::new(Command::PropValueIs, payload, 9).unwrap();
    h.rcp.inject.send(frame).await.unwrap();

    wait_until("connection active", || {
        h.store.read_network("net-1").unwrap().state == ConnectionState::Active
    })
    .await;
}

#[tokio::test]
async fn test_role_event_advances_role() {
    let h = setup(HashMap::new(), fast_config());
    h.coordinator.attach_network("net-1").await.unwrap();
    assert_eq!(h.store.read_network("net-1").unwrap().role, NetworkRole::Child);

    let report = |role: DeviceRole| {
        let payload = vec![Property::NetRole.code(), u8::from(role)];
        Frame::new(Command::PropValueIs, payload, 9).unwrap()
    };

    h.rcp.inject.send(report(DeviceRole::Router)).await.unwrap();
    wait_until("promoted to router", || {
        h.store.read_network("net-1").unwrap().role == NetworkRole::Router
    })
    .await;

    // The record is router now, so a reported leader takes the
    // router-legal path.
    h.rcp.inject.send(report(DeviceRole::Leader)).await.unwrap();
    wait_until("promoted to leader", || {
        h.store.read_network("net-1").unwrap().role == NetworkRole::Leader
    })
    .await;
}
