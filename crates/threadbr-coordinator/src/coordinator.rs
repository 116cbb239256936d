//! The coordinator worker and its handle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use spinel_protocol::{
    decode_eui64, encode_bool, encode_data, encode_uint16, encode_uint8, encode_utf8, Eui64,
    Property,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use threadbr_client::{ProtocolEvent, SpinelClient};
use threadbr_common::{
    ConnectionState, DeviceAttrs, DeviceType, JoinerEvent, NetworkId, RecordStore, RoleAction,
};

use crate::config::CoordinatorConfig;
use crate::error::CoordinatorError;
use crate::topology::{decode_child_table, decode_router_table};

/// Capacity of the coordinator's message queue.
const MSG_QUEUE_DEPTH: usize = 16;

enum Msg {
    Attach {
        id: NetworkId,
        reply: oneshot::Sender<Result<(), CoordinatorError>>,
    },
    Detach {
        reply: oneshot::Sender<()>,
    },
    JoinerStarted {
        eui64: Eui64,
    },
    JoinerCompleted {
        eui64: Eui64,
    },
}

/// Handle to a spawned coordinator worker.
///
/// One coordinator drives one RCP connection; at most one network is
/// attached at a time.
#[derive(Clone)]
pub struct Coordinator {
    msgs: mpsc::Sender<Msg>,
}

impl Coordinator {
    /// Spawn a coordinator worker over a client and a record store.
    pub fn spawn(
        client: SpinelClient,
        store: Arc<dyn RecordStore>,
        config: CoordinatorConfig,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(MSG_QUEUE_DEPTH);
        let events = client.subscribe();
        let worker = Worker::new(client, store, config, msg_rx, events);
        tokio::spawn(worker.run());
        Coordinator { msgs: msg_tx }
    }

    /// Configure the RCP for the given network and bring the Thread stack
    /// up.
    ///
    /// Loads the network's credentials from the store and issues, in
    /// order: network key, PAN id, extended PAN id, channel, network name,
    /// interface up, thread start. The first failing step aborts the
    /// attach, rolls the device back best-effort, and is surfaced
    /// verbatim.
    pub async fn attach_network(&self, id: &str) -> Result<(), CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.msgs
            .send(Msg::Attach {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| CoordinatorError::Closed)?;
        reply_rx.await.map_err(|_| CoordinatorError::Closed)?
    }

    /// Bring the Thread stack down and clear the session.
    ///
    /// Best-effort on the device side: the stop/down calls may fail, but
    /// local cleanup always completes and the call always succeeds. Safe
    /// to call when already detached.
    pub async fn detach_network(&self) -> Result<(), CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.msgs
            .send(Msg::Detach { reply: reply_tx })
            .await
            .map_err(|_| CoordinatorError::Closed)?;
        reply_rx.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Report that a joiner started its commissioning handshake.
    pub async fn joiner_started(&self, eui64: Eui64) -> Result<(), CoordinatorError> {
        self.msgs
            .send(Msg::JoinerStarted { eui64 })
            .await
            .map_err(|_| CoordinatorError::Closed)
    }

    /// Report that a joiner completed commissioning.
    pub async fn joiner_completed(&self, eui64: Eui64) -> Result<(), CoordinatorError> {
        self.msgs
            .send(Msg::JoinerCompleted { eui64 })
            .await
            .map_err(|_| CoordinatorError::Closed)
    }
}

/// Session state held while a network is attached.
struct Session {
    network_id: NetworkId,
    /// Our own EUI-64, used as the parent reference for child entries.
    own_addr: Option<Eui64>,
}

struct Worker {
    client: SpinelClient,
    store: Arc<dyn RecordStore>,
    config: CoordinatorConfig,
    msgs: mpsc::Receiver<Msg>,
    events: broadcast::Receiver<ProtocolEvent>,
    session: Option<Session>,
    topology_timer: Interval,
    joiner_timer: Interval,
}

fn make_timer(period: Duration) -> Interval {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

impl Worker {
    fn new(
        client: SpinelClient,
        store: Arc<dyn RecordStore>,
        config: CoordinatorConfig,
        msgs: mpsc::Receiver<Msg>,
        events: broadcast::Receiver<ProtocolEvent>,
    ) -> Self {
        let topology_timer = make_timer(config.topology_interval);
        let joiner_timer = make_timer(config.joiner_poll_interval);
        Worker {
            client,
            store,
            config,
            msgs,
            events,
            session: None,
            topology_timer,
            joiner_timer,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                msg = self.msgs.recv() => match msg {
                    Some(msg) => self.handle_msg(msg).await,
                    None => break,
                },
                event = self.events.recv() => match event {
                    Ok(event) => self.handle_event(event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "protocol event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("client gone, stopping coordinator");
                        break;
                    }
                },
                _ = self.topology_timer.tick(), if self.session.is_some() => {
                    self.poll_topology().await;
                }
                _ = self.joiner_timer.tick(), if self.session.is_some() => {
                    self.poll_joiners();
                }
            }
        }
    }

    async fn handle_msg(&mut self, msg: Msg) {
        match msg {
            Msg::Attach { id, reply } => {
                let _ = reply.send(self.attach(&id).await);
            }
            Msg::Detach { reply } => {
                self.detach().await;
                let _ = reply.send(());
            }
            Msg::JoinerStarted { eui64 } => self.joiner_started(eui64),
            Msg::JoinerCompleted { eui64 } => self.joiner_completed(eui64),
        }
    }

    async fn attach(&mut self, id: &str) -> Result<(), CoordinatorError> {
        if let Some(session) = &self.session {
            return Err(CoordinatorError::AlreadyAttached(
                session.network_id.clone(),
            ));
        }
        let record = self.store.read_network(id)?;

        let steps: [(Property, Vec<u8>); 7] = [
            (Property::NetNetworkKey, encode_data(&record.network_key)),
            (Property::Mac154PanId, encode_uint16(record.pan_id)),
            (Property::NetXpanId, record.ext_pan_id.to_vec()),
            (Property::PhyChan, encode_uint8(record.channel)),
            (Property::NetNetworkName, encode_utf8(&record.name)),
            (Property::NetIfUp, encode_bool(true)),
            (Property::NetStackUp, encode_bool(true)),
        ];
        for (property, value) in steps {
            if let Err(source) = self.client.set_property(property, &value).await {
                warn!(network = id, %property, "attach step failed, rolling back");
                // Leave the device unconfigured rather than half-configured.
                let _ = self
                    .client
                    .set_property(Property::NetStackUp, &encode_bool(false))
                    .await;
                let _ = self
                    .client
                    .set_property(Property::NetIfUp, &encode_bool(false))
                    .await;
                return Err(CoordinatorError::AttachStep { property, source });
            }
        }

        let own_addr = match self.client.get_property(Property::HwAddr).await {
            Ok(value) => match decode_eui64(&value) {
                Ok((addr, _)) => Some(addr),
                Err(e) => {
                    warn!("bad hwaddr value: {e}");
                    None
                }
            },
            Err(e) => {
                warn!("could not read hwaddr: {e}");
                None
            }
        };

        self.session = Some(Session {
            network_id: id.to_string(),
            own_addr,
        });
        self.topology_timer.reset();
        self.joiner_timer.reset();

        if let Err(e) = self.store.update_network_state(id, RoleAction::Attach) {
            warn!(network = id, "attach transition rejected: {e}");
        }
        if let Err(e) = self
            .store
            .update_network_connection(id, ConnectionState::Joining)
        {
            warn!(network = id, "connection state update failed: {e}");
        }
        info!(network = id, "attached");
        Ok(())
    }

    /// Device-side stop is best-effort; session cleanup is authoritative
    /// and this never fails.
    async fn detach(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("detach on already-detached session");
            return;
        };
        if let Err(e) = self
            .client
            .set_property(Property::NetStackUp, &encode_bool(false))
            .await
        {
            warn!("thread stop failed: {e}");
        }
        if let Err(e) = self
            .client
            .set_property(Property::NetIfUp, &encode_bool(false))
            .await
        {
            warn!("interface down failed: {e}");
        }
        if let Err(e) = self
            .store
            .update_network_state(&session.network_id, RoleAction::Detach)
        {
            warn!(network = %session.network_id, "detach transition rejected: {e}");
        }
        if let Err(e) = self
            .store
            .update_network_connection(&session.network_id, ConnectionState::Detached)
        {
            warn!(network = %session.network_id, "connection state update failed: {e}");
        }
        info!(network = %session.network_id, "detached");
    }

    /// Fetch the router and child tables and upsert a device record per
    /// entry. One bad entry or table never aborts the rest.
    async fn poll_topology(&mut self) {
        let Some(session) = &self.session else { return };
        let network_id = session.network_id.clone();
        let own_addr = session.own_addr;
        let seen_at = Utc::now();
        trace!(network = %network_id, "polling topology");

        match self.client.get_property(Property::ThreadRouterTable).await {
            Ok(value) => match decode_router_table(&value) {
                Ok(entries) => {
                    for entry in entries {
                        let attrs = DeviceAttrs {
                            rloc16: entry.rloc16,
                            device_type: DeviceType::Router,
                            link_quality: entry.link_quality,
                            rssi: entry.rssi,
                            seen_at,
                            parent: None,
                        };
                        if let Err(e) =
                            self.store.upsert_device(&network_id, entry.ext_addr, attrs)
                        {
                            warn!(device = %entry.ext_addr, "router upsert failed: {e}");
                        }
                    }
                }
                Err(e) => warn!("bad router table value: {e}"),
            },
            Err(e) => warn!("router table poll failed: {e}"),
        }

        match self.client.get_property(Property::ThreadChildTable).await {
            Ok(value) => match decode_child_table(&value) {
                Ok(entries) => {
                    for entry in entries {
                        let attrs = DeviceAttrs {
                            rloc16: entry.rloc16,
                            device_type: DeviceType::Child,
                            link_quality: entry.link_quality,
                            rssi: entry.rssi,
                            seen_at,
                            parent: own_addr,
                        };
                        if let Err(e) =
                            self.store.upsert_device(&network_id, entry.ext_addr, attrs)
                        {
                            warn!(device = %entry.ext_addr, "child upsert failed: {e}");
                        }
                    }
                }
                Err(e) => warn!("bad child table value: {e}"),
            },
            Err(e) => warn!("child table poll failed: {e}"),
        }
    }

    /// Expire joiner sessions whose deadline has passed.
    fn poll_joiners(&mut self) {
        let now = Utc::now();
        let expired = match self.store.query_expired_joiners(now) {
            Ok(expired) => expired,
            Err(e) => {
                warn!("expired joiner query failed: {e}");
                return;
            }
        };
        for joiner in expired {
            debug!(joiner = %joiner.id, eui64 = %joiner.eui64, "expiring joiner session");
            if let Err(e) = self.store.transition_joiner(&joiner.id, JoinerEvent::Expire) {
                warn!(joiner = %joiner.id, "expire transition failed: {e}");
            }
        }
    }

    fn handle_event(&mut self, event: ProtocolEvent) {
        let Some(session) = &self.session else {
            trace!(?event, "protocol event with no attached network");
            return;
        };
        let id = session.network_id.clone();
        match event {
            ProtocolEvent::StateChanged(state) => {
                match ConnectionState::from_device_state(state) {
                    Some(connection) => {
                        debug!(network = %id, %connection, "device state changed");
                        if let Err(e) = self.store.update_network_connection(&id, connection) {
                            warn!(network = %id, "connection state update failed: {e}");
                        }
                    }
                    None => warn!(?state, "device reported unmapped state"),
                }
            }
            ProtocolEvent::RoleChanged(role) => {
                let current = match self.store.read_network(&id) {
                    Ok(record) => record.role,
                    Err(e) => {
                        warn!(network = %id, "network read failed: {e}");
                        return;
                    }
                };
                // The transition must be the one legal from the current
                // role, not a fixed mapping from the reported role.
                match current.action_toward(role) {
                    Some(action) => {
                        debug!(network = %id, %current, ?role, %action, "advancing role");
                        if let Err(e) = self.store.update_network_state(&id, action) {
                            warn!(network = %id, "role transition rejected: {e}");
                        }
                    }
                    None => trace!(network = %id, ?role, "no role transition needed"),
                }
            }
        }
    }

    fn joiner_started(&mut self, eui64: Eui64) {
        let joiner = match self.store.find_joiner_by_eui64(eui64) {
            Ok(joiner) => joiner,
            Err(_) => {
                warn!(%eui64, "joiner_start for unknown eui64, ignoring");
                return;
            }
        };
        let now = Utc::now();
        let timeout = chrono::Duration::from_std(self.config.joiner_session_timeout)
            .unwrap_or_else(|_| chrono::Duration::seconds(300));
        let event = JoinerEvent::Start {
            at: now,
            expires_at: now + timeout,
        };
        info!(joiner = %joiner.id, %eui64, "joiner started commissioning");
        if let Err(e) = self.store.transition_joiner(&joiner.id, event) {
            warn!(joiner = %joiner.id, "start transition failed: {e}");
        }
    }

    fn joiner_completed(&mut self, eui64: Eui64) {
        let joiner = match self.store.find_joiner_by_eui64(eui64) {
            Ok(joiner) => joiner,
            Err(_) => {
                warn!(%eui64, "joiner_complete for unknown eui64, ignoring");
                return;
            }
        };
        let event = JoinerEvent::Complete { at: Utc::now() };
        info!(joiner = %joiner.id, %eui64, "joiner completed commissioning");
        if let Err(e) = self.store.transition_joiner(&joiner.id, event) {
            warn!(joiner = %joiner.id, "complete transition failed: {e}");
        }
    }
}
