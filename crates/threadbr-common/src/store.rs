//! The record-storage boundary and an in-memory implementation.
//!
//! The coordinator only ever talks to storage through [`RecordStore`]; the
//! persistent implementation lives outside this workspace. [`MemoryStore`]
//! exists so tests and the demo host have a working collaborator, and it
//! enforces exactly the validation the contract requires: not-found errors
//! and the two transition graphs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use spinel_protocol::Eui64;

use crate::error::StoreError;
use crate::records::{
    DeviceAttrs, DeviceRecord, JoinerEvent, JoinerRecord, NetworkId, NetworkRecord,
};
use crate::state::{ConnectionState, RoleAction};

/// Storage operations the coordinator depends on.
///
/// Every operation may fail with a not-found or validation error; the
/// coordinator logs and continues rather than crashing on any single
/// failure. Implementations may be called concurrently from multiple
/// coordinators and readers.
pub trait RecordStore: Send + Sync {
    /// Read a network record.
    fn read_network(&self, id: &str) -> Result<NetworkRecord, StoreError>;

    /// Apply a role transition to a network record.
    fn update_network_state(&self, id: &str, action: RoleAction)
        -> Result<NetworkRecord, StoreError>;

    /// Overwrite a network record's coarse connection state.
    fn update_network_connection(
        &self,
        id: &str,
        state: ConnectionState,
    ) -> Result<(), StoreError>;

    /// Create or update a device record keyed by `(network_id, ext_addr)`.
    fn upsert_device(
        &self,
        network_id: &str,
        ext_addr: Eui64,
        attrs: DeviceAttrs,
    ) -> Result<DeviceRecord, StoreError>;

    /// Joiners whose deadline has passed and are still pending/joining.
    fn query_expired_joiners(&self, now: DateTime<Utc>) -> Result<Vec<JoinerRecord>, StoreError>;

    /// Apply a commissioning event to a joiner record.
    fn transition_joiner(&self, id: &str, event: JoinerEvent) -> Result<JoinerRecord, StoreError>;

    /// Find a joiner record by the device's EUI-64.
    fn find_joiner_by_eui64(&self, eui64: Eui64) -> Result<JoinerRecord, StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    networks: HashMap<NetworkId, NetworkRecord>,
    devices: HashMap<(NetworkId, Eui64), DeviceRecord>,
    joiners: HashMap<String, JoinerRecord>,
}

/// In-memory [`RecordStore`] for tests and the demo host.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a network record.
    pub fn insert_network(&self, record: NetworkRecord) {
        self.tables.lock().networks.insert(record.id.clone(), record);
    }

    /// Insert or replace a joiner record.
    pub fn insert_joiner(&self, record: JoinerRecord) {
        self.tables.lock().joiners.insert(record.id.clone(), record);
    }

    /// Snapshot of all device records for a network.
    pub fn devices_for_network(&self, network_id: &str) -> Vec<DeviceRecord> {
        self.tables
            .lock()
            .devices
            .values()
            .filter(|d| d.network_id == network_id)
            .cloned()
            .collect()
    }

    /// Snapshot of a joiner record.
    pub fn joiner(&self, id: &str) -> Option<JoinerRecord> {
        self.tables.lock().joiners.get(id).cloned()
    }
}

impl RecordStore for MemoryStore {
    fn read_network(&self, id: &str) -> Result<NetworkRecord, StoreError> {
        self.tables
            .lock()
            .networks
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("network {id}")))
    }

    fn update_network_state(
        &self,
        id: &str,
        action: RoleAction,
    ) -> Result<NetworkRecord, StoreError> {
        let mut tables = self.tables.lock();
        let record = tables
            .networks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("network {id}")))?;
        record.role = record.role.apply(action)?;
        Ok(record.clone())
    }

    fn update_network_connection(
        &self,
        id: &str,
        state: ConnectionState,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        let record = tables
            .networks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("network {id}")))?;
        record.state = state;
        Ok(())
    }

    fn upsert_device(
        &self,
        network_id: &str,
        ext_addr: Eui64,
        attrs: DeviceAttrs,
    ) -> Result<DeviceRecord, StoreError> {
        let mut tables = self.tables.lock();
        let record = tables
            .devices
            .entry((network_id.to_string(), ext_addr))
            .or_insert_with(|| DeviceRecord {
                network_id: network_id.to_string(),
                ext_addr,
                rloc16: attrs.rloc16,
                device_type: attrs.device_type,
                link_quality: attrs.link_quality,
                rssi: attrs.rssi,
                last_seen: attrs.seen_at,
                parent: attrs.parent,
            });
        record.rloc16 = attrs.rloc16;
        record.device_type = attrs.device_type;
        record.link_quality = attrs.link_quality;
        record.rssi = attrs.rssi;
        record.last_seen = attrs.seen_at;
        record.parent = attrs.parent;
        Ok(record.clone())
    }

    fn query_expired_joiners(&self, now: DateTime<Utc>) -> Result<Vec<JoinerRecord>, StoreError> {
        use crate::state::JoinerState;
        Ok(self
            .tables
            .lock()
            .joiners
            .values()
            .filter(|j| {
                j.expires_at <= now
                    && matches!(j.state, JoinerState::Pending | JoinerState::Joining)
            })
            .cloned()
            .collect())
    }

    fn transition_joiner(&self, id: &str, event: JoinerEvent) -> Result<JoinerRecord, StoreError> {
        let mut tables = self.tables.lock();
        let record = tables
            .joiners
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("joiner {id}")))?;
        record.state = record.state.apply(event.action())?;
        match event {
            JoinerEvent::Start { at, expires_at } => {
                record.started_at = Some(at);
                record.expires_at = expires_at;
            }
            JoinerEvent::Complete { at } => {
                record.completed_at = Some(at);
            }
            JoinerEvent::Fail | JoinerEvent::Expire => {}
        }
        Ok(record.clone())
    }

    fn find_joiner_by_eui64(&self, eui64: Eui64) -> Result<JoinerRecord, StoreError> {
        self.tables
            .lock()
            .joiners
            .values()
            .find(|j| j.eui64 == eui64)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("joiner eui64 {eui64}")))
    }
}
