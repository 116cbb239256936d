//! Network, device, and joiner records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spinel_protocol::Eui64;

use crate::state::{ConnectionState, JoinerState, NetworkRole};

/// Identifier for a network record.
pub type NetworkId = String;

/// A Thread network and its credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// Record identifier.
    pub id: NetworkId,
    /// Network name (up to 16 bytes on the wire).
    pub name: String,
    /// 802.15.4 channel (11-26).
    pub channel: u8,
    /// 802.15.4 PAN identifier.
    pub pan_id: u16,
    /// Extended PAN identifier.
    pub ext_pan_id: [u8; 8],
    /// Network master key (16 bytes).
    pub network_key: Vec<u8>,
    /// Current role in the role state machine.
    pub role: NetworkRole,
    /// Coarse connection state.
    pub state: ConnectionState,
}

/// Kind of mesh node a device record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Entry from the router table.
    Router,
    /// Entry from the child table.
    Child,
}

/// A mesh device discovered through topology polling.
///
/// Keyed by `(network_id, ext_addr)`. The coordinator upserts these and
/// never deletes them; cleanup is the storage layer's policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Network the device belongs to.
    pub network_id: NetworkId,
    /// EUI-64 extended address.
    pub ext_addr: Eui64,
    /// Thread routing locator.
    pub rloc16: u16,
    /// Router or child.
    pub device_type: DeviceType,
    /// Link quality indicator (0-3).
    pub link_quality: u8,
    /// Last RSSI reading in dBm.
    pub rssi: i8,
    /// When the device was last seen in a table poll.
    pub last_seen: DateTime<Utc>,
    /// Parent device, for children.
    pub parent: Option<Eui64>,
}

/// Attributes written on each device upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAttrs {
    /// Thread routing locator.
    pub rloc16: u16,
    /// Router or child.
    pub device_type: DeviceType,
    /// Link quality indicator (0-3).
    pub link_quality: u8,
    /// Last RSSI reading in dBm.
    pub rssi: i8,
    /// Observation time, written to `last_seen`.
    pub seen_at: DateTime<Utc>,
    /// Parent device, for children.
    pub parent: Option<Eui64>,
}

/// A device registered for commissioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinerRecord {
    /// Record identifier.
    pub id: String,
    /// Network the joiner is registered against.
    pub network_id: NetworkId,
    /// Joiner's EUI-64.
    pub eui64: Eui64,
    /// Pre-shared key for device commissioning.
    pub pskd: String,
    /// Commissioning state.
    pub state: JoinerState,
    /// Deadline after which a pending/joining session expires.
    pub expires_at: DateTime<Utc>,
    /// When the device started its handshake.
    pub started_at: Option<DateTime<Utc>>,
    /// When commissioning completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A joiner lifecycle event, as consumed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinerEvent {
    /// The device started its handshake at `at`; the session now expires
    /// at `expires_at`.
    Start {
        /// Handshake start time.
        at: DateTime<Utc>,
        /// New session deadline.
        expires_at: DateTime<Utc>,
    },
    /// The device completed commissioning at `at`.
    Complete {
        /// Completion time.
        at: DateTime<Utc>,
    },
    /// Commissioning failed.
    Fail,
    /// The session deadline passed.
    Expire,
}

impl JoinerEvent {
    /// The state-machine action this event drives.
    pub fn action(&self) -> crate::state::JoinerAction {
        match self {
            JoinerEvent::Start { .. } => crate::state::JoinerAction::Start,
            JoinerEvent::Complete { .. } => crate::state::JoinerAction::Complete,
            JoinerEvent::Fail => crate::state::JoinerAction::Fail,
            JoinerEvent::Expire => crate::state::JoinerAction::Expire,
        }
    }
}
