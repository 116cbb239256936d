//! Spinel property registry.
//!
//! Property codes are grouped into categories by numeric range:
//!
//! | Range       | Category | Contents                                  |
//! |-------------|----------|-------------------------------------------|
//! | 0x00 - 0x0F | core     | status, versions, capabilities            |
//! | 0x70 - 0x7F | phy      | radio channel, power, RSSI                |
//! | 0x80 - 0x9F | mac      | 802.15.4 addressing, PAN id, scanning     |
//! | 0xA0 - 0xBF | net      | network credentials, interface/stack state|
//! | 0xC0 - 0xDF | thread   | mesh topology: leader, router/child tables|
//! | 0xE0 - 0xEF | ipv6     | link-local / mesh-local addressing        |
//! | 0xF0 - 0xFF | stream   | debug and packet streams                  |
//!
//! The same category is derivable from a property's symbolic name prefix
//! (`phy_`, `mac_`, ...); the two derivations always agree, which the test
//! suite asserts for every registered property.

// ============================================================================
// Property codes
// ============================================================================

// Core (0x00 - 0x0F)
/// Status of the most recent operation.
pub const PROP_LAST_STATUS: u8 = 0x00;
/// Spinel protocol version.
pub const PROP_PROTOCOL_VERSION: u8 = 0x01;
/// NCP firmware version string.
pub const PROP_NCP_VERSION: u8 = 0x02;
/// Network protocol type exposed by the interface.
pub const PROP_INTERFACE_TYPE: u8 = 0x03;
/// Capability list.
pub const PROP_CAPS: u8 = 0x05;
/// Factory-assigned EUI-64.
pub const PROP_HWADDR: u8 = 0x08;

// Phy (0x70 - 0x7F)
/// Radio enabled flag.
pub const PROP_PHY_ENABLED: u8 = 0x70;
/// Current radio channel.
pub const PROP_PHY_CHAN: u8 = 0x71;
/// Channels supported by the radio.
pub const PROP_PHY_CHAN_SUPPORTED: u8 = 0x72;
/// Transmit power in dBm.
pub const PROP_PHY_TX_POWER: u8 = 0x74;
/// Most recent RSSI reading.
pub const PROP_PHY_RSSI: u8 = 0x75;

// Mac (0x80 - 0x9F)
/// Current scan state.
pub const PROP_MAC_SCAN_STATE: u8 = 0x80;
/// Channel mask for scanning.
pub const PROP_MAC_SCAN_MASK: u8 = 0x81;
/// 802.15.4 long (extended) address.
pub const PROP_MAC_15_4_LADDR: u8 = 0x83;
/// 802.15.4 short address.
pub const PROP_MAC_15_4_SADDR: u8 = 0x84;
/// 802.15.4 PAN identifier.
pub const PROP_MAC_15_4_PANID: u8 = 0x85;

// Net (0xA0 - 0xBF)
/// Whether a network configuration is saved.
pub const PROP_NET_SAVED: u8 = 0xA0;
/// Network interface up/down.
pub const PROP_NET_IF_UP: u8 = 0xA1;
/// Thread stack up/down.
pub const PROP_NET_STACK_UP: u8 = 0xA2;
/// Device role in the network.
pub const PROP_NET_ROLE: u8 = 0xA3;
/// Network name.
pub const PROP_NET_NETWORK_NAME: u8 = 0xA4;
/// Extended PAN identifier.
pub const PROP_NET_XPANID: u8 = 0xA5;
/// Network master key.
pub const PROP_NET_NETWORK_KEY: u8 = 0xA6;
/// Key sequence counter.
pub const PROP_NET_KEY_SEQUENCE: u8 = 0xA7;
/// Device connection state.
pub const PROP_NET_STATE: u8 = 0xA8;

// Thread (0xC0 - 0xDF)
/// Mesh-local address of the current leader.
pub const PROP_THREAD_LEADER_ADDR: u8 = 0xC0;
/// Information about this device's parent.
pub const PROP_THREAD_PARENT: u8 = 0xC1;
/// Child table.
pub const PROP_THREAD_CHILD_TABLE: u8 = 0xC2;
/// Leader router id.
pub const PROP_THREAD_LEADER_RID: u8 = 0xC3;
/// This device's RLOC16.
pub const PROP_THREAD_RLOC16: u8 = 0xC6;
/// Router table.
pub const PROP_THREAD_ROUTER_TABLE: u8 = 0xC7;

// Ipv6 (0xE0 - 0xEF)
/// Link-local address.
pub const PROP_IPV6_LL_ADDR: u8 = 0xE0;
/// Mesh-local address.
pub const PROP_IPV6_ML_ADDR: u8 = 0xE1;
/// Address table.
pub const PROP_IPV6_ADDRESS_TABLE: u8 = 0xE3;

// Stream (0xF0 - 0xFF)
/// Debug output stream.
pub const PROP_STREAM_DEBUG: u8 = 0xF0;
/// Raw 802.15.4 frame stream.
pub const PROP_STREAM_RAW: u8 = 0xF1;
/// Network packet stream.
pub const PROP_STREAM_NET: u8 = 0xF2;

/// Property category, derived from the property code's numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyCategory {
    /// Protocol status, versions, capabilities.
    Core,
    /// Radio physical layer.
    Phy,
    /// 802.15.4 MAC layer.
    Mac,
    /// Network credentials and interface state.
    Net,
    /// Thread mesh topology.
    Thread,
    /// IPv6 addressing.
    Ipv6,
    /// Debug and packet streams.
    Stream,
}

impl PropertyCategory {
    /// Derive the category from a property code.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00..=0x0F => PropertyCategory::Core,
            0x70..=0x7F => PropertyCategory::Phy,
            0x80..=0x9F => PropertyCategory::Mac,
            0xA0..=0xBF => PropertyCategory::Net,
            0xC0..=0xDF => PropertyCategory::Thread,
            0xE0..=0xEF => PropertyCategory::Ipv6,
            0xF0..=0xFF => PropertyCategory::Stream,
            _ => PropertyCategory::Core,
        }
    }

    /// Derive the category from a symbolic property name prefix.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("phy_") {
            PropertyCategory::Phy
        } else if name.starts_with("mac_") {
            PropertyCategory::Mac
        } else if name.starts_with("net_") {
            PropertyCategory::Net
        } else if name.starts_with("thread_") {
            PropertyCategory::Thread
        } else if name.starts_with("ipv6_") {
            PropertyCategory::Ipv6
        } else if name.starts_with("stream_") {
            PropertyCategory::Stream
        } else {
            PropertyCategory::Core
        }
    }
}

impl std::fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PropertyCategory::Core => "core",
            PropertyCategory::Phy => "phy",
            PropertyCategory::Mac => "mac",
            PropertyCategory::Net => "net",
            PropertyCategory::Thread => "thread",
            PropertyCategory::Ipv6 => "ipv6",
            PropertyCategory::Stream => "stream",
        };
        write!(f, "{name}")
    }
}

/// Spinel properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Property {
    LastStatus,
    ProtocolVersion,
    NcpVersion,
    InterfaceType,
    Caps,
    HwAddr,
    PhyEnabled,
    PhyChan,
    PhyChanSupported,
    PhyTxPower,
    PhyRssi,
    MacScanState,
    MacScanMask,
    Mac154Laddr,
    Mac154Saddr,
    Mac154PanId,
    NetSaved,
    NetIfUp,
    NetStackUp,
    NetRole,
    NetNetworkName,
    NetXpanId,
    NetNetworkKey,
    NetKeySequence,
    NetState,
    ThreadLeaderAddr,
    ThreadParent,
    ThreadChildTable,
    ThreadLeaderRid,
    ThreadRloc16,
    ThreadRouterTable,
    Ipv6LlAddr,
    Ipv6MlAddr,
    Ipv6AddressTable,
    StreamDebug,
    StreamRaw,
    StreamNet,
    /// Property code from a protocol revision this registry does not know.
    Unknown(u8),
}

/// All registered properties, in code order.
pub const ALL_PROPERTIES: [Property; 37] = [
    Property::LastStatus,
    Property::ProtocolVersion,
    Property::NcpVersion,
    Property::InterfaceType,
    Property::Caps,
    Property::HwAddr,
    Property::PhyEnabled,
    Property::PhyChan,
    Property::PhyChanSupported,
    Property::PhyTxPower,
    Property::PhyRssi,
    Property::MacScanState,
    Property::MacScanMask,
    Property::Mac154Laddr,
    Property::Mac154Saddr,
    Property::Mac154PanId,
    Property::NetSaved,
    Property::NetIfUp,
    Property::NetStackUp,
    Property::NetRole,
    Property::NetNetworkName,
    Property::NetXpanId,
    Property::NetNetworkKey,
    Property::NetKeySequence,
    Property::NetState,
    Property::ThreadLeaderAddr,
    Property::ThreadParent,
    Property::ThreadChildTable,
    Property::ThreadLeaderRid,
    Property::ThreadRloc16,
    Property::ThreadRouterTable,
    Property::Ipv6LlAddr,
    Property::Ipv6MlAddr,
    Property::Ipv6AddressTable,
    Property::StreamDebug,
    Property::StreamRaw,
    Property::StreamNet,
];

impl Property {
    /// Get the property code.
    pub fn code(&self) -> u8 {
        match self {
            Property::LastStatus => PROP_LAST_STATUS,
            Property::ProtocolVersion => PROP_PROTOCOL_VERSION,
            Property::NcpVersion => PROP_NCP_VERSION,
            Property::InterfaceType => PROP_INTERFACE_TYPE,
            Property::Caps => PROP_CAPS,
            Property::HwAddr => PROP_HWADDR,
            Property::PhyEnabled => PROP_PHY_ENABLED,
            Property::PhyChan => PROP_PHY_CHAN,
            Property::PhyChanSupported => PROP_PHY_CHAN_SUPPORTED,
            Property::PhyTxPower => PROP_PHY_TX_POWER,
            Property::PhyRssi => PROP_PHY_RSSI,
            Property::MacScanState => PROP_MAC_SCAN_STATE,
            Property::MacScanMask => PROP_MAC_SCAN_MASK,
            Property::Mac154Laddr => PROP_MAC_15_4_LADDR,
            Property::Mac154Saddr => PROP_MAC_15_4_SADDR,
            Property::Mac154PanId => PROP_MAC_15_4_PANID,
            Property::NetSaved => PROP_NET_SAVED,
            Property::NetIfUp => PROP_NET_IF_UP,
            Property::NetStackUp => PROP_NET_STACK_UP,
            Property::NetRole => PROP_NET_ROLE,
            Property::NetNetworkName => PROP_NET_NETWORK_NAME,
            Property::NetXpanId => PROP_NET_XPANID,
            Property::NetNetworkKey => PROP_NET_NETWORK_KEY,
            Property::NetKeySequence => PROP_NET_KEY_SEQUENCE,
            Property::NetState => PROP_NET_STATE,
            Property::ThreadLeaderAddr => PROP_THREAD_LEADER_ADDR,
            Property::ThreadParent => PROP_THREAD_PARENT,
            Property::ThreadChildTable => PROP_THREAD_CHILD_TABLE,
            Property::ThreadLeaderRid => PROP_THREAD_LEADER_RID,
            Property::ThreadRloc16 => PROP_THREAD_RLOC16,
            Property::ThreadRouterTable => PROP_THREAD_ROUTER_TABLE,
            Property::Ipv6LlAddr => PROP_IPV6_LL_ADDR,
            Property::Ipv6MlAddr => PROP_IPV6_ML_ADDR,
            Property::Ipv6AddressTable => PROP_IPV6_ADDRESS_TABLE,
            Property::StreamDebug => PROP_STREAM_DEBUG,
            Property::StreamRaw => PROP_STREAM_RAW,
            Property::StreamNet => PROP_STREAM_NET,
            Property::Unknown(code) => *code,
        }
    }

    /// Look up a property by code. Unrecognized codes pass through unchanged.
    pub fn from_code(code: u8) -> Self {
        for prop in ALL_PROPERTIES {
            if prop.code() == code {
                return prop;
            }
        }
        Property::Unknown(code)
    }

    /// Look up a property by symbolic name.
    ///
    /// Unrecognized names map to [`Property::LastStatus`] (code 0x00):
    /// malformed input must never crash the encoder.
    pub fn from_name(name: &str) -> Self {
        for prop in ALL_PROPERTIES {
            if prop.name() == name {
                return prop;
            }
        }
        log::warn!("unknown property name {name:?}, falling back to last_status");
        Property::LastStatus
    }

    /// Get the symbolic name for this property.
    pub fn name(&self) -> &'static str {
        match self {
            Property::LastStatus => "last_status",
            Property::ProtocolVersion => "protocol_version",
            Property::NcpVersion => "ncp_version",
            Property::InterfaceType => "interface_type",
            Property::Caps => "caps",
            Property::HwAddr => "hwaddr",
            Property::PhyEnabled => "phy_enabled",
            Property::PhyChan => "phy_chan",
            Property::PhyChanSupported => "phy_chan_supported",
            Property::PhyTxPower => "phy_tx_power",
            Property::PhyRssi => "phy_rssi",
            Property::MacScanState => "mac_scan_state",
            Property::MacScanMask => "mac_scan_mask",
            Property::Mac154Laddr => "mac_15_4_laddr",
            Property::Mac154Saddr => "mac_15_4_saddr",
            Property::Mac154PanId => "mac_15_4_panid",
            Property::NetSaved => "net_saved",
            Property::NetIfUp => "net_if_up",
            Property::NetStackUp => "net_stack_up",
            Property::NetRole => "net_role",
            Property::NetNetworkName => "net_network_name",
            Property::NetXpanId => "net_xpanid",
            Property::NetNetworkKey => "net_network_key",
            Property::NetKeySequence => "net_key_sequence",
            Property::NetState => "net_state",
            Property::ThreadLeaderAddr => "thread_leader_addr",
            Property::ThreadParent => "thread_parent",
            Property::ThreadChildTable => "thread_child_table",
            Property::ThreadLeaderRid => "thread_leader_rid",
            Property::ThreadRloc16 => "thread_rloc16",
            Property::ThreadRouterTable => "thread_router_table",
            Property::Ipv6LlAddr => "ipv6_ll_addr",
            Property::Ipv6MlAddr => "ipv6_ml_addr",
            Property::Ipv6AddressTable => "ipv6_address_table",
            Property::StreamDebug => "stream_debug",
            Property::StreamRaw => "stream_raw",
            Property::StreamNet => "stream_net",
            Property::Unknown(_) => "unknown",
        }
    }

    /// Get the category this property belongs to.
    pub fn category(&self) -> PropertyCategory {
        PropertyCategory::from_code(self.code())
    }

    /// Whether the host may write this property.
    pub fn is_writable(&self) -> bool {
        !matches!(
            self,
            Property::LastStatus
                | Property::ProtocolVersion
                | Property::NcpVersion
                | Property::InterfaceType
                | Property::Caps
                | Property::HwAddr
                | Property::PhyChanSupported
                | Property::PhyRssi
                | Property::NetSaved
                | Property::NetRole
                | Property::NetState
                | Property::ThreadLeaderAddr
                | Property::ThreadParent
                | Property::ThreadChildTable
                | Property::ThreadLeaderRid
                | Property::ThreadRloc16
                | Property::ThreadRouterTable
                | Property::Ipv6LlAddr
                | Property::Ipv6MlAddr
                | Property::Ipv6AddressTable
        )
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Property::LastStatus => "status of the most recent operation",
            Property::ProtocolVersion => "Spinel protocol version",
            Property::NcpVersion => "RCP firmware version string",
            Property::InterfaceType => "network protocol type",
            Property::Caps => "capability list",
            Property::HwAddr => "factory-assigned EUI-64",
            Property::PhyEnabled => "radio enabled flag",
            Property::PhyChan => "current radio channel",
            Property::PhyChanSupported => "channels supported by the radio",
            Property::PhyTxPower => "transmit power in dBm",
            Property::PhyRssi => "most recent RSSI reading",
            Property::MacScanState => "current scan state",
            Property::MacScanMask => "channel mask for scanning",
            Property::Mac154Laddr => "802.15.4 extended address",
            Property::Mac154Saddr => "802.15.4 short address",
            Property::Mac154PanId => "802.15.4 PAN identifier",
            Property::NetSaved => "saved network configuration flag",
            Property::NetIfUp => "network interface up/down",
            Property::NetStackUp => "Thread stack up/down",
            Property::NetRole => "device role in the network",
            Property::NetNetworkName => "network name",
            Property::NetXpanId => "extended PAN identifier",
            Property::NetNetworkKey => "network master key",
            Property::NetKeySequence => "key sequence counter",
            Property::NetState => "device connection state",
            Property::ThreadLeaderAddr => "mesh-local address of the leader",
            Property::ThreadParent => "parent of this device",
            Property::ThreadChildTable => "child table",
            Property::ThreadLeaderRid => "leader router id",
            Property::ThreadRloc16 => "this device's RLOC16",
            Property::ThreadRouterTable => "router table",
            Property::Ipv6LlAddr => "link-local address",
            Property::Ipv6MlAddr => "mesh-local address",
            Property::Ipv6AddressTable => "IPv6 address table",
            Property::StreamDebug => "debug output stream",
            Property::StreamRaw => "raw 802.15.4 frame stream",
            Property::StreamNet => "network packet stream",
            Property::Unknown(_) => "unknown property",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Unknown(code) => write!(f, "unknown (0x{code:02X})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for prop in ALL_PROPERTIES {
            assert_eq!(Property::from_code(prop.code()), prop);
            assert_eq!(Property::from_name(prop.name()), prop);
        }
    }

    #[test]
    fn test_unknown_code_passes_through() {
        let prop = Property::from_code(0x4D);
        assert_eq!(prop, Property::Unknown(0x4D));
        assert_eq!(prop.code(), 0x4D);
    }

    #[test]
    fn test_unknown_name_falls_back_to_last_status() {
        let prop = Property::from_name("phy_warp_factor");
        assert_eq!(prop, Property::LastStatus);
        assert_eq!(prop.code(), 0x00);
    }

    #[test]
    fn test_category_from_code_and_name_agree() {
        for prop in ALL_PROPERTIES {
            assert_eq!(
                prop.category(),
                PropertyCategory::from_name(prop.name()),
                "category mismatch for {}",
                prop.name()
            );
        }
    }

    #[test]
    fn test_category_ranges() {
        assert_eq!(PropertyCategory::from_code(0x00), PropertyCategory::Core);
        assert_eq!(PropertyCategory::from_code(0x0F), PropertyCategory::Core);
        assert_eq!(PropertyCategory::from_code(0x71), PropertyCategory::Phy);
        assert_eq!(PropertyCategory::from_code(0x9F), PropertyCategory::Mac);
        assert_eq!(PropertyCategory::from_code(0xA8), PropertyCategory::Net);
        assert_eq!(PropertyCategory::from_code(0xC2), PropertyCategory::Thread);
        assert_eq!(PropertyCategory::from_code(0xE0), PropertyCategory::Ipv6);
        assert_eq!(PropertyCategory::from_code(0xFF), PropertyCategory::Stream);
    }

    #[test]
    fn test_writability() {
        assert!(Property::NetNetworkKey.is_writable());
        assert!(Property::NetIfUp.is_writable());
        assert!(Property::PhyChan.is_writable());
        assert!(!Property::LastStatus.is_writable());
        assert!(!Property::ThreadRouterTable.is_writable());
        assert!(!Property::NetRole.is_writable());
    }

    #[test]
    fn test_all_codes_unique() {
        for (i, a) in ALL_PROPERTIES.iter().enumerate() {
            for b in &ALL_PROPERTIES[i + 1..] {
                assert_ne!(a.code(), b.code(), "{} and {} share a code", a, b);
            }
        }
    }
}
