//! Status codes and device-reported state/role decodings.
//!
//! A `prop_value_is` frame for `last_status` carries one status byte from
//! the table below. Statuses 112-127 are reset causes; the RCP acknowledges
//! a reset request with one of them, so they count as success when
//! resolving a pending call.

// ============================================================================
// Status codes
// ============================================================================

/// Operation completed successfully.
pub const STATUS_OK: u8 = 0;
/// Operation failed for an unspecified reason.
pub const STATUS_FAILURE: u8 = 1;
/// Command or property not implemented.
pub const STATUS_UNIMPLEMENTED: u8 = 2;
/// An argument was invalid.
pub const STATUS_INVALID_ARGUMENT: u8 = 3;
/// Operation illegal in the current state.
pub const STATUS_INVALID_STATE: u8 = 4;
/// Command not recognized.
pub const STATUS_INVALID_COMMAND: u8 = 5;
/// Interface not supported.
pub const STATUS_INVALID_INTERFACE: u8 = 6;
/// Internal RCP error.
pub const STATUS_INTERNAL_ERROR: u8 = 7;
/// Security or authentication error.
pub const STATUS_SECURITY_ERROR: u8 = 8;
/// Could not parse the command.
pub const STATUS_PARSE_ERROR: u8 = 9;
/// Resource already in use.
pub const STATUS_IN_USE: u8 = 10;
/// Out of memory.
pub const STATUS_NOMEM: u8 = 11;
/// RCP busy, retry later.
pub const STATUS_BUSY: u8 = 12;
/// Already in the requested state.
pub const STATUS_ALREADY: u8 = 13;
/// Item not found.
pub const STATUS_ITEM_NOT_FOUND: u8 = 14;
/// Frame was dropped.
pub const STATUS_DROPPED: u8 = 15;
/// Start of the reset-cause status range.
pub const STATUS_RESET_BEGIN: u8 = 112;
/// End (inclusive) of the reset-cause status range.
pub const STATUS_RESET_END: u8 = 127;

/// Status codes returned by the RCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Operation completed successfully.
    Ok,
    /// Operation failed for an unspecified reason.
    Failure,
    /// Command or property not implemented.
    Unimplemented,
    /// An argument was invalid.
    InvalidArgument,
    /// Operation illegal in the current state.
    InvalidState,
    /// Command not recognized.
    InvalidCommand,
    /// Interface not supported.
    InvalidInterface,
    /// Internal RCP error.
    InternalError,
    /// Security or authentication error.
    SecurityError,
    /// Could not parse the command.
    ParseError,
    /// Resource already in use.
    InUse,
    /// Out of memory.
    NoMem,
    /// RCP busy, retry later.
    Busy,
    /// Already in the requested state.
    Already,
    /// Item not found.
    ItemNotFound,
    /// Frame was dropped.
    Dropped,
    /// The RCP reset; the payload byte carries the cause.
    Reset(u8),
    /// Unknown status code.
    Unknown(u8),
}

impl Status {
    /// Whether this status acknowledges a successful operation.
    ///
    /// Reset causes acknowledge a reset request, so they count as success.
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Ok | Status::Reset(_))
    }
}

impl From<u8> for Status {
    fn from(code: u8) -> Self {
        match code {
            STATUS_OK => Status::Ok,
            STATUS_FAILURE => Status::Failure,
            STATUS_UNIMPLEMENTED => Status::Unimplemented,
            STATUS_INVALID_ARGUMENT => Status::InvalidArgument,
            STATUS_INVALID_STATE => Status::InvalidState,
            STATUS_INVALID_COMMAND => Status::InvalidCommand,
            STATUS_INVALID_INTERFACE => Status::InvalidInterface,
            STATUS_INTERNAL_ERROR => Status::InternalError,
            STATUS_SECURITY_ERROR => Status::SecurityError,
            STATUS_PARSE_ERROR => Status::ParseError,
            STATUS_IN_USE => Status::InUse,
            STATUS_NOMEM => Status::NoMem,
            STATUS_BUSY => Status::Busy,
            STATUS_ALREADY => Status::Already,
            STATUS_ITEM_NOT_FOUND => Status::ItemNotFound,
            STATUS_DROPPED => Status::Dropped,
            STATUS_RESET_BEGIN..=STATUS_RESET_END => Status::Reset(code),
            other => Status::Unknown(other),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => STATUS_OK,
            Status::Failure => STATUS_FAILURE,
            Status::Unimplemented => STATUS_UNIMPLEMENTED,
            Status::InvalidArgument => STATUS_INVALID_ARGUMENT,
            Status::InvalidState => STATUS_INVALID_STATE,
            Status::InvalidCommand => STATUS_INVALID_COMMAND,
            Status::InvalidInterface => STATUS_INVALID_INTERFACE,
            Status::InternalError => STATUS_INTERNAL_ERROR,
            Status::SecurityError => STATUS_SECURITY_ERROR,
            Status::ParseError => STATUS_PARSE_ERROR,
            Status::InUse => STATUS_IN_USE,
            Status::NoMem => STATUS_NOMEM,
            Status::Busy => STATUS_BUSY,
            Status::Already => STATUS_ALREADY,
            Status::ItemNotFound => STATUS_ITEM_NOT_FOUND,
            Status::Dropped => STATUS_DROPPED,
            Status::Reset(code) => code,
            Status::Unknown(code) => code,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Failure => write!(f, "failure"),
            Status::Unimplemented => write!(f, "unimplemented"),
            Status::InvalidArgument => write!(f, "invalid argument"),
            Status::InvalidState => write!(f, "invalid state"),
            Status::InvalidCommand => write!(f, "invalid command"),
            Status::InvalidInterface => write!(f, "invalid interface"),
            Status::InternalError => write!(f, "internal error"),
            Status::SecurityError => write!(f, "security error"),
            Status::ParseError => write!(f, "parse error"),
            Status::InUse => write!(f, "in use"),
            Status::NoMem => write!(f, "out of memory"),
            Status::Busy => write!(f, "busy"),
            Status::Already => write!(f, "already in requested state"),
            Status::ItemNotFound => write!(f, "item not found"),
            Status::Dropped => write!(f, "frame dropped"),
            Status::Reset(code) => write!(f, "reset (cause 0x{code:02X})"),
            Status::Unknown(code) => write!(f, "unknown status (0x{code:02X})"),
        }
    }
}

// ============================================================================
// Device-reported state and role
// ============================================================================

/// Connection state reported in `net_state` property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    /// Interface down, not participating.
    Offline,
    /// Interface up but no parent or partition.
    Detached,
    /// Attempting to join a network.
    Joining,
    /// Attached to a partition.
    Attached,
    /// Attached and fully operational.
    Active,
    /// Unknown state code.
    Unknown(u8),
}

impl From<u8> for DeviceState {
    fn from(code: u8) -> Self {
        match code {
            0 => DeviceState::Offline,
            1 => DeviceState::Detached,
            2 => DeviceState::Joining,
            3 => DeviceState::Attached,
            4 => DeviceState::Active,
            other => DeviceState::Unknown(other),
        }
    }
}

impl From<DeviceState> for u8 {
    fn from(state: DeviceState) -> Self {
        match state {
            DeviceState::Offline => 0,
            DeviceState::Detached => 1,
            DeviceState::Joining => 2,
            DeviceState::Attached => 3,
            DeviceState::Active => 4,
            DeviceState::Unknown(code) => code,
        }
    }
}

/// Mesh role reported in `net_role` property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    /// Thread disabled.
    Disabled,
    /// Not attached to any partition.
    Detached,
    /// Attached as a child.
    Child,
    /// Acting as a router.
    Router,
    /// Acting as the partition leader.
    Leader,
    /// Unknown role code.
    Unknown(u8),
}

impl From<u8> for DeviceRole {
    fn from(code: u8) -> Self {
        match code {
            0 => DeviceRole::Disabled,
            1 => DeviceRole::Detached,
            2 => DeviceRole::Child,
            3 => DeviceRole::Router,
            4 => DeviceRole::Leader,
            other => DeviceRole::Unknown(other),
        }
    }
}

impl From<DeviceRole> for u8 {
    fn from(role: DeviceRole) -> Self {
        match role {
            DeviceRole::Disabled => 0,
            DeviceRole::Detached => 1,
            DeviceRole::Child => 2,
            DeviceRole::Router => 3,
            DeviceRole::Leader => 4,
            DeviceRole::Unknown(code) => code,
        }
    }
}
