//! Spinel command registry.
//!
//! Commands fall into two groups:
//!
//! - **Requests** (host → RCP): `CMD_RESET` and the `CMD_PROP_VALUE_GET` /
//!   `SET` / `INSERT` / `REMOVE` family. Each request expects exactly one
//!   response command on the same transaction ID.
//! - **Responses** (RCP → host): the `CMD_PROP_VALUE_IS` / `INSERTED` /
//!   `REMOVED` family, sent either as a reply or unsolicited.
//!
//! Command codes the registry does not know pass through as
//! [`Command::Unknown`] so frames from newer protocol revisions still
//! decode; an unrecognized symbolic name falls back to `CMD_NOOP` rather
//! than failing the encoder.

// ============================================================================
// Command codes
// ============================================================================

/// No operation.
pub const CMD_NOOP: u8 = 0x00;
/// Reset the RCP.
pub const CMD_RESET: u8 = 0x01;
/// Read a property value.
pub const CMD_PROP_VALUE_GET: u8 = 0x02;
/// Write a property value.
pub const CMD_PROP_VALUE_SET: u8 = 0x03;
/// Insert an entry into a list-valued property.
pub const CMD_PROP_VALUE_INSERT: u8 = 0x04;
/// Remove an entry from a list-valued property.
pub const CMD_PROP_VALUE_REMOVE: u8 = 0x05;
/// Property value report (reply to get/set/reset, or unsolicited).
pub const CMD_PROP_VALUE_IS: u8 = 0x06;
/// List entry inserted (reply to insert).
pub const CMD_PROP_VALUE_INSERTED: u8 = 0x07;
/// List entry removed (reply to remove).
pub const CMD_PROP_VALUE_REMOVED: u8 = 0x08;

/// Spinel commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// No operation.
    Noop,
    /// Reset the RCP.
    Reset,
    /// Read a property value.
    PropValueGet,
    /// Write a property value.
    PropValueSet,
    /// Insert an entry into a list-valued property.
    PropValueInsert,
    /// Remove an entry from a list-valued property.
    PropValueRemove,
    /// Property value report.
    PropValueIs,
    /// List entry inserted.
    PropValueInserted,
    /// List entry removed.
    PropValueRemoved,
    /// Command code from a protocol revision this registry does not know.
    Unknown(u8),
}

impl Command {
    /// Get the command code for this command.
    pub fn code(&self) -> u8 {
        match self {
            Command::Noop => CMD_NOOP,
            Command::Reset => CMD_RESET,
            Command::PropValueGet => CMD_PROP_VALUE_GET,
            Command::PropValueSet => CMD_PROP_VALUE_SET,
            Command::PropValueInsert => CMD_PROP_VALUE_INSERT,
            Command::PropValueRemove => CMD_PROP_VALUE_REMOVE,
            Command::PropValueIs => CMD_PROP_VALUE_IS,
            Command::PropValueInserted => CMD_PROP_VALUE_INSERTED,
            Command::PropValueRemoved => CMD_PROP_VALUE_REMOVED,
            Command::Unknown(code) => *code,
        }
    }

    /// Look up a command by code. Unrecognized codes pass through unchanged.
    pub fn from_code(code: u8) -> Self {
        match code {
            CMD_NOOP => Command::Noop,
            CMD_RESET => Command::Reset,
            CMD_PROP_VALUE_GET => Command::PropValueGet,
            CMD_PROP_VALUE_SET => Command::PropValueSet,
            CMD_PROP_VALUE_INSERT => Command::PropValueInsert,
            CMD_PROP_VALUE_REMOVE => Command::PropValueRemove,
            CMD_PROP_VALUE_IS => Command::PropValueIs,
            CMD_PROP_VALUE_INSERTED => Command::PropValueInserted,
            CMD_PROP_VALUE_REMOVED => Command::PropValueRemoved,
            other => Command::Unknown(other),
        }
    }

    /// Look up a command by symbolic name.
    ///
    /// Unrecognized names map to [`Command::Noop`]: malformed input must
    /// never crash the encoder.
    pub fn from_name(name: &str) -> Self {
        match name {
            "noop" => Command::Noop,
            "reset" => Command::Reset,
            "prop_value_get" => Command::PropValueGet,
            "prop_value_set" => Command::PropValueSet,
            "prop_value_insert" => Command::PropValueInsert,
            "prop_value_remove" => Command::PropValueRemove,
            "prop_value_is" => Command::PropValueIs,
            "prop_value_inserted" => Command::PropValueInserted,
            "prop_value_removed" => Command::PropValueRemoved,
            other => {
                log::warn!("unknown command name {other:?}, falling back to noop");
                Command::Noop
            }
        }
    }

    /// Get the symbolic name for this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Noop => "noop",
            Command::Reset => "reset",
            Command::PropValueGet => "prop_value_get",
            Command::PropValueSet => "prop_value_set",
            Command::PropValueInsert => "prop_value_insert",
            Command::PropValueRemove => "prop_value_remove",
            Command::PropValueIs => "prop_value_is",
            Command::PropValueInserted => "prop_value_inserted",
            Command::PropValueRemoved => "prop_value_removed",
            Command::Unknown(_) => "unknown",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Command::Noop => "no operation",
            Command::Reset => "reset the RCP",
            Command::PropValueGet => "read a property value",
            Command::PropValueSet => "write a property value",
            Command::PropValueInsert => "insert into a list-valued property",
            Command::PropValueRemove => "remove from a list-valued property",
            Command::PropValueIs => "property value report",
            Command::PropValueInserted => "list entry inserted",
            Command::PropValueRemoved => "list entry removed",
            Command::Unknown(_) => "unknown command",
        }
    }

    /// Whether this command is a host → RCP request that expects a reply.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Command::Reset
                | Command::PropValueGet
                | Command::PropValueSet
                | Command::PropValueInsert
                | Command::PropValueRemove
        )
    }

    /// Whether this command is an RCP → host response.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Command::PropValueIs | Command::PropValueInserted | Command::PropValueRemoved
        )
    }

    /// The response command expected for this request, if it is one.
    pub fn expected_response(&self) -> Option<Command> {
        match self {
            Command::Reset | Command::PropValueGet | Command::PropValueSet => {
                Some(Command::PropValueIs)
            }
            Command::PropValueInsert => Some(Command::PropValueInserted),
            Command::PropValueRemove => Some(Command::PropValueRemoved),
            _ => None,
        }
    }

    /// Whether `response` is the reply expected for this request.
    pub fn valid_pair(&self, response: Command) -> bool {
        self.expected_response() == Some(response)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Unknown(code) => write!(f, "unknown (0x{code:02X})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [Command; 9] = [
        Command::Noop,
        Command::Reset,
        Command::PropValueGet,
        Command::PropValueSet,
        Command::PropValueInsert,
        Command::PropValueRemove,
        Command::PropValueIs,
        Command::PropValueInserted,
        Command::PropValueRemoved,
    ];

    #[test]
    fn test_code_round_trip() {
        for cmd in KNOWN {
            assert_eq!(Command::from_code(cmd.code()), cmd);
            assert_eq!(Command::from_name(cmd.name()), cmd);
        }
    }

    #[test]
    fn test_unknown_code_passes_through() {
        let cmd = Command::from_code(0x42);
        assert_eq!(cmd, Command::Unknown(0x42));
        assert_eq!(cmd.code(), 0x42);
        assert!(!cmd.is_request());
        assert!(!cmd.is_response());
    }

    #[test]
    fn test_unknown_name_falls_back_to_noop() {
        assert_eq!(Command::from_name("prop_value_frobnicate"), Command::Noop);
        assert_eq!(Command::from_name(""), Command::Noop);
    }

    #[test]
    fn test_request_response_classification() {
        for cmd in KNOWN {
            // Noop is neither; every other known command is exactly one of the two.
            if cmd == Command::Noop {
                assert!(!cmd.is_request() && !cmd.is_response());
            } else {
                assert_ne!(cmd.is_request(), cmd.is_response());
            }
        }
    }

    #[test]
    fn test_expected_response_pairs() {
        assert!(Command::Reset.valid_pair(Command::PropValueIs));
        assert!(Command::PropValueGet.valid_pair(Command::PropValueIs));
        assert!(Command::PropValueSet.valid_pair(Command::PropValueIs));
        assert!(Command::PropValueInsert.valid_pair(Command::PropValueInserted));
        assert!(Command::PropValueRemove.valid_pair(Command::PropValueRemoved));

        assert!(!Command::PropValueGet.valid_pair(Command::PropValueInserted));
        assert!(!Command::PropValueIs.valid_pair(Command::PropValueIs));
        assert!(!Command::Noop.valid_pair(Command::PropValueIs));
    }
}
