//! Network role and joiner commissioning state machines.
//!
//! The role transition graph is the authoritative superset:
//!
//! ```text
//! detached  --attach-->        child
//! disabled  --attach-->        child
//! child     --promote-->       router
//! router    --promote-->       leader
//! child     --become_leader--> leader
//! router    --become_leader--> leader
//! router    --demote-->        child
//! leader    --demote-->        child
//! child     --detach-->        detached
//! router    --detach-->        detached
//! leader    --detach-->        detached
//! any       --disable-->       disabled
//! ```
//!
//! Any `(role, action)` pair not listed is a hard transition failure.

use serde::{Deserialize, Serialize};
use spinel_protocol::{DeviceRole, DeviceState};

use crate::error::StoreError;

// ============================================================================
// Network role
// ============================================================================

/// Role a network record can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRole {
    /// Thread disabled on the device.
    Disabled,
    /// Not attached to any partition.
    Detached,
    /// Attached as a child.
    Child,
    /// Acting as a router.
    Router,
    /// Acting as the partition leader.
    Leader,
}

/// Actions that drive the role state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleAction {
    /// Join a network as a child.
    Attach,
    /// Step up one level (child → router, router → leader).
    Promote,
    /// Jump directly to leader.
    BecomeLeader,
    /// Step down to child.
    Demote,
    /// Leave the network.
    Detach,
    /// Disable Thread entirely.
    Disable,
}

impl NetworkRole {
    /// Apply a transition action, returning the new role.
    ///
    /// Pairs outside the transition graph fail with
    /// [`StoreError::InvalidTransition`].
    pub fn apply(self, action: RoleAction) -> Result<NetworkRole, StoreError> {
        use NetworkRole::*;
        use RoleAction::*;
        match (self, action) {
            (Detached, Attach) | (Disabled, Attach) => Ok(Child),
            (Child, Promote) => Ok(Router),
            (Router, Promote) => Ok(Leader),
            (Child, BecomeLeader) | (Router, BecomeLeader) => Ok(Leader),
            (Router, Demote) | (Leader, Demote) => Ok(Child),
            (Child, Detach) | (Router, Detach) | (Leader, Detach) => Ok(Detached),
            (_, Disable) => Ok(Disabled),
            (from, action) => Err(StoreError::InvalidTransition { from, action }),
        }
    }

    /// Pick the transition toward the role the device reported, valid for
    /// the current role.
    ///
    /// The device's reported role does not map to a fixed action: a device
    /// reporting `leader` while the record is still `child` must take the
    /// child-legal `become_leader` path, and a record already in the
    /// reported role needs no transition at all. Returns `None` when there
    /// is nothing to do.
    pub fn action_toward(self, reported: DeviceRole) -> Option<RoleAction> {
        use NetworkRole::*;
        match reported {
            DeviceRole::Leader => match self {
                Child | Router => Some(RoleAction::BecomeLeader),
                Detached | Disabled => Some(RoleAction::Attach),
                Leader => None,
            },
            DeviceRole::Router => match self {
                Child => Some(RoleAction::Promote),
                Leader => Some(RoleAction::Demote),
                Detached | Disabled => Some(RoleAction::Attach),
                Router => None,
            },
            DeviceRole::Child => match self {
                Router | Leader => Some(RoleAction::Demote),
                Detached | Disabled => Some(RoleAction::Attach),
                Child => None,
            },
            DeviceRole::Detached => match self {
                Child | Router | Leader => Some(RoleAction::Detach),
                Detached | Disabled => None,
            },
            DeviceRole::Disabled => match self {
                Disabled => None,
                _ => Some(RoleAction::Disable),
            },
            DeviceRole::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for NetworkRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NetworkRole::Disabled => "disabled",
            NetworkRole::Detached => "detached",
            NetworkRole::Child => "child",
            NetworkRole::Router => "router",
            NetworkRole::Leader => "leader",
        };
        write!(f, "{name}")
    }
}

impl std::fmt::Display for RoleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoleAction::Attach => "attach",
            RoleAction::Promote => "promote",
            RoleAction::BecomeLeader => "become_leader",
            RoleAction::Demote => "demote",
            RoleAction::Detach => "detach",
            RoleAction::Disable => "disable",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Coarse connection state
// ============================================================================

/// Coarse connection state stored on the network record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Offline or detached from any partition.
    Detached,
    /// Joining a network.
    Joining,
    /// Attached to a partition.
    Attached,
    /// Attached and fully operational.
    Active,
}

impl ConnectionState {
    /// Map a device-reported state onto the coarse record state.
    ///
    /// Unknown device states have no mapping.
    pub fn from_device_state(state: DeviceState) -> Option<Self> {
        match state {
            DeviceState::Offline | DeviceState::Detached => Some(ConnectionState::Detached),
            DeviceState::Joining => Some(ConnectionState::Joining),
            DeviceState::Attached => Some(ConnectionState::Attached),
            DeviceState::Active => Some(ConnectionState::Active),
            DeviceState::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Detached => "detached",
            ConnectionState::Joining => "joining",
            ConnectionState::Attached => "attached",
            ConnectionState::Active => "active",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Joiner commissioning
// ============================================================================

/// Commissioning state of a joiner record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinerState {
    /// Registered, waiting for the device to start joining.
    Pending,
    /// Commissioning handshake in progress.
    Joining,
    /// Successfully joined.
    Joined,
    /// Commissioning failed.
    Failed,
    /// Session deadline passed before completion.
    Expired,
}

/// Actions that drive the joiner state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinerAction {
    /// The device started its commissioning handshake.
    Start,
    /// The device completed commissioning.
    Complete,
    /// Commissioning failed.
    Fail,
    /// The session deadline passed.
    Expire,
}

impl JoinerState {
    /// Apply a commissioning action, returning the new state.
    pub fn apply(self, action: JoinerAction) -> Result<JoinerState, StoreError> {
        use JoinerAction::*;
        use JoinerState::*;
        match (self, action) {
            (Pending, Start) => Ok(Joining),
            (Joining, Complete) => Ok(Joined),
            (Pending, Expire) | (Joining, Expire) => Ok(Expired),
            (Pending, Fail) | (Joining, Fail) => Ok(Failed),
            (from, action) => Err(StoreError::InvalidJoinerTransition { from, action }),
        }
    }
}

impl std::fmt::Display for JoinerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JoinerState::Pending => "pending",
            JoinerState::Joining => "joining",
            JoinerState::Joined => "joined",
            JoinerState::Failed => "failed",
            JoinerState::Expired => "expired",
        };
        write!(f, "{name}")
    }
}

impl std::fmt::Display for JoinerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JoinerAction::Start => "start",
            JoinerAction::Complete => "complete",
            JoinerAction::Fail => "fail",
            JoinerAction::Expire => "expire",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [NetworkRole; 5] = [
        NetworkRole::Disabled,
        NetworkRole::Detached,
        NetworkRole::Child,
        NetworkRole::Router,
        NetworkRole::Leader,
    ];

    const ALL_ACTIONS: [RoleAction; 6] = [
        RoleAction::Attach,
        RoleAction::Promote,
        RoleAction::BecomeLeader,
        RoleAction::Demote,
        RoleAction::Detach,
        RoleAction::Disable,
    ];

    /// The full transition graph.
    const GRAPH: [(NetworkRole, RoleAction, NetworkRole); 16] = [
        (NetworkRole::Detached, RoleAction::Attach, NetworkRole::Child),
        (NetworkRole::Disabled, RoleAction::Attach, NetworkRole::Child),
        (NetworkRole::Child, RoleAction::Promote, NetworkRole::Router),
        (NetworkRole::Router, RoleAction::Promote, NetworkRole::Leader),
        (NetworkRole::Child, RoleAction::BecomeLeader, NetworkRole::Leader),
        (NetworkRole::Router, RoleAction::BecomeLeader, NetworkRole::Leader),
        (NetworkRole::Router, RoleAction::Demote, NetworkRole::Child),
        (NetworkRole::Leader, RoleAction::Demote, NetworkRole::Child),
        (NetworkRole::Child, RoleAction::Detach, NetworkRole::Detached),
        (NetworkRole::Router, RoleAction::Detach, NetworkRole::Detached),
        (NetworkRole::Leader, RoleAction::Detach, NetworkRole::Detached),
        (NetworkRole::Disabled, RoleAction::Disable, NetworkRole::Disabled),
        (NetworkRole::Detached, RoleAction::Disable, NetworkRole::Disabled),
        (NetworkRole::Child, RoleAction::Disable, NetworkRole::Disabled),
        (NetworkRole::Router, RoleAction::Disable, NetworkRole::Disabled),
        (NetworkRole::Leader, RoleAction::Disable, NetworkRole::Disabled),
    ];

    #[test]
    fn test_listed_transitions_succeed() {
        for (from, action, to) in GRAPH {
            assert_eq!(from.apply(action), Ok(to), "{from} --{action}--> {to}");
        }
    }

    #[test]
    fn test_unlisted_transitions_fail() {
        for from in ALL_ROLES {
            for action in ALL_ACTIONS {
                let listed = GRAPH.iter().any(|&(f, a, _)| f == from && a == action);
                if !listed {
                    assert_eq!(
                        from.apply(action),
                        Err(StoreError::InvalidTransition { from, action }),
                        "{from} --{action}--> should fail"
                    );
                }
            }
        }
    }

    #[test]
    fn test_attach_promote_demote_cycle() {
        let role = NetworkRole::Detached;
        let role = role.apply(RoleAction::Attach).unwrap();
        assert_eq!(role, NetworkRole::Child);
        let role = role.apply(RoleAction::Promote).unwrap();
        assert_eq!(role, NetworkRole::Router);
        let role = role.apply(RoleAction::Promote).unwrap();
        assert_eq!(role, NetworkRole::Leader);
        let role = role.apply(RoleAction::Demote).unwrap();
        assert_eq!(role, NetworkRole::Child);
        let role = role.apply(RoleAction::Detach).unwrap();
        assert_eq!(role, NetworkRole::Detached);
    }

    #[test]
    fn test_action_toward_reported_role() {
        // Device skipped straight to leader while the record still says child.
        assert_eq!(
            NetworkRole::Child.action_toward(DeviceRole::Leader),
            Some(RoleAction::BecomeLeader)
        );
        assert_eq!(
            NetworkRole::Router.action_toward(DeviceRole::Leader),
            Some(RoleAction::BecomeLeader)
        );
        assert_eq!(NetworkRole::Leader.action_toward(DeviceRole::Leader), None);

        assert_eq!(
            NetworkRole::Child.action_toward(DeviceRole::Router),
            Some(RoleAction::Promote)
        );
        assert_eq!(
            NetworkRole::Leader.action_toward(DeviceRole::Child),
            Some(RoleAction::Demote)
        );
        assert_eq!(
            NetworkRole::Router.action_toward(DeviceRole::Detached),
            Some(RoleAction::Detach)
        );
        assert_eq!(NetworkRole::Child.action_toward(DeviceRole::Unknown(9)), None);

        // Every suggested action must be legal for the current role.
        for role in ALL_ROLES {
            for code in 0u8..=4 {
                if let Some(action) = role.action_toward(DeviceRole::from(code)) {
                    assert!(role.apply(action).is_ok(), "{role} --{action}--> must be legal");
                }
            }
        }
    }

    #[test]
    fn test_joiner_lifecycle() {
        let s = JoinerState::Pending.apply(JoinerAction::Start).unwrap();
        assert_eq!(s, JoinerState::Joining);
        let s = s.apply(JoinerAction::Complete).unwrap();
        assert_eq!(s, JoinerState::Joined);

        assert_eq!(
            JoinerState::Pending.apply(JoinerAction::Expire),
            Ok(JoinerState::Expired)
        );
        assert_eq!(
            JoinerState::Joining.apply(JoinerAction::Expire),
            Ok(JoinerState::Expired)
        );
        assert!(JoinerState::Joined.apply(JoinerAction::Expire).is_err());
        assert!(JoinerState::Expired.apply(JoinerAction::Start).is_err());
        assert!(JoinerState::Pending.apply(JoinerAction::Complete).is_err());
    }
}
