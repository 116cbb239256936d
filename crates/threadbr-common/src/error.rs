//! Error types for the record-storage boundary.

use thiserror::Error;

use crate::state::{JoinerAction, JoinerState, NetworkRole, RoleAction};

/// Errors returned by [`crate::RecordStore`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with the given key.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The requested role transition is not in the transition graph.
    #[error("invalid transition: {from} --{action}--> ?")]
    InvalidTransition {
        /// Role the network record is currently in.
        from: NetworkRole,
        /// Action that was attempted.
        action: RoleAction,
    },

    /// The requested joiner transition is not in the commissioning graph.
    #[error("invalid joiner transition: {from} --{action}--> ?")]
    InvalidJoinerTransition {
        /// State the joiner record is currently in.
        from: JoinerState,
        /// Action that was attempted.
        action: JoinerAction,
    },

    /// A record failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
}
