//! Coordinator error types.

use spinel_protocol::Property;
use thiserror::Error;
use threadbr_client::ClientError;
use threadbr_common::{NetworkId, StoreError};

/// Errors surfaced by [`crate::Coordinator`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// A network is already attached; detach it first.
    #[error("already attached to network {0}")]
    AlreadyAttached(NetworkId),

    /// A configuration step of `attach_network` failed.
    ///
    /// The step's error is surfaced verbatim; earlier steps are rolled
    /// back best-effort (`thread_stop`, `interface_down`) before this is
    /// returned.
    #[error("configuration step {property} failed: {source}")]
    AttachStep {
        /// Property whose set/get failed.
        property: Property,
        /// The underlying client error.
        source: ClientError,
    },

    /// The record store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The coordinator worker has shut down.
    #[error("coordinator worker stopped")]
    Closed,
}
