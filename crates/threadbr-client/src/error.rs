//! Client error types.

use spinel_protocol::{SpinelError, Status};
use thiserror::Error;

/// Errors surfaced by [`crate::SpinelClient`] operations.
///
/// Neither timeouts nor transport errors are retried here; retry policy is
/// the caller's responsibility.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Writing to or opening the transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// No response arrived within the request deadline.
    #[error("request timed out")]
    Timeout,

    /// The RCP answered with an explicit error status.
    #[error("RCP returned status: {0}")]
    Protocol(Status),

    /// Malformed wire data in a response.
    #[error(transparent)]
    Spinel(#[from] SpinelError),

    /// The next transaction ID still has a request in flight.
    #[error("transaction id {0} still in flight")]
    TidBusy(u8),

    /// The client worker has shut down.
    #[error("client worker stopped")]
    Closed,
}
