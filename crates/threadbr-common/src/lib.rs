//! Common types and contracts for the threadbr border router stack.
//!
//! This crate owns the domain model shared between the coordinator and the
//! record-storage layer: network, device, and joiner records; the network
//! role state machine and the joiner commissioning state machine; and the
//! [`RecordStore`] trait that defines the storage boundary. An in-memory
//! store implementation is included for tests and the demo host.

mod error;
mod records;
mod state;
mod store;

pub use error::*;
pub use records::*;
pub use state::*;
pub use store::*;
