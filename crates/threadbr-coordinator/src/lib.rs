//! Network coordinator for the threadbr border router stack.
//!
//! The coordinator is the top-level orchestrator over one RCP connection:
//! it attaches and detaches a network configuration through the
//! [`threadbr_client::SpinelClient`], runs the periodic topology-discovery
//! and joiner-expiry loops while attached, and reacts to protocol events
//! by advancing the network record's role state machine in the record
//! store.
//!
//! Like the client, the coordinator is a handle plus one spawned worker
//! task; several coordinators (one per RCP) can coexist against the same
//! store.

mod config;
mod coordinator;
mod error;
mod topology;

pub use config::*;
pub use coordinator::*;
pub use error::*;
pub use topology::*;
