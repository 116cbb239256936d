//! Transport framing and request/response correlation for Spinel RCPs.
//!
//! This crate turns a raw byte-chunk link to a radio co-processor into a
//! typed request/response client:
//!
//! - [`RcpLink`] moves byte chunks to and from the device (TCP-bridged
//!   serial in production, an in-memory pair in tests).
//! - [`FrameAccumulator`] recovers frame boundaries from the chunk stream,
//!   resynchronizing past garbage after corruption or partial frames.
//! - [`SpinelClient`] owns the 4-bit transaction-ID space and a single
//!   serialized worker task: it writes request frames, tracks one pending
//!   call per TID with a deadline, matches responses by TID regardless of
//!   arrival order, and fans unsolicited frames out as [`ProtocolEvent`]s.
//!
//! One client instance exclusively owns one link and its TID space; run one
//! client per physical RCP connection.

mod client;
mod error;
mod framing;
mod link;

pub use client::*;
pub use error::*;
pub use framing::*;
pub use link::*;
