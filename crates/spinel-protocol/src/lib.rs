//! Spinel protocol for controlling an 802.15.4 radio co-processor (RCP).
//!
//! This crate provides types and utilities for speaking the Spinel host
//! protocol over a serial link to RCP firmware. A Spinel frame is a header
//! byte, a command byte, and a command-specific payload:
//!
//! | Field   | Size (bytes) | Description                                    |
//! |---------|--------------|------------------------------------------------|
//! | header  | 1            | Bit 7 set (host direction), bits 0-3 carry TID.|
//! | command | 1            | Command code (`CMD_*`).                        |
//! | payload | variable     | Command-specific data, no length prefix.       |
//!
//! There is no length field and no CRC: frame boundaries are recovered by
//! the transport layer, and link integrity is the serial line's problem.
//!
//! Commands are either **requests** (host → RCP, correlated to a reply by
//! the 4-bit transaction ID) or **responses** (RCP → host, solicited or
//! not). Property access commands carry a property code as the first
//! payload byte, followed by a value in one of the primitive field formats
//! (fixed-width little-endian integers, packed-length-prefixed strings and
//! byte blobs, fixed-size addresses).
//!
//! # Example
//!
//! ```rust,ignore
//! use spinel_protocol::{Command, Frame, Property};
//!
//! let frame = Frame::prop_get(Property::PhyChan, 3)?;
//! let bytes = frame.encode();
//!
//! let reply = Frame::decode(&received)?;
//! assert_eq!(reply.command, Command::PropValueIs);
//! ```

mod commands;
mod encoder;
mod error;
mod frame;
mod properties;
mod status;
mod types;

pub use commands::*;
pub use encoder::*;
pub use error::*;
pub use frame::*;
pub use properties::*;
pub use status::*;
pub use types::*;
