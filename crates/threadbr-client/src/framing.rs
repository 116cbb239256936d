//! Frame-boundary recovery for the serial byte stream.
//!
//! Spinel frames carry no length field, so boundaries are implicit: the
//! accumulator repeatedly decodes from the front of its buffer and derives
//! each frame's consumed length from the decoded structure by re-encoding
//! it. After corruption or a partial frame it resynchronizes by scanning
//! for the next byte with the high bit set (a plausible header), dropping
//! everything before it.
//!
//! Resynchronization is best-effort: malformed runs are silently dropped,
//! and a garbage byte with the high bit set can swallow the frame behind
//! it. Callers must not assume frame delivery is lossless.

use bytes::{Buf, BytesMut};
use spinel_protocol::Frame;
use tracing::debug;

/// Minimum buffered bytes before a failed decode triggers resync rather
/// than waiting for more data.
const RESYNC_THRESHOLD: usize = 3;

/// Accumulates raw serial bytes and yields decoded frames.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    buffer: BytesMut,
}

impl FrameAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add received bytes to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next frame from the buffer.
    ///
    /// Returns `None` when the buffer holds no decodable frame yet; call
    /// again after the next [`push`](Self::push).
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            if self.buffer.is_empty() {
                return None;
            }
            match Frame::decode(&self.buffer) {
                Ok(frame) => {
                    // No length field on the wire: the consumed byte count
                    // comes from re-encoding the decoded structure.
                    self.buffer.advance(frame.encoded_len());
                    return Some(frame);
                }
                Err(_) if self.buffer.len() >= RESYNC_THRESHOLD => {
                    // Scan for the next plausible header and retry.
                    match self.buffer.iter().position(|&b| b & 0x80 != 0) {
                        Some(pos) => {
                            debug!("resync: dropped {pos} bytes before next header");
                            metrics::counter!("threadbr_frame_resyncs").increment(1);
                            self.buffer.advance(pos);
                        }
                        None => {
                            debug!("resync: dropped {} headerless bytes", self.buffer.len());
                            metrics::counter!("threadbr_frame_resyncs").increment(1);
                            self.buffer.clear();
                            return None;
                        }
                    }
                }
                // Fewer than 3 bytes: possibly an incomplete frame, wait.
                Err(_) => return None,
            }
        }
    }

    /// Number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
