//! Request/response correlator for one RCP connection.
//!
//! [`SpinelClient`] is a cheap cloneable handle; the real work happens in a
//! single worker task that exclusively owns the link, the frame
//! accumulator, the 4-bit TID counter, and the pending-request map. All
//! state is touched only from the worker's own execution context, so there
//! are never concurrent writers to the transport and the TID space is
//! never shared.
//!
//! Request flow:
//!
//! 1. A caller's operation is queued to the worker with a oneshot reply.
//! 2. The worker builds a frame with the current TID, writes it, arms a
//!    deadline timer, records the pending entry, and advances the TID
//!    counter mod 16. A failed write replies immediately and leaves the
//!    counter alone.
//! 3. Incoming frames resolve pending entries by TID; frames with no
//!    pending entry are unsolicited and fan out as [`ProtocolEvent`]s.
//! 4. A deadline firing resolves the entry with [`ClientError::Timeout`];
//!    a late reply after that is discarded, since the TID may already be
//!    reused.
//!
//! Every pending entry resolves exactly once: success, protocol error,
//! timeout, or worker shutdown.

use std::collections::HashMap;
use std::time::Duration;

use spinel_protocol::{
    decode_uint8, Command, DeviceRole, DeviceState, Frame, Property, Status,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::ClientError;
use crate::framing::FrameAccumulator;
use crate::link::RcpLink;

/// Default deadline for a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the worker's request queue.
const REQUEST_QUEUE_DEPTH: usize = 32;

/// Capacity of the protocol event channel.
const EVENT_CHANNEL_DEPTH: usize = 64;

/// Unsolicited protocol notifications published by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// The device reported a new connection state.
    StateChanged(DeviceState),
    /// The device reported a new mesh role.
    RoleChanged(DeviceRole),
}

/// Operations a caller can queue to the worker.
#[derive(Debug)]
enum Op {
    Reset,
    Get(Property),
    Set(Property, Vec<u8>),
}

struct Request {
    op: Op,
    reply: oneshot::Sender<Result<Vec<u8>, ClientError>>,
}

/// Handle to a spawned correlator worker.
#[derive(Clone)]
pub struct SpinelClient {
    requests: mpsc::Sender<Request>,
    events: broadcast::Sender<ProtocolEvent>,
}

impl SpinelClient {
    /// Spawn a worker for the given link with the default request timeout.
    pub fn spawn(link: RcpLink) -> Self {
        Self::spawn_with_timeout(link, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Spawn a worker for the given link with a custom request timeout.
    pub fn spawn_with_timeout(link: RcpLink, timeout: Duration) -> Self {
        let (req_tx, req_rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_DEPTH);
        let worker = Worker::new(link, req_rx, event_tx.clone(), timeout);
        tokio::spawn(worker.run());
        SpinelClient {
            requests: req_tx,
            events: event_tx,
        }
    }

    /// Subscribe to unsolicited protocol events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProtocolEvent> {
        self.events.subscribe()
    }

    /// Reset the RCP, waiting for its acknowledgement.
    pub async fn reset(&self) -> Result<Vec<u8>, ClientError> {
        self.call(Op::Reset).await
    }

    /// Read a property value.
    pub async fn get_property(&self, property: Property) -> Result<Vec<u8>, ClientError> {
        self.call(Op::Get(property)).await
    }

    /// Write a property value.
    pub async fn set_property(
        &self,
        property: Property,
        value: &[u8],
    ) -> Result<Vec<u8>, ClientError> {
        self.call(Op::Set(property, value.to_vec())).await
    }

    async fn call(&self, op: Op) -> Result<Vec<u8>, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(Request {
                op,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ClientError::Closed)?;
        reply_rx.await.map_err(|_| ClientError::Closed)?
    }
}

/// A request awaiting its response or deadline.
struct Pending {
    /// Distinguishes this entry from earlier uses of the same TID, so a
    /// stale deadline cannot resolve a newer request.
    seq: u64,
    command: Command,
    timer: JoinHandle<()>,
    reply: oneshot::Sender<Result<Vec<u8>, ClientError>>,
}

struct Worker {
    link: RcpLink,
    framing: FrameAccumulator,
    requests: mpsc::Receiver<Request>,
    events: broadcast::Sender<ProtocolEvent>,
    timeout: Duration,
    deadline_tx: mpsc::Sender<(u8, u64)>,
    deadline_rx: mpsc::Receiver<(u8, u64)>,
    pending: HashMap<u8, Pending>,
    next_tid: u8,
    next_seq: u64,
}

impl Worker {
    fn new(
        link: RcpLink,
        requests: mpsc::Receiver<Request>,
        events: broadcast::Sender<ProtocolEvent>,
        timeout: Duration,
    ) -> Self {
        let (deadline_tx, deadline_rx) = mpsc::channel(16);
        Worker {
            link,
            framing: FrameAccumulator::new(),
            requests,
            events,
            timeout,
            deadline_tx,
            deadline_rx,
            pending: HashMap::new(),
            next_tid: 0,
            next_seq: 0,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
                chunk = self.link.recv() => match chunk {
                    Some(chunk) => self.handle_chunk(&chunk),
                    None => {
                        debug!("rcp link closed, stopping worker");
                        break;
                    }
                },
                Some((tid, seq)) = self.deadline_rx.recv() => {
                    self.handle_deadline(tid, seq);
                }
            }
        }
        // Connection teardown resolves every remaining entry.
        for (_, entry) in self.pending.drain() {
            entry.timer.abort();
            let _ = entry.reply.send(Err(ClientError::Closed));
        }
    }

    async fn handle_request(&mut self, request: Request) {
        let tid = self.next_tid;
        if self.pending.contains_key(&tid) {
            // All 16 TIDs would collide here; reuse before resolution is
            // forbidden, so the caller gets an immediate error.
            let _ = request.reply.send(Err(ClientError::TidBusy(tid)));
            return;
        }

        let frame = match &request.op {
            Op::Reset => Frame::reset(tid),
            Op::Get(property) => Frame::prop_get(*property, tid),
            Op::Set(property, value) => Frame::prop_set(*property, value, tid),
        };
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                let _ = request.reply.send(Err(e.into()));
                return;
            }
        };

        trace!(tid, command = %frame.command, "sending request");
        if let Err(e) = self.link.write(&frame.encode()).await {
            // Write failure: reply now, no pending entry, counter untouched.
            let _ = request.reply.send(Err(e));
            return;
        }
        metrics::counter!("threadbr_frames_tx").increment(1);

        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline_tx = self.deadline_tx.clone();
        let timeout = self.timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = deadline_tx.send((tid, seq)).await;
        });

        self.pending.insert(
            tid,
            Pending {
                seq,
                command: frame.command,
                timer,
                reply: request.reply,
            },
        );
        self.next_tid = (tid + 1) & 0x0F;
    }

    fn handle_chunk(&mut self, chunk: &[u8]) {
        self.framing.push(chunk);
        while let Some(frame) = self.framing.next_frame() {
            metrics::counter!("threadbr_frames_rx").increment(1);
            self.handle_frame(frame);
        }
    }

    fn handle_frame(&mut self, frame: Frame) {
        let tid = frame.tid();
        match self.pending.remove(&tid) {
            Some(entry) => {
                entry.timer.abort();
                if !entry.command.valid_pair(frame.command) {
                    warn!(
                        tid,
                        request = %entry.command,
                        response = %frame.command,
                        "unexpected response command for request"
                    );
                }
                let _ = entry.reply.send(resolve_response(&frame));
            }
            None => self.handle_unsolicited(frame),
        }
    }

    fn handle_unsolicited(&mut self, frame: Frame) {
        if frame.command != Command::PropValueIs {
            debug!(tid = frame.tid(), command = %frame.command, "ignoring unsolicited frame");
            return;
        }
        match frame.property() {
            Some(Property::NetState) => match decode_state_byte(&frame) {
                Ok(state) => {
                    trace!(?state, "device state changed");
                    let _ = self.events.send(ProtocolEvent::StateChanged(state));
                }
                Err(e) => warn!("bad net_state event payload: {e}"),
            },
            Some(Property::NetRole) => match decode_role_byte(&frame) {
                Ok(role) => {
                    trace!(?role, "device role changed");
                    let _ = self.events.send(ProtocolEvent::RoleChanged(role));
                }
                Err(e) => warn!("bad net_role event payload: {e}"),
            },
            Some(property) => {
                debug!(%property, "unsolicited property update ignored");
            }
            None => {
                debug!("unsolicited prop_value_is with empty payload");
            }
        }
    }

    fn handle_deadline(&mut self, tid: u8, seq: u64) {
        match self.pending.get(&tid) {
            Some(entry) if entry.seq == seq => {}
            // Stale deadline for a resolved (and possibly reused) TID.
            _ => {
                trace!(tid, seq, "ignoring stale deadline");
                return;
            }
        }
        if let Some(entry) = self.pending.remove(&tid) {
            metrics::counter!("threadbr_request_timeouts").increment(1);
            debug!(tid, "request deadline expired");
            let _ = entry.reply.send(Err(ClientError::Timeout));
        }
    }
}

/// Turn a response frame into the caller's result.
///
/// A `prop_value_is` for `last_status` decodes its status byte: error
/// statuses become [`ClientError::Protocol`], success statuses (including
/// reset causes) resolve with the remaining payload. Any other
/// `prop_value_is` resolves with the property-stripped value, and other
/// response commands pass their payload through raw.
fn resolve_response(frame: &Frame) -> Result<Vec<u8>, ClientError> {
    if frame.command != Command::PropValueIs {
        return Ok(frame.payload.clone());
    }
    match frame.property() {
        Some(Property::LastStatus) => {
            let (code, rest) = decode_uint8(frame.value()?)?;
            let status = Status::from(code);
            if status.is_success() {
                Ok(rest.to_vec())
            } else {
                Err(ClientError::Protocol(status))
            }
        }
        Some(_) => Ok(frame.value()?.to_vec()),
        None => Err(ClientError::Spinel(spinel_protocol::SpinelError::NoValue)),
    }
}

fn decode_state_byte(frame: &Frame) -> Result<DeviceState, ClientError> {
    let (code, _) = decode_uint8(frame.value()?)?;
    Ok(DeviceState::from(code))
}

fn decode_role_byte(frame: &Frame) -> Result<DeviceRole, ClientError> {
    let (code, _) = decode_uint8(frame.value()?)?;
    Ok(DeviceRole::from(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinel_protocol::PROP_LAST_STATUS;

    #[test]
    fn test_resolve_prop_value_is_strips_property() {
        let frame = Frame::new(Command::PropValueIs, vec![0x71, 15], 1).unwrap();
        assert_eq!(resolve_response(&frame), Ok(vec![15]));
    }

    #[test]
    fn test_resolve_last_status_error() {
        let frame =
            Frame::new(Command::PropValueIs, vec![PROP_LAST_STATUS, 3], 1).unwrap();
        assert_eq!(
            resolve_response(&frame),
            Err(ClientError::Protocol(Status::InvalidArgument))
        );
    }

    #[test]
    fn test_resolve_last_status_reset_is_success() {
        let frame =
            Frame::new(Command::PropValueIs, vec![PROP_LAST_STATUS, 114], 1).unwrap();
        assert_eq!(resolve_response(&frame), Ok(Vec::new()));
    }

    #[test]
    fn test_resolve_other_commands_pass_payload_through() {
        let frame = Frame::new(Command::PropValueInserted, vec![1, 2, 3], 1).unwrap();
        assert_eq!(resolve_response(&frame), Ok(vec![1, 2, 3]));
    }
}
