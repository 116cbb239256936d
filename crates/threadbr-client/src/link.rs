//! Byte-chunk link to an RCP.
//!
//! The RCP's serial port is exposed to the host as a byte stream; this
//! module bridges that stream onto a pair of bounded channels so the client
//! worker can `select!` over received chunks. The production path connects
//! over TCP (serial ports are commonly bridged to TCP sockets by the
//! supervisor); tests use an in-memory pair.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::ClientError;

/// Channel depth for each direction of a link.
const LINK_CHANNEL_DEPTH: usize = 256;

/// Read buffer size for the TCP bridge.
const READ_BUF_SIZE: usize = 1024;

/// A bidirectional byte-chunk link to an RCP.
pub struct RcpLink {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
}

impl RcpLink {
    /// Connect to an RCP whose serial port is bridged to a TCP socket.
    ///
    /// Spawns a reader task and a writer task that shuttle bytes between
    /// the socket and the link's channels; both exit when the socket
    /// closes or the link is dropped.
    pub async fn connect_tcp<A: ToSocketAddrs>(addr: A) -> io::Result<RcpLink> {
        let stream = TcpStream::connect(addr).await?;
        let (mut read_half, mut write_half) = stream.into_split();

        let (out_tx, mut out_rx) = mpsc::channel::<Vec<u8>>(LINK_CHANNEL_DEPTH);
        let (in_tx, in_rx) = mpsc::channel::<Vec<u8>>(LINK_CHANNEL_DEPTH);

        tokio::spawn(async move {
            while let Some(data) = out_rx.recv().await {
                if let Err(e) = write_half.write_all(&data).await {
                    debug!("rcp link write failed: {e}");
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut buf = [0u8; READ_BUF_SIZE];
            loop {
                match read_half.read(&mut buf).await {
                    Ok(0) => {
                        debug!("rcp link closed by peer");
                        break;
                    }
                    Ok(n) => {
                        if in_tx.send(buf[..n].to_vec()).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("rcp link read failed: {e}");
                        break;
                    }
                }
            }
        });

        Ok(RcpLink {
            tx: out_tx,
            rx: in_rx,
        })
    }

    /// Create a connected pair of in-memory links.
    ///
    /// Bytes written to one side arrive as a received chunk on the other.
    pub fn pair() -> (RcpLink, RcpLink) {
        let (a_tx, b_rx) = mpsc::channel(LINK_CHANNEL_DEPTH);
        let (b_tx, a_rx) = mpsc::channel(LINK_CHANNEL_DEPTH);
        (
            RcpLink { tx: a_tx, rx: a_rx },
            RcpLink { tx: b_tx, rx: b_rx },
        )
    }

    /// Write a chunk of bytes to the device.
    pub async fn write(&self, data: &[u8]) -> Result<(), ClientError> {
        self.tx
            .send(data.to_vec())
            .await
            .map_err(|_| ClientError::Transport("link closed".to_string()))
    }

    /// Receive the next chunk of bytes from the device.
    ///
    /// Returns `None` once the link has closed.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_round_trip() {
        let (host, mut device) = RcpLink::pair();
        host.write(&[0x80, 0x01]).await.unwrap();
        assert_eq!(device.recv().await.unwrap(), vec![0x80, 0x01]);
    }

    #[tokio::test]
    async fn test_write_after_peer_drop_fails() {
        let (host, device) = RcpLink::pair();
        drop(device);
        assert!(matches!(
            host.write(&[0x80, 0x01]).await,
            Err(ClientError::Transport(_))
        ));
    }
}
