//! TCP transport implementation.
//!
//! SNMP over TCP has no extra framing: each message is one BER SEQUENCE whose
//! definite length says where it ends.
//!
//! ```text
//! +------+--------+------------+
//! | 0x30 | Length |  Content   |
//! +------+--------+------------+
//!   Tag   1-5 bytes  N bytes
//! ```

use super::{MAX_MESSAGE_SIZE, Transport};
use crate::ber::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// TCP transport for a single agent.
///
/// The session never retries over TCP: a timeout means the connection is
/// unusable.
#[derive(Clone)]
pub struct TcpTransport {
    inner: Arc<TcpTransportInner>,
}

struct TcpTransportInner {
    stream: Mutex<TcpStream>,
    target: SocketAddr,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Connect, giving up after `connect_timeout`.
    pub async fn connect(target: SocketAddr, connect_timeout: Duration) -> Result<Self> {
        tracing::debug!(target: "snmpc::transport", { snmp.target = %target }, "connecting TCP transport");

        let stream = timeout(connect_timeout, TcpStream::connect(target))
            .await
            .map_err(|_| Error::Timeout {
                target: Some(target),
                elapsed: connect_timeout,
                request_id: 0,
                retries: 0,
            })?
            .map_err(|e| Error::Io {
                target: Some(target),
                source: e,
            })?;

        let local_addr = stream.local_addr().map_err(|e| Error::Io {
            target: Some(target),
            source: e,
        })?;

        Ok(Self {
            inner: Arc::new(TcpTransportInner {
                stream: Mutex::new(stream),
                target,
                local_addr,
            }),
        })
    }
}

impl Transport for TcpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "snmpc::transport",
            { snmp.target = %self.inner.target, snmp.bytes = data.len() },
            "TCP send"
        );
        let mut stream = self.inner.stream.lock().await;
        let io_err = |e| Error::Io {
            target: Some(self.inner.target),
            source: e,
        };
        stream.write_all(data).await.map_err(io_err)?;
        stream.flush().await.map_err(io_err)?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, recv_timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut stream = self.inner.stream.lock().await;
        let target = self.inner.target;

        match timeout(recv_timeout, read_message(&mut stream, target)).await {
            Ok(Ok(data)) => {
                tracing::trace!(
                    target: "snmpc::transport",
                    { snmp.target = %target, snmp.bytes = data.len() },
                    "TCP recv complete"
                );
                Ok((data, target))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::Timeout {
                target: Some(target),
                elapsed: recv_timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    fn is_stream(&self) -> bool {
        true
    }
}

/// Read exactly one BER SEQUENCE from the stream.
///
/// The claimed length is checked against [`MAX_MESSAGE_SIZE`] before the body
/// is allocated.
async fn read_message(stream: &mut TcpStream, target: SocketAddr) -> Result<Bytes> {
    let io_err = |e| Error::Io {
        target: Some(target),
        source: e,
    };

    let mut head = [0u8; 2];
    stream.read_exact(&mut head).await.map_err(io_err)?;

    if head[0] != tag::universal::SEQUENCE {
        return Err(Error::decode(
            0,
            DecodeErrorKind::UnexpectedTag {
                expected: tag::universal::SEQUENCE,
                actual: head[0],
            },
        ));
    }

    let mut message = BytesMut::with_capacity(16);
    message.put_slice(&head);

    let content_len = match head[1] {
        short if short < 0x80 => usize::from(short),
        0x80 => return Err(Error::decode(1, DecodeErrorKind::IndefiniteLength)),
        long => {
            let octets = usize::from(long & 0x7F);
            if octets > 4 {
                return Err(Error::decode(1, DecodeErrorKind::LengthTooLong { octets }));
            }
            let mut len_buf = [0u8; 4];
            stream
                .read_exact(&mut len_buf[..octets])
                .await
                .map_err(io_err)?;
            message.put_slice(&len_buf[..octets]);
            len_buf[..octets]
                .iter()
                .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
        }
    };

    if content_len > MAX_MESSAGE_SIZE {
        return Err(Error::MessageTooLarge {
            size: content_len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let start = message.len();
    message.resize(start + content_len, 0);
    stream
        .read_exact(&mut message[start..])
        .await
        .map_err(io_err)?;

    Ok(message.freeze())
}
