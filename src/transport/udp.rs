//! UDP transport implementation.

use super::{MAX_MESSAGE_SIZE, Transport};
use crate::error::{Error, Result};
use crate::util::bind_ephemeral_udp_socket;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// UDP transport for a single agent.
///
/// Owns a connected socket, so datagrams from other sources never reach
/// `recv`.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    socket: UdpSocket,
    target: SocketAddr,
    local_addr: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral socket in the target's family and connect it.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        tracing::debug!(target: "snmpc::transport", { snmp.target = %target }, "connecting UDP transport");

        let io_err = |e| Error::Io {
            target: Some(target),
            source: e,
        };

        let socket = bind_ephemeral_udp_socket(target).map_err(io_err)?;
        socket.connect(target).await.map_err(io_err)?;
        let local_addr = socket.local_addr().map_err(io_err)?;

        tracing::debug!(
            target: "snmpc::transport",
            { snmp.target = %target, snmp.local_addr = %local_addr },
            "UDP transport connected"
        );

        Ok(Self {
            inner: Arc::new(UdpTransportInner {
                socket,
                target,
                local_addr,
            }),
        })
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "snmpc::transport",
            { snmp.target = %self.inner.target, snmp.bytes = data.len() },
            "UDP send"
        );
        self.inner.socket.send(data).await.map_err(|e| Error::Io {
            target: Some(self.inner.target),
            source: e,
        })?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, recv_timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_MESSAGE_SIZE];

        match timeout(recv_timeout, self.inner.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                tracing::trace!(
                    target: "snmpc::transport",
                    { snmp.target = %self.inner.target, snmp.bytes = len },
                    "UDP recv complete"
                );
                Ok((Bytes::from(buf), self.inner.target))
            }
            Ok(Err(e)) => Err(Error::Io {
                target: Some(self.inner.target),
                source: e,
            }),
            Err(_) => {
                tracing::trace!(
                    target: "snmpc::transport",
                    { snmp.target = %self.inner.target, snmp.request_id = request_id },
                    "UDP recv timeout"
                );
                Err(Error::Timeout {
                    target: Some(self.inner.target),
                    elapsed: recv_timeout,
                    request_id,
                    retries: 0,
                })
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    fn is_stream(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_over_loopback() {
        let agent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let agent_addr = agent.local_addr().unwrap();

        let transport = UdpTransport::connect(agent_addr).await.unwrap();
        assert!(!transport.is_stream());
        assert_eq!(transport.peer_addr(), agent_addr);

        transport.send(b"ping").await.unwrap();
        let mut buf = [0u8; 16];
        let (len, from) = agent.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"ping");
        agent.send_to(b"pong", from).await.unwrap();

        let (data, source) = transport.recv(1, Duration::from_secs(1)).await.unwrap();
        assert_eq!(&data[..], b"pong");
        assert_eq!(source, agent_addr);
    }

    #[tokio::test]
    async fn test_recv_times_out() {
        let agent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = UdpTransport::connect(agent.local_addr().unwrap())
            .await
            .unwrap();

        let err = transport
            .recv(7, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { request_id: 7, .. }));
    }
}
