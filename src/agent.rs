//! Agent specifier parsing and connection.
//!
//! An agent is written `[transport:]host[:port]`. The transport picks both
//! the socket type and the address family:
//!
//! | prefix                      | socket | family |
//! |-----------------------------|--------|--------|
//! | `udp`                       | UDP    | IPv4   |
//! | `tcp`                       | TCP    | IPv4   |
//! | `udp6`, `udpv6`, `udpipv6`  | UDP    | IPv6   |
//! | `tcp6`, `tcpv6`, `tcpipv6`  | TCP    | IPv6   |
//!
//! Any other prefix is taken as the hostname, so `router:1161` is UDP over
//! IPv4 to port 1161.

use crate::error::{Error, Result, UsageErrorKind};
use crate::transport::{TcpTransport, Transport, UdpTransport};
use std::net::SocketAddr;
use std::time::Duration;

/// Default agent port for requests.
pub const DEFAULT_PORT: u16 = 161;

/// Default port for notifications.
pub const DEFAULT_TRAP_PORT: u16 = 162;

/// Socket type of an agent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

/// Address family an agent hostname must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    fn matches(self, addr: &SocketAddr) -> bool {
        match self {
            Family::V4 => addr.is_ipv4(),
            Family::V6 => addr.is_ipv6(),
        }
    }
}

/// A parsed agent specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub protocol: Protocol,
    pub family: Family,
    pub host: String,
    pub port: u16,
}

impl AgentSpec {
    /// Parse `[transport:]host[:port]`, using `default_port` when no port is
    /// given.
    pub fn parse(spec: &str, default_port: u16) -> Result<Self> {
        let invalid = || Error::usage(UsageErrorKind::InvalidAgent);

        let Some((prefix, rest)) = spec.split_once(':') else {
            return Self::build(Protocol::Udp, Family::V4, spec, None, default_port);
        };

        let (protocol, family) = match prefix.to_ascii_lowercase().as_str() {
            "udp" => (Protocol::Udp, Family::V4),
            "tcp" => (Protocol::Tcp, Family::V4),
            "udp6" | "udpv6" | "udpipv6" => (Protocol::Udp, Family::V6),
            "tcp6" | "tcpv6" | "tcpipv6" => (Protocol::Tcp, Family::V6),
            _ => {
                // Not a transport: `host:port`.
                return Self::build(Protocol::Udp, Family::V4, prefix, Some(rest), default_port);
            }
        };

        let (host, port) = match family {
            Family::V4 => match rest.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (rest, None),
            },
            Family::V6 => {
                if let Some(bracketed) = rest.strip_prefix('[') {
                    let (host, tail) = bracketed.split_once(']').ok_or_else(invalid)?;
                    (host, tail.strip_prefix(':'))
                } else {
                    let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
                    (host, Some(port))
                }
            }
        };

        Self::build(protocol, family, host, port, default_port)
    }

    fn build(
        protocol: Protocol,
        family: Family,
        host: &str,
        port: Option<&str>,
        default_port: u16,
    ) -> Result<Self> {
        if host.is_empty() {
            return Err(Error::usage(UsageErrorKind::InvalidAgent));
        }
        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| Error::usage(UsageErrorKind::InvalidAgent))?,
            None => default_port,
        };
        Ok(Self {
            protocol,
            family,
            host: host.to_string(),
            port,
        })
    }

    /// Resolve the host and pick the first address of the wanted family.
    pub async fn resolve(&self) -> Result<SocketAddr> {
        let addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| Error::Io {
                target: None,
                source: e,
            })?;

        let mut addrs = addrs.filter(|addr| self.family.matches(addr));
        let addr = addrs.next().ok_or_else(|| Error::Io {
            target: None,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no {:?} address for {}", self.family, self.host),
            ),
        })?;

        tracing::debug!(
            target: "snmpc::agent",
            { snmp.host = %self.host, snmp.target = %addr, snmp.protocol = ?self.protocol },
            "resolved agent"
        );
        Ok(addr)
    }

    /// Resolve and open the transport. `timeout` bounds the TCP handshake.
    pub async fn connect(&self, timeout: Duration) -> Result<Connection> {
        let addr = self.resolve().await?;
        match self.protocol {
            Protocol::Udp => Ok(Connection::Udp(UdpTransport::connect(addr).await?)),
            Protocol::Tcp => Ok(Connection::Tcp(TcpTransport::connect(addr, timeout).await?)),
        }
    }
}

/// An open transport to an agent.
#[derive(Clone)]
pub enum Connection {
    Udp(UdpTransport),
    Tcp(TcpTransport),
}

impl Connection {
    pub fn peer_addr(&self) -> SocketAddr {
        match self {
            Connection::Udp(t) => t.peer_addr(),
            Connection::Tcp(t) => t.peer_addr(),
        }
    }
}
