//! Agent session: request ids, timeout and retry.
//!
//! A [`Session`] owns one transport and the [`SessionConfig`] it was opened
//! with. Every round trip goes through [`Session::execute`], which encodes a
//! fresh PDU per attempt, waits for the matching reply and hands it to the
//! response interpreter.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tracing::{Span, instrument};

use crate::error::{Error, Result, UsageErrorKind};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::request::Request;
use crate::response::{Expected, Interpreted, Response, interpret};
use crate::transport::Transport;
use crate::varbind::VarBind;
use crate::version::Version;

/// Per-agent protocol settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// SNMP version (default: V2c)
    pub version: Version,
    /// Community string (default: "public")
    pub community: Bytes,
    /// Wait per attempt (default: 1 second)
    pub timeout: Duration,
    /// Extra attempts after a timeout on datagram transports (default: 5)
    pub retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: Version::V2c,
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_secs(1),
            retries: 5,
        }
    }
}

/// A session with one agent.
///
/// Cheap to clone; clones share the transport and the request id counter.
#[derive(Clone)]
pub struct Session<T: Transport> {
    inner: Arc<SessionInner<T>>,
}

struct SessionInner<T: Transport> {
    transport: T,
    config: SessionConfig,
    next_request_id: AtomicI32,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                transport,
                config,
                next_request_id: AtomicI32::new(initial_request_id()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn version(&self) -> Version {
        self.inner.config.version
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.transport.peer_addr()
    }

    /// Allocate a positive request id.
    fn next_request_id(&self) -> i32 {
        loop {
            let id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
            if id > 0 {
                return id;
            }
            // Wrapped past i32::MAX; restart at 1
            let _ = self.inner.next_request_id.compare_exchange(
                id.wrapping_add(1),
                1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }
    }

    fn encode(&self, request: &Request, request_id: i32) -> Bytes {
        let pdu = request.to_pdu(request_id);
        CommunityMessage::new(
            self.inner.config.version,
            self.inner.config.community.clone(),
            pdu,
        )
        .encode()
    }

    /// GET the given OIDs.
    pub async fn get(&self, oids: &[Oid]) -> Result<Response> {
        self.execute(&Request::get(oids)).await
    }

    /// GETNEXT the given OIDs.
    pub async fn get_next(&self, oids: &[Oid]) -> Result<Response> {
        self.execute(&Request::get_next(oids)).await
    }

    /// GETBULK the given OIDs. Fails with a usage error on v1 sessions.
    pub async fn get_bulk(
        &self,
        oids: &[Oid],
        non_repeaters: u32,
        max_repetitions: u32,
    ) -> Result<Response> {
        self.execute(&Request::get_bulk(oids, non_repeaters, max_repetitions))
            .await
    }

    /// Send a TRAPv2. Nothing is received.
    #[instrument(
        level = "debug",
        skip_all,
        fields(snmp.target = %self.peer_addr(), snmp.trap_oid = %trap_oid, snmp.varbind_count = varbinds.len())
    )]
    pub async fn trap(&self, uptime: u32, trap_oid: &Oid, varbinds: &[VarBind]) -> Result<()> {
        let request = Request::trap(uptime, trap_oid.clone(), varbinds.to_vec());
        request.validate(self.inner.config.version)?;

        let data = self.encode(&request, self.next_request_id());
        tracing::trace!(target: "snmpc::session", { snmp.bytes = data.len() }, "sending trap");
        self.inner.transport.send(&data).await
    }

    /// Run one request/response exchange.
    ///
    /// Datagram transports get `retries` extra attempts after a timeout, each
    /// with a fresh request id. Replies carrying another request id are
    /// dropped and the wait continues until the attempt's deadline.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            snmp.target = %self.peer_addr(),
            snmp.request = request.name(),
            snmp.request_id = tracing::field::Empty,
            snmp.attempt = tracing::field::Empty,
        )
    )]
    pub async fn execute(&self, request: &Request) -> Result<Response> {
        let config = &self.inner.config;
        if !request.expects_response() {
            return Err(Error::usage(UsageErrorKind::Unconfirmed));
        }
        request.validate(config.version)?;

        let transport = &self.inner.transport;
        let max_retries = if transport.is_stream() {
            0
        } else {
            config.retries
        };
        let start = Instant::now();
        let mut request_id = 0;

        for attempt in 0..=max_retries {
            request_id = self.next_request_id();
            Span::current().record("snmp.attempt", attempt);
            Span::current().record("snmp.request_id", request_id);
            if attempt > 0 {
                tracing::debug!(target: "snmpc::session", "retrying request");
            }

            let data = self.encode(request, request_id);
            tracing::trace!(target: "snmpc::session", { snmp.bytes = data.len() }, "sending request");
            transport.send(&data).await?;

            let expected = Expected {
                version: config.version,
                request_id,
                requested: request.requested_oids(),
                source: Some(transport.peer_addr()),
            };
            match self.wait_for_reply(&expected).await {
                Ok(response) => {
                    tracing::debug!(
                        target: "snmpc::session",
                        { snmp.varbind_count = response.varbinds.len(), snmp.error_status = %response.status },
                        "received response"
                    );
                    return Ok(response);
                }
                Err(Error::Timeout { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        let elapsed = start.elapsed();
        tracing::debug!(target: "snmpc::session", { snmp.request_id = request_id, ?elapsed, snmp.retries = max_retries }, "request timed out");
        Err(Error::Timeout {
            target: Some(transport.peer_addr()),
            elapsed,
            request_id,
            retries: max_retries,
        })
    }

    async fn wait_for_reply(&self, expected: &Expected<'_>) -> Result<Response> {
        let transport = &self.inner.transport;
        let deadline = Instant::now() + self.inner.config.timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout {
                    target: expected.source,
                    elapsed: self.inner.config.timeout,
                    request_id: expected.request_id,
                    retries: 0,
                });
            }

            let (data, _source) = transport.recv(expected.request_id, remaining).await?;
            match interpret(data, expected)? {
                Interpreted::Reply(response) => return Ok(response),
                Interpreted::Stale { request_id } => {
                    tracing::warn!(
                        target: "snmpc::session",
                        { snmp.expected_request_id = expected.request_id, snmp.actual_request_id = request_id },
                        "discarding reply with mismatched request id"
                    );
                }
            }
        }
    }
}

/// Starting request id, varied per process so restarts do not reuse ids.
fn initial_request_id() -> i32 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let mixed = nanos ^ std::process::id().rotate_left(16);
    // Keep well clear of i32::MAX so a session never wraps in practice
    (mixed & 0x3FFF_FFFF) as i32 + 1
}
