//! Mock transport for testing.
//!
//! Answers from a queue of scripted replies and records every request, so
//! session and walk behaviour can be tested without a network.

use super::Transport;
use crate::error::{Error, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A scripted reply.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this data with its request id patched to the last request's.
    Data(Bytes),
    /// Return this data as-is, e.g. to test stale request ids.
    RawData(Bytes),
    /// Simulate a timeout.
    Timeout,
    /// Simulate an IO error.
    IoError(String),
}

/// A request sent through the mock transport.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub data: Bytes,
    /// The decoded message, if the bytes were a valid community message.
    pub message: Option<CommunityMessage>,
}

impl RecordedRequest {
    pub fn pdu(&self) -> Option<&Pdu> {
        self.message.as_ref().map(|m| &m.pdu)
    }
}

struct MockTransportInner {
    target: SocketAddr,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
    last_request_id: Option<i32>,
}

/// Scripted transport for tests.
///
/// An empty queue behaves like a silent agent and times out.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
    stream: bool,
}

impl MockTransport {
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                target,
                responses: VecDeque::new(),
                requests: Vec::new(),
                last_request_id: None,
            })),
            stream: false,
        }
    }

    /// Make the mock report itself as a stream transport (no retries).
    pub fn as_stream(mut self) -> Self {
        self.stream = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a reply whose request id is patched to match the request.
    pub fn queue_response(&self, data: impl Into<Bytes>) {
        self.state()
            .responses
            .push_back(MockResponse::Data(data.into()));
    }

    /// Queue a reply returned byte for byte.
    pub fn queue_raw_response(&self, data: impl Into<Bytes>) {
        self.state()
            .responses
            .push_back(MockResponse::RawData(data.into()));
    }

    pub fn queue_timeout(&self) {
        self.state().responses.push_back(MockResponse::Timeout);
    }

    pub fn queue_io_error(&self, msg: impl Into<String>) {
        self.state()
            .responses
            .push_back(MockResponse::IoError(msg.into()));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn queued_response_count(&self) -> usize {
        self.state().responses.len()
    }

    fn patch_request_id(data: Bytes, request_id: i32) -> Bytes {
        match CommunityMessage::decode(data.clone()) {
            Ok(mut msg) => {
                msg.pdu.request_id = request_id;
                msg.encode()
            }
            Err(_) => data,
        }
    }
}

impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        let data = Bytes::copy_from_slice(data);
        let message = CommunityMessage::decode(data.clone()).ok();

        let mut state = self.state();
        state.last_request_id = message.as_ref().map(|m| m.pdu.request_id);
        state.requests.push(RecordedRequest { data, message });
        Ok(())
    }

    async fn recv(&self, request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let (response, target, last_request_id) = {
            let mut state = self.state();
            (
                state.responses.pop_front(),
                state.target,
                state.last_request_id,
            )
        };

        match response {
            Some(MockResponse::Data(data)) => {
                let data = match last_request_id {
                    Some(id) => Self::patch_request_id(data, id),
                    None => data,
                };
                Ok((data, target))
            }
            Some(MockResponse::RawData(data)) => Ok((data, target)),
            Some(MockResponse::IoError(msg)) => Err(Error::Io {
                target: Some(target),
                source: std::io::Error::other(msg),
            }),
            Some(MockResponse::Timeout) | None => Err(Error::Timeout {
                target: Some(target),
                elapsed: timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.state().target
    }

    fn local_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    fn is_stream(&self) -> bool {
        self.stream
    }
}

/// Builder for scripted RESPONSE messages.
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    error_status: i32,
    error_index: i32,
}

impl ResponseBuilder {
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: 0,
            error_index: 0,
        }
    }

    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    pub fn error_status(mut self, status: i32) -> Self {
        self.error_status = status;
        self
    }

    pub fn error_index(mut self, index: i32) -> Self {
        self.error_index = index;
        self
    }

    pub fn build(self, version: Version, community: &[u8]) -> Bytes {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: self.error_status,
            error_index: self.error_index,
            varbinds: self.varbinds,
        };
        CommunityMessage::new(version, Bytes::copy_from_slice(community), pdu).encode()
    }

    pub fn build_v2c(self, community: &[u8]) -> Bytes {
        self.build(Version::V2c, community)
    }

    pub fn build_v1(self, community: &[u8]) -> Bytes {
        self.build(Version::V1, community)
    }
}
