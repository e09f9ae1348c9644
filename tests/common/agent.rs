//! In-memory agent for integration tests.
//!
//! `FakeAgent` implements [`Transport`] directly: every request sent through
//! it is decoded and answered from a sorted table, and the reply is queued
//! for the next `recv`. Replies can be overridden to script misbehaving
//! agents.

use bytes::Bytes;
use snmpc::message::CommunityMessage;
use snmpc::pdu::{Pdu, PduType};
use snmpc::{Error, Oid, Result, Transport, Value, VarBind, Version};
use std::collections::{BTreeMap, VecDeque};
use std::net::SocketAddr;
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A scripted deviation from the table.
#[derive(Debug, Clone)]
enum Script {
    /// Answer with these bindings.
    Bindings(Vec<VarBind>),
    /// Answer with this error status and index, echoing the request bindings.
    Status { status: i32, index: i32 },
    /// Do not answer.
    Silence,
}

struct State {
    table: BTreeMap<Oid, Value>,
    scripts: VecDeque<Script>,
    replies: VecDeque<Bytes>,
    requests: Vec<Pdu>,
}

#[derive(Clone)]
pub struct FakeAgent {
    state: Arc<Mutex<State>>,
    addr: SocketAddr,
}

impl FakeAgent {
    pub fn new(table: impl IntoIterator<Item = (Oid, Value)>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                table: table.into_iter().collect(),
                scripts: VecDeque::new(),
                replies: VecDeque::new(),
                requests: Vec::new(),
            })),
            addr: "192.0.2.1:161".parse().unwrap(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer the next request with exactly these bindings.
    pub fn script_bindings(&self, varbinds: Vec<VarBind>) {
        self.state().scripts.push_back(Script::Bindings(varbinds));
    }

    /// Answer the next request with an error status.
    pub fn script_status(&self, status: i32, index: i32) {
        self.state()
            .scripts
            .push_back(Script::Status { status, index });
    }

    /// Drop the next request.
    pub fn script_silence(&self) {
        self.state().scripts.push_back(Script::Silence);
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<Pdu> {
        self.state().requests.clone()
    }

    fn lookup_next(table: &BTreeMap<Oid, Value>, oid: &Oid) -> Option<VarBind> {
        table
            .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
            .next()
            .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
    }

    fn next_or_end(table: &BTreeMap<Oid, Value>, oid: &Oid) -> VarBind {
        Self::lookup_next(table, oid)
            .unwrap_or_else(|| VarBind::new(oid.clone(), Value::EndOfMibView))
    }

    fn answer(table: &BTreeMap<Oid, Value>, pdu: &Pdu) -> Vec<VarBind> {
        let oids: Vec<Oid> = pdu.varbinds.iter().map(|vb| vb.oid.clone()).collect();
        match pdu.pdu_type {
            PduType::GetRequest => oids
                .iter()
                .map(|oid| match table.get(oid) {
                    Some(value) => VarBind::new(oid.clone(), value.clone()),
                    None => VarBind::new(oid.clone(), Value::NoSuchObject),
                })
                .collect(),
            PduType::GetNextRequest => oids
                .iter()
                .map(|oid| Self::next_or_end(table, oid))
                .collect(),
            PduType::GetBulkRequest => {
                let non_repeaters = (pdu.error_status.max(0) as usize).min(oids.len());
                let max_repetitions = pdu.error_index.max(0) as usize;
                let (singles, repeaters) = oids.split_at(non_repeaters);

                let mut out: Vec<VarBind> = singles
                    .iter()
                    .map(|oid| Self::next_or_end(table, oid))
                    .collect();
                let mut cursors: Vec<Oid> = repeaters.to_vec();
                for _ in 0..max_repetitions {
                    if cursors.is_empty() {
                        break;
                    }
                    for cursor in cursors.iter_mut() {
                        let vb = Self::next_or_end(table, cursor);
                        *cursor = vb.oid.clone();
                        out.push(vb);
                    }
                    if out.iter().rev().take(cursors.len()).all(|vb| vb.is_exception()) {
                        break;
                    }
                }
                out
            }
            _ => Vec::new(),
        }
    }
}

impl Transport for FakeAgent {
    async fn send(&self, data: &[u8]) -> Result<()> {
        let message = CommunityMessage::decode(Bytes::copy_from_slice(data))?;
        let mut state = self.state();
        state.requests.push(message.pdu.clone());

        if message.pdu.pdu_type == PduType::TrapV2 {
            return Ok(());
        }

        let (varbinds, status, index) = match state.scripts.pop_front() {
            Some(Script::Silence) => return Ok(()),
            Some(Script::Bindings(varbinds)) => (varbinds, 0, 0),
            Some(Script::Status { status, index }) => (message.pdu.varbinds.clone(), status, index),
            None => (Self::answer(&state.table, &message.pdu), 0, 0),
        };

        let reply = Pdu {
            pdu_type: PduType::Response,
            request_id: message.pdu.request_id,
            error_status: status,
            error_index: index,
            varbinds,
        };
        let encoded = CommunityMessage::new(message.version, message.community, reply).encode();
        state.replies.push_back(encoded);
        Ok(())
    }

    async fn recv(&self, request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        match self.state().replies.pop_front() {
            Some(reply) => Ok((reply, self.addr)),
            None => Err(Error::Timeout {
                target: Some(self.addr),
                elapsed: timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    fn local_addr(&self) -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn is_stream(&self) -> bool {
        false
    }
}

/// A session against `agent` with fast timeouts and no retries.
pub fn fake_session(agent: &FakeAgent, version: Version) -> snmpc::Session<FakeAgent> {
    snmpc::Session::new(
        agent.clone(),
        snmpc::SessionConfig {
            version,
            retries: 0,
            timeout: Duration::from_millis(50),
            ..snmpc::SessionConfig::default()
        },
    )
}
