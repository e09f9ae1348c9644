//! Response interpretation.
//!
//! Decodes a reply datagram, correlates it with the outstanding request and
//! maps a non-zero error status onto the requested OID it names.

use std::net::SocketAddr;

use bytes::Bytes;

use crate::error::{Error, ErrorStatus, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::PduType;
use crate::varbind::VarBind;
use crate::version::Version;

/// What the session is waiting for.
#[derive(Debug, Clone, Copy)]
pub struct Expected<'a> {
    pub version: Version,
    pub request_id: i32,
    pub requested: &'a [Oid],
    pub source: Option<SocketAddr>,
}

/// Outcome of decoding one reply.
#[derive(Debug)]
pub enum Interpreted {
    /// The reply to the outstanding request.
    Reply(Response),
    /// A well-formed response to some other request; keep waiting.
    Stale { request_id: i32 },
}

/// An agent's answer to one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: ErrorStatus,
    /// 1-based index into the requested OIDs, 0 when unused.
    pub index: u32,
    pub requested: Vec<Oid>,
    pub varbinds: Vec<VarBind>,
    pub source: Option<SocketAddr>,
}

impl Response {
    /// True if the agent reported an error status.
    pub fn is_error(&self) -> bool {
        self.status != ErrorStatus::NoError
    }

    /// The requested OID the error index points at.
    ///
    /// `None` when the index is 0 or past the end of the request.
    pub fn offending_oid(&self) -> Option<&Oid> {
        let index = usize::try_from(self.index).ok()?;
        index.checked_sub(1).and_then(|i| self.requested.get(i))
    }

    /// The error this response carries, if any.
    pub fn error(&self) -> Option<Error> {
        if !self.is_error() {
            return None;
        }
        Some(Error::Snmp {
            target: self.source,
            status: self.status,
            index: self.index,
            oid: self.offending_oid().cloned(),
        })
    }

    /// Return the bindings, or the protocol error the agent reported.
    pub fn check(self) -> Result<Vec<VarBind>> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(self.varbinds),
        }
    }
}

/// Decode `data` and match it against the outstanding request.
pub fn interpret(data: Bytes, expected: &Expected<'_>) -> Result<Interpreted> {
    tracing::trace!(target: "snmpc::response", { snmp.bytes = data.len() }, "decoding reply");
    let message = CommunityMessage::decode(data)?;

    if message.version != expected.version {
        return Err(Error::VersionMismatch {
            expected: expected.version,
            actual: message.version,
        });
    }

    let pdu = message.pdu;
    if pdu.pdu_type != PduType::Response {
        return Err(Error::UnexpectedPdu {
            actual: pdu.pdu_type.tag(),
        });
    }

    if pdu.request_id != expected.request_id {
        return Ok(Interpreted::Stale {
            request_id: pdu.request_id,
        });
    }

    let response = Response {
        status: ErrorStatus::from_i32(pdu.error_status),
        // Negative indices cannot point at anything
        index: u32::try_from(pdu.error_index).unwrap_or(0),
        requested: expected.requested.to_vec(),
        varbinds: pdu.varbinds,
        source: expected.source,
    };

    if response.is_error() {
        tracing::debug!(
            target: "snmpc::response",
            { snmp.request_id = expected.request_id, snmp.error_status = %response.status, snmp.error_index = response.index },
            "agent returned error status"
        );
    }

    Ok(Interpreted::Reply(response))
}
