//! Request building.
//!
//! A [`Request`] describes one round trip: the operation, the OIDs it asks
//! about and any mode-specific parameters. It is checked against the session
//! version before anything is sent, then turned into a fresh [`Pdu`] per
//! attempt so every retry carries its own request id.

use crate::error::{Error, Result, UsageErrorKind};
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::varbind::VarBind;
use crate::version::Version;

/// One protocol exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Get {
        oids: Vec<Oid>,
    },
    GetNext {
        oids: Vec<Oid>,
    },
    GetBulk {
        oids: Vec<Oid>,
        non_repeaters: u32,
        max_repetitions: u32,
    },
    Trap {
        /// sysUpTime.0 in hundredths of a second.
        uptime: u32,
        trap_oid: Oid,
        varbinds: Vec<VarBind>,
    },
}

impl Request {
    pub fn get(oids: impl Into<Vec<Oid>>) -> Self {
        Request::Get { oids: oids.into() }
    }

    pub fn get_next(oids: impl Into<Vec<Oid>>) -> Self {
        Request::GetNext { oids: oids.into() }
    }

    pub fn get_bulk(oids: impl Into<Vec<Oid>>, non_repeaters: u32, max_repetitions: u32) -> Self {
        Request::GetBulk {
            oids: oids.into(),
            non_repeaters,
            max_repetitions,
        }
    }

    pub fn trap(uptime: u32, trap_oid: Oid, varbinds: Vec<VarBind>) -> Self {
        Request::Trap {
            uptime,
            trap_oid,
            varbinds,
        }
    }

    /// Operation name used in logs and transport error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Get { .. } => "get",
            Request::GetNext { .. } => "getnext",
            Request::GetBulk { .. } => "getbulk",
            Request::Trap { .. } => "trap",
        }
    }

    /// OIDs an error index refers to, in request order.
    ///
    /// Traps have none: nothing is ever answered.
    pub fn requested_oids(&self) -> &[Oid] {
        match self {
            Request::Get { oids } | Request::GetNext { oids } | Request::GetBulk { oids, .. } => {
                oids
            }
            Request::Trap { .. } => &[],
        }
    }

    /// Whether the agent answers this request.
    pub fn expects_response(&self) -> bool {
        !matches!(self, Request::Trap { .. })
    }

    /// Reject requests the session version or the OID count cannot carry.
    pub fn validate(&self, version: Version) -> Result<()> {
        match self {
            Request::GetBulk {
                oids,
                non_repeaters,
                ..
            } => {
                if !version.supports_v2_pdus() {
                    return Err(Error::usage(UsageErrorKind::V2PduOnV1));
                }
                if *non_repeaters as usize > oids.len() {
                    return Err(Error::usage(UsageErrorKind::TooFewObjects {
                        non_repeaters: *non_repeaters,
                        oids: oids.len(),
                    }));
                }
            }
            Request::Trap { .. } if !version.supports_v2_pdus() => {
                return Err(Error::usage(UsageErrorKind::TrapOnV1));
            }
            _ => {}
        }
        Ok(())
    }

    /// Build the PDU for one attempt.
    pub fn to_pdu(&self, request_id: i32) -> Pdu {
        match self {
            Request::Get { oids } => Pdu::get_request(request_id, oids),
            Request::GetNext { oids } => Pdu::get_next_request(request_id, oids),
            Request::GetBulk {
                oids,
                non_repeaters,
                max_repetitions,
            } => Pdu::get_bulk(
                request_id,
                oids,
                clamp_i32(*non_repeaters),
                clamp_i32(*max_repetitions),
            ),
            Request::Trap {
                uptime,
                trap_oid,
                varbinds,
            } => Pdu::trap_v2(request_id, *uptime, trap_oid, varbinds),
        }
    }
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
