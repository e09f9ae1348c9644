//! Protocol Data Units.
//!
//! GET, GETNEXT and GETBULK carry placeholder bindings, RESPONSE carries the
//! agent's answer and TRAPv2 carries a notification. All share one layout;
//! GETBULK reuses the error-status and error-index slots for non-repeaters
//! and max-repetitions.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// `sysUpTime.0`, first binding of every v2 trap.
pub const SYS_UPTIME: [u32; 9] = [1, 3, 6, 1, 2, 1, 1, 3, 0];

/// `snmpTrapOID.0`, second binding of every v2 trap.
pub const SNMP_TRAP_OID: [u32; 11] = [1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0];

/// PDU kinds this manager sends or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduType {
    GetRequest,
    GetNextRequest,
    Response,
    GetBulkRequest,
    TrapV2,
}

impl PduType {
    pub fn tag(self) -> u8 {
        match self {
            PduType::GetRequest => tag::pdu::GET_REQUEST,
            PduType::GetNextRequest => tag::pdu::GET_NEXT_REQUEST,
            PduType::Response => tag::pdu::RESPONSE,
            PduType::GetBulkRequest => tag::pdu::GET_BULK_REQUEST,
            PduType::TrapV2 => tag::pdu::TRAP_V2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(PduType::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(PduType::GetNextRequest),
            tag::pdu::RESPONSE => Some(PduType::Response),
            tag::pdu::GET_BULK_REQUEST => Some(PduType::GetBulkRequest),
            tag::pdu::TRAP_V2 => Some(PduType::TrapV2),
            _ => None,
        }
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PduType::GetRequest => "GetRequest",
            PduType::GetNextRequest => "GetNextRequest",
            PduType::Response => "Response",
            PduType::GetBulkRequest => "GetBulkRequest",
            PduType::TrapV2 => "SNMPv2-Trap",
        };
        f.write_str(name)
    }
}

/// A decoded or to-be-encoded PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    /// Error status, or non-repeaters for GETBULK.
    pub error_status: i32,
    /// Error index, or max-repetitions for GETBULK.
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    fn with_nulls(pdu_type: PduType, request_id: i32, oids: &[Oid]) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::with_nulls(PduType::GetRequest, request_id, oids)
    }

    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::with_nulls(PduType::GetNextRequest, request_id, oids)
    }

    pub fn get_bulk(
        request_id: i32,
        oids: &[Oid],
        non_repeaters: i32,
        max_repetitions: i32,
    ) -> Self {
        Self {
            error_status: non_repeaters,
            error_index: max_repetitions,
            ..Self::with_nulls(PduType::GetBulkRequest, request_id, oids)
        }
    }

    /// Build a TRAPv2 PDU: sysUpTime.0, snmpTrapOID.0, then `varbinds` as given.
    pub fn trap_v2(request_id: i32, uptime: u32, trap_oid: &Oid, varbinds: &[VarBind]) -> Self {
        let mut all = Vec::with_capacity(varbinds.len() + 2);
        all.push(VarBind::new(
            Oid::from_slice(&SYS_UPTIME),
            Value::TimeTicks(uptime),
        ));
        all.push(VarBind::new(
            Oid::from_slice(&SNMP_TRAP_OID),
            Value::ObjectIdentifier(trap_oid.clone()),
        ));
        all.extend_from_slice(varbinds);
        Self {
            pdu_type: PduType::TrapV2,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: all,
        }
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(i64::from(self.error_index));
            buf.push_integer(i64::from(self.error_status));
            buf.push_integer(i64::from(self.request_id));
        });
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let offset = decoder.offset();
        let tag = decoder.read_tag()?;
        let Some(pdu_type) = PduType::from_tag(tag) else {
            return Err(Error::decode(offset, DecodeErrorKind::UnknownPduType(tag)));
        };
        let len = decoder.read_length()?;
        let mut body = Decoder::new(decoder.read_bytes(len)?);

        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;
        let varbinds = decode_varbind_list(&mut body)?;

        Ok(Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn encoded(pdu: &Pdu) -> Vec<u8> {
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        buf.finish().to_vec()
    }

    #[test]
    fn test_get_request_layout() {
        let pdu = Pdu::get_request(1, &[oid!(1, 3, 6, 1)]);
        assert_eq!(
            encoded(&pdu),
            vec![
                0xA0, 0x14, // GetRequest
                0x02, 0x01, 0x01, // request-id 1
                0x02, 0x01, 0x00, // error-status
                0x02, 0x01, 0x00, // error-index
                0x30, 0x09, 0x30, 0x07, 0x06, 0x03, 0x2B, 0x06, 0x01, 0x05, 0x00,
            ]
        );
    }

    #[test]
    fn test_get_bulk_uses_status_slots() {
        let pdu = Pdu::get_bulk(7, &[oid!(1, 3, 6, 1)], 1, 25);
        let bytes = encoded(&pdu);
        assert_eq!(bytes[0], 0xA5);
        // request-id, non-repeaters, max-repetitions
        assert_eq!(&bytes[2..11], &[0x02, 0x01, 7, 0x02, 0x01, 1, 0x02, 0x01, 25]);
    }

    #[test]
    fn test_trap_binding_order() {
        let user = VarBind::new(oid!(1, 3, 6, 1, 4, 1, 9, 1), Value::Integer(3));
        let trap_oid = oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 1);
        let pdu = Pdu::trap_v2(9, 4200, &trap_oid, std::slice::from_ref(&user));

        assert_eq!(pdu.pdu_type, PduType::TrapV2);
        assert_eq!(pdu.varbinds.len(), 3);
        assert_eq!(pdu.varbinds[0].oid, Oid::from_slice(&SYS_UPTIME));
        assert_eq!(pdu.varbinds[0].value, Value::TimeTicks(4200));
        assert_eq!(pdu.varbinds[1].oid, Oid::from_slice(&SNMP_TRAP_OID));
        assert_eq!(pdu.varbinds[1].value, Value::ObjectIdentifier(trap_oid));
        assert_eq!(pdu.varbinds[2], user);
    }

    #[test]
    fn test_decode_response() {
        let response = Pdu {
            pdu_type: PduType::Response,
            request_id: 42,
            error_status: 2,
            error_index: 1,
            varbinds: vec![VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))],
        };
        let decoded = Pdu::decode(&mut Decoder::from_slice(&encoded(&response))).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn test_decode_rejects_unknown_pdu() {
        let err = Pdu::decode(&mut Decoder::from_slice(&[0xA4, 0x00])).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::UnknownPduType(0xA4),
                ..
            }
        ));
    }
}
