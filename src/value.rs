//! SNMP value types.
//!
//! The first seven variants are the ones a manager sends (trap bindings are
//! built from them). The rest only ever arrive in replies.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// SNMP value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Value {
    /// IpAddress (4 octets, network order)
    IpAddress([u8; 4]),
    /// Counter32
    Counter32(u32),
    /// INTEGER, wide enough for any literal the command line accepts
    Integer(i64),
    /// OCTET STRING (also BITS and raw hex)
    OctetString(Bytes),
    /// NULL
    Null,
    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),
    /// TimeTicks in hundredths of a second
    TimeTicks(u32),
    /// Gauge32 / Unsigned32
    Gauge32(u32),
    /// Counter64
    Counter64(u64),
    /// Opaque (raw wrapped BER)
    Opaque(Bytes),
    /// noSuchObject exception
    NoSuchObject,
    /// noSuchInstance exception
    NoSuchInstance,
    /// endOfMibView exception
    EndOfMibView,
    /// Tag this crate does not know; content kept verbatim.
    Unknown { tag: u8, data: Bytes },
}

impl Value {
    /// True for the three v2c exception markers.
    ///
    /// In a walk these stand for "no value here" and end the walk.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Get the octet string content, if this is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(b) | Value::Opaque(b) => Some(b),
            _ => None,
        }
    }

    /// Get the OID, if this is one.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Short type name, as printed before the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::IpAddress(_) => "IpAddress",
            Value::Counter32(_) => "Counter32",
            Value::Integer(_) => "INTEGER",
            Value::OctetString(_) => "STRING",
            Value::Null => "NULL",
            Value::ObjectIdentifier(_) => "OID",
            Value::TimeTicks(_) => "Timeticks",
            Value::Gauge32(_) => "Gauge32",
            Value::Counter64(_) => "Counter64",
            Value::Opaque(_) => "Opaque",
            Value::NoSuchObject => "noSuchObject",
            Value::NoSuchInstance => "noSuchInstance",
            Value::EndOfMibView => "endOfMibView",
            Value::Unknown { .. } => "Unknown",
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::Counter64(v) => buf.push_unsigned64(tag::application::COUNTER64, *v),
            Value::Opaque(data) => buf.push_tagged_bytes(tag::application::OPAQUE, data),
            Value::NoSuchObject => buf.push_empty(tag::context::NO_SUCH_OBJECT),
            Value::NoSuchInstance => buf.push_empty(tag::context::NO_SUCH_INSTANCE),
            Value::EndOfMibView => buf.push_empty(tag::context::END_OF_MIB_VIEW),
            Value::Unknown { tag, data } => buf.push_tagged_bytes(*tag, data),
        }
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        let value = match tag {
            tag::universal::INTEGER => Value::Integer(decoder.read_integer_value(len)?),
            tag::universal::OCTET_STRING => Value::OctetString(decoder.read_bytes(len)?),
            tag::universal::NULL => {
                decoder.read_bytes(len)?;
                Value::Null
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Value::ObjectIdentifier(decoder.read_oid_value(len)?)
            }
            tag::application::IP_ADDRESS => {
                if len != 4 {
                    return Err(Error::decode(
                        decoder.offset(),
                        DecodeErrorKind::InvalidIpAddressLength { length: len },
                    ));
                }
                let data = decoder.read_bytes(4)?;
                Value::IpAddress([data[0], data[1], data[2], data[3]])
            }
            tag::application::COUNTER32 => Value::Counter32(read_u32(decoder, len)?),
            tag::application::GAUGE32 => Value::Gauge32(read_u32(decoder, len)?),
            tag::application::TIMETICKS => Value::TimeTicks(read_u32(decoder, len)?),
            tag::application::OPAQUE => Value::Opaque(decoder.read_bytes(len)?),
            tag::application::COUNTER64 => Value::Counter64(decoder.read_unsigned_value(len, 64)?),
            // Exceptions are empty, but tolerate agents that pad them
            tag::context::NO_SUCH_OBJECT => {
                decoder.read_bytes(len)?;
                Value::NoSuchObject
            }
            tag::context::NO_SUCH_INSTANCE => {
                decoder.read_bytes(len)?;
                Value::NoSuchInstance
            }
            tag::context::END_OF_MIB_VIEW => {
                decoder.read_bytes(len)?;
                Value::EndOfMibView
            }
            other => {
                tracing::debug!(target: "snmpc::value", { snmp.tag = other, snmp.len = len }, "unknown value tag");
                Value::Unknown {
                    tag: other,
                    data: decoder.read_bytes(len)?,
                }
            }
        };

        Ok(value)
    }
}

fn read_u32(decoder: &mut Decoder, len: usize) -> Result<u32> {
    // Bounded to 32 bits by read_unsigned_value
    Ok(decoder.read_unsigned_value(len, 32)? as u32)
}

/// Plain rendering without a type hint.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::IpAddress([a, b, c, d]) => write!(f, "{}.{}.{}.{}", a, b, c, d),
            Value::Counter32(v) | Value::Gauge32(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => write!(f, "{}", String::from_utf8_lossy(data)),
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::Opaque(data) | Value::Unknown { data, .. } => {
                for (i, b) in data.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn encode(value: &Value) -> Bytes {
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf);
        buf.finish()
    }

    fn decode(bytes: &[u8]) -> Value {
        Value::decode(&mut Decoder::from_slice(bytes)).unwrap()
    }

    #[test]
    fn test_encode_wire_forms() {
        assert_eq!(
            &encode(&Value::IpAddress([10, 0, 0, 1]))[..],
            &[0x40, 0x04, 10, 0, 0, 1]
        );
        assert_eq!(
            &encode(&Value::Counter32(u32::MAX))[..],
            &[0x41, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(&encode(&Value::Integer(-2))[..], &[0x02, 0x01, 0xFE]);
        assert_eq!(&encode(&Value::Null)[..], &[0x05, 0x00]);
        assert_eq!(
            &encode(&Value::ObjectIdentifier(oid!(1, 3, 6, 1)))[..],
            &[0x06, 0x03, 0x2B, 0x06, 0x01]
        );
    }

    #[test]
    fn test_decode_reply_types() {
        assert_eq!(decode(&[0x42, 0x01, 0x07]), Value::Gauge32(7));
        assert_eq!(decode(&[0x43, 0x02, 0x30, 0x39]), Value::TimeTicks(12345));
        assert_eq!(
            decode(&[0x46, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00]),
            Value::Counter64(1 << 32)
        );
        assert_eq!(decode(&[0x82, 0x00]), Value::EndOfMibView);
        assert_eq!(decode(&[0x80, 0x00]), Value::NoSuchObject);
    }

    #[test]
    fn test_decode_unknown_tag_keeps_data() {
        let value = decode(&[0x47, 0x02, 0xAA, 0xBB]);
        assert_eq!(
            value,
            Value::Unknown {
                tag: 0x47,
                data: Bytes::from_static(&[0xAA, 0xBB])
            }
        );
    }

    #[test]
    fn test_decode_rejects_short_ip_address() {
        let mut dec = Decoder::from_slice(&[0x40, 0x03, 10, 0, 0]);
        assert!(Value::decode(&mut dec).is_err());
    }

    #[test]
    fn test_is_exception() {
        assert!(Value::EndOfMibView.is_exception());
        assert!(Value::NoSuchInstance.is_exception());
        assert!(!Value::Null.is_exception());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::IpAddress([192, 168, 1, 1]).to_string(), "192.168.1.1");
        assert_eq!(Value::from("router").to_string(), "router");
        assert_eq!(
            Value::Opaque(Bytes::from_static(&[0x9F, 0x78])).to_string(),
            "9F 78"
        );
    }
}
