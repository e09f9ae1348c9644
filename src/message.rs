//! Community-based message envelope (SNMPv1 and SNMPv2c).
//!
//! ```text
//! Message ::= SEQUENCE {
//!     version    INTEGER,
//!     community  OCTET STRING,
//!     data       PDU
//! }
//! ```

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;
use crate::version::Version;

/// A v1/v2c message.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityMessage {
    pub version: Version,
    pub community: Bytes,
    pub pdu: Pdu,
}

impl CommunityMessage {
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Encode to BER bytes.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(i64::from(self.version.as_i32()));
        });
        buf.finish()
    }

    /// Decode a complete datagram.
    ///
    /// Trailing bytes after the outer SEQUENCE are rejected.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;
        if !decoder.is_empty() {
            return Err(Error::decode(
                decoder.offset(),
                DecodeErrorKind::TrailingData,
            ));
        }

        let offset = seq.offset();
        let raw_version = seq.read_integer()?;
        let Some(version) = Version::from_i32(raw_version) else {
            return Err(Error::decode(
                offset,
                DecodeErrorKind::UnknownVersion(raw_version),
            ));
        };
        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;

        Ok(Self {
            version,
            community,
            pdu,
        })
    }
}
