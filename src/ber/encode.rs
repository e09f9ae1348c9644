//! BER encoding.
//!
//! Uses a reverse buffer: content is written first, then its length and tag
//! are prepended, so no length has to be computed ahead of time.

use bytes::Bytes;

use super::length::encode_length;
use super::tag;
use crate::oid::Oid;

/// Buffer for BER encoding that writes backwards.
///
/// Constructed values must push their children last-to-first.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create a new encode buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Prepend bytes that are in forward order.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Prepend a BER length.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..count]);
    }

    /// Prepend a tag byte.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Get the current length of encoded data.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a constructed type (SEQUENCE, PDU, etc).
    ///
    /// Calls the closure to encode contents, then wraps with length and tag.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let start_len = self.len();
        f(self);
        let content_len = self.len() - start_len;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode a signed INTEGER in minimal two's-complement form.
    pub fn push_integer(&mut self, value: i64) {
        let content = minimal_signed(value);
        self.push_bytes(content.as_slice());
        self.push_length(content.len());
        self.push_tag(tag::universal::INTEGER);
    }

    /// Encode an unsigned 32-bit application type (Counter32, Gauge32, TimeTicks).
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        self.push_unsigned(tag, u64::from(value));
    }

    /// Encode an unsigned 64-bit value (Counter64).
    pub fn push_unsigned64(&mut self, tag: u8, value: u64) {
        self.push_unsigned(tag, value);
    }

    fn push_unsigned(&mut self, tag: u8, value: u64) {
        let content = minimal_unsigned(value);
        self.push_bytes(content.as_slice());
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_tagged_bytes(tag::universal::OCTET_STRING, data);
    }

    /// Encode raw content under an arbitrary primitive tag.
    pub fn push_tagged_bytes(&mut self, tag: u8, data: &[u8]) {
        self.push_bytes(data);
        self.push_length(data.len());
        self.push_tag(tag);
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.push_empty(tag::universal::NULL);
    }

    /// Encode an empty primitive, as used by NULL and the exception values.
    pub fn push_empty(&mut self, tag: u8) {
        self.push_length(0);
        self.push_tag(tag);
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        let ber = oid.to_ber_smallvec();
        self.push_tagged_bytes(tag::universal::OBJECT_IDENTIFIER, &ber);
    }

    /// Encode an IP address.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_tagged_bytes(tag::application::IP_ADDRESS, &addr);
    }

    /// Finalize and return the encoded bytes.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack buffer holding the minimal content octets of an integer.
pub(crate) struct IntegerOctets {
    bytes: [u8; 9],
    start: usize,
}

impl IntegerOctets {
    fn as_slice(&self) -> &[u8] {
        &self.bytes[self.start..]
    }

    fn len(&self) -> usize {
        self.bytes.len() - self.start
    }
}

/// Minimal two's-complement encoding: drop leading 0x00/0xFF bytes that only
/// repeat the sign bit.
fn minimal_signed(value: i64) -> IntegerOctets {
    let mut bytes = [0u8; 9];
    bytes[1..].copy_from_slice(&value.to_be_bytes());
    let mut start = 1;
    while start < 8 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    IntegerOctets { bytes, start }
}

/// Minimal encoding of an unsigned value, with a 0x00 pad when the top bit
/// would otherwise read as a sign.
fn minimal_unsigned(value: u64) -> IntegerOctets {
    let mut bytes = [0u8; 9];
    bytes[1..].copy_from_slice(&value.to_be_bytes());
    let mut start = 1;
    while start < 8 && bytes[start] == 0 {
        start += 1;
    }
    if bytes[start] & 0x80 != 0 {
        start -= 1;
    }
    IntegerOctets { bytes, start }
}
