//! BER decoding.
//!
//! Zero-copy decoding over `Bytes`: sub-decoders and octet strings are slices
//! of the original datagram.

use bytes::Bytes;

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn fail<T>(&self, kind: DecodeErrorKind) -> Result<T> {
        tracing::debug!(target: "snmpc::ber", { snmp.offset = self.offset, kind = %kind }, "decode failed");
        Err(Error::decode(self.offset, kind))
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        let Some(byte) = self.peek_tag() else {
            return self.fail(DecodeErrorKind::TruncatedData);
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a length.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset)?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if len > self.remaining() {
            return self.fail(DecodeErrorKind::TruncatedData);
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let actual = self.read_tag()?;
        if actual != expected {
            self.offset -= 1;
            return self.fail(DecodeErrorKind::UnexpectedTag { expected, actual });
        }
        self.read_length()
    }

    /// Read a BER INTEGER that must fit in 32 bits (version, request id, status).
    pub fn read_integer(&mut self) -> Result<i32> {
        let value = self.read_integer64()?;
        match i32::try_from(value) {
            Ok(v) => Ok(v),
            Err(_) => self.fail(DecodeErrorKind::IntegerOverflow),
        }
    }

    /// Read a BER INTEGER of up to 64 bits.
    pub fn read_integer64(&mut self) -> Result<i64> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read signed integer content of the given length.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i64> {
        if len == 0 {
            return self.fail(DecodeErrorKind::ZeroLengthInteger);
        }
        if len > 8 {
            return self.fail(DecodeErrorKind::IntegerOverflow);
        }
        let bytes = self.read_bytes(len)?;
        let init: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        Ok(bytes.iter().fold(init, |acc, &b| (acc << 8) | i64::from(b)))
    }

    /// Read unsigned integer content of the given length, bounded by `max_bits`.
    ///
    /// Accepts one leading 0x00 pad octet beyond the value width.
    pub fn read_unsigned_value(&mut self, len: usize, max_bits: u32) -> Result<u64> {
        if len == 0 {
            return self.fail(DecodeErrorKind::ZeroLengthInteger);
        }
        let bytes = self.read_bytes(len)?;
        let significant = match bytes.iter().position(|&b| b != 0) {
            Some(first) => &bytes[first..],
            None => return Ok(0),
        };
        if significant.len() * 8 > max_bits as usize {
            return self.fail(DecodeErrorKind::IntegerOverflow);
        }
        Ok(significant
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return self.fail(DecodeErrorKind::InvalidNull);
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read OID content of the given length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let start = self.offset;
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            Error::Decode { offset, kind } => Error::decode(start + offset, kind),
            other => other,
        })
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        let content = self.read_bytes(len)?;
        Ok(Decoder::new(content))
    }
}
