//! BER length encoding and decoding.
//!
//! Short form for 0-127, long form with up to four length octets otherwise.
//! Indefinite lengths (0x80) never appear in SNMP and are rejected.

use crate::error::{DecodeErrorKind, Error, Result};

/// Largest length the decoder accepts.
///
/// Far above any SNMP message; bounds allocation on hostile input.
pub const MAX_LENGTH: usize = 0x200000;

/// Encode a length, returning the octets in reverse order for the reverse
/// encode buffer, plus how many of them are valid.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut buf = [0u8; 5];

    if len <= 0x7F {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let mut count = 0;
    let mut rest = len;
    while rest > 0 && count < 4 {
        buf[count] = rest as u8;
        rest >>= 8;
        count += 1;
    }
    buf[count] = 0x80 | count as u8;
    (buf, count + 1)
}

/// Decode a length from `data`, returning (length, octets consumed).
///
/// `base_offset` is only used for error reporting.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let octets = (first & 0x7F) as usize;
    if octets > 4 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets },
        ));
    }
    if data.len() < 1 + octets {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    }

    let len = data[1..=octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    if len > MAX_LENGTH {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthExceedsMax {
                length: len,
                max: MAX_LENGTH,
            },
        ));
    }

    Ok((len, 1 + octets))
}
