//! Typed value notation.
//!
//! Turns the `type value` pair of a command-line binding into a [`Value`].
//! Each [`ValueType`] has one pure parse rule; failures name the binding's
//! OID and the literal so the user can see which triple was rejected.
//!
//! | tag | literal | value |
//! |-----|---------|-------|
//! | `a` | dotted IPv4 | IpAddress |
//! | `c` | decimal in `i32` range | Counter32 |
//! | `u`, `i` | decimal in `i64` range | INTEGER |
//! | `t` | decimal in `i64` range | TimeTicks (low 32 bits) |
//! | `o` | OID text or name | OBJECT IDENTIFIER |
//! | `n` | ignored | NULL |
//! | `s` | any text | OCTET STRING |
//! | `x` | hex bytes | OCTET STRING |
//! | `d` | decimal bytes | OCTET STRING |
//! | `b` | bit indices | OCTET STRING (BITS) |

use std::net::Ipv4Addr;

use bytes::Bytes;

use crate::error::{Error, Result, UsageErrorKind, ValueErrorKind};
use crate::mib;
use crate::value::Value;

/// Largest octet string the byte-building rules will produce.
pub const MAX_OCTETS: usize = 65535;

/// Value type selected by a binding's tag character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    IpAddress,
    Counter32,
    Integer,
    TimeTicks,
    ObjectIdentifier,
    Null,
    String,
    Hex,
    Decimal,
    Bits,
}

impl ValueType {
    /// Map a tag character to its type. `u` and `i` are the same type.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'a' => Some(ValueType::IpAddress),
            'c' => Some(ValueType::Counter32),
            'u' | 'i' => Some(ValueType::Integer),
            't' => Some(ValueType::TimeTicks),
            'o' => Some(ValueType::ObjectIdentifier),
            'n' => Some(ValueType::Null),
            's' => Some(ValueType::String),
            'x' => Some(ValueType::Hex),
            'd' => Some(ValueType::Decimal),
            'b' => Some(ValueType::Bits),
            _ => None,
        }
    }

    /// Apply this type's rule to `literal`.
    pub fn parse(self, literal: &str) -> std::result::Result<Value, ValueErrorKind> {
        match self {
            ValueType::IpAddress => parse_ip_address(literal),
            ValueType::Counter32 => parse_counter32(literal),
            ValueType::Integer => parse_integer(literal),
            ValueType::TimeTicks => parse_timeticks(literal),
            ValueType::ObjectIdentifier => parse_object_identifier(literal),
            ValueType::Null => Ok(Value::Null),
            ValueType::String => Ok(Value::OctetString(Bytes::copy_from_slice(
                literal.as_bytes(),
            ))),
            ValueType::Hex => parse_bytes(literal, 16, &[' ', '\t', ',']),
            ValueType::Decimal => parse_bytes(literal, 10, &[' ', '\t']),
            ValueType::Bits => parse_bits(literal),
        }
    }
}

/// Parse one binding's `type value` pair.
///
/// Only the first character of `tag` is significant. `oid_text` is the
/// binding's OID as the user wrote it and only appears in error messages.
///
/// ```
/// use snmpc::notation::parse_value;
/// use snmpc::Value;
///
/// let value = parse_value("sysContact.0", "x", "de ad, be,ef").unwrap();
/// assert_eq!(value.as_bytes(), Some(&[0xDE, 0xAD, 0xBE, 0xEF][..]));
/// ```
pub fn parse_value(oid_text: &str, tag: &str, literal: &str) -> Result<Value> {
    let Some(tag_char) = tag.chars().next() else {
        return Err(Error::usage(UsageErrorKind::TrapArguments));
    };
    let Some(value_type) = ValueType::from_tag(tag_char) else {
        return Err(Error::value_notation(
            oid_text,
            literal,
            ValueErrorKind::UnknownType(tag_char),
        ));
    };
    value_type.parse(literal).map_err(|kind| {
        tracing::debug!(target: "snmpc::notation", { snmp.oid = oid_text, snmp.tag = %tag_char, error = %kind }, "rejected value literal");
        Error::value_notation(oid_text, literal, kind)
    })
}

fn parse_ip_address(literal: &str) -> std::result::Result<Value, ValueErrorKind> {
    let addr: Ipv4Addr = literal
        .parse()
        .map_err(|_| ValueErrorKind::InvalidAddress)?;
    Ok(Value::IpAddress(addr.octets()))
}

fn parse_counter32(literal: &str) -> std::result::Result<Value, ValueErrorKind> {
    let v: i32 = literal.parse().map_err(|_| ValueErrorKind::OutOfRange)?;
    // Negative counters keep their 32-bit pattern
    Ok(Value::Counter32(v as u32))
}

fn parse_integer(literal: &str) -> std::result::Result<Value, ValueErrorKind> {
    let v: i64 = literal.parse().map_err(|_| ValueErrorKind::OutOfRange)?;
    Ok(Value::Integer(v))
}

fn parse_timeticks(literal: &str) -> std::result::Result<Value, ValueErrorKind> {
    let v: i64 = literal.parse().map_err(|_| ValueErrorKind::OutOfRange)?;
    Ok(Value::TimeTicks(v as u32))
}

fn parse_object_identifier(literal: &str) -> std::result::Result<Value, ValueErrorKind> {
    mib::resolve(literal)
        .map(Value::ObjectIdentifier)
        .map_err(|_| ValueErrorKind::UnknownObject)
}

/// Split `literal` on `separators`, skipping empty tokens, and check that
/// every remaining character is a digit of `radix`.
fn tokens<'a>(
    literal: &'a str,
    radix: u32,
    separators: &'a [char],
) -> impl Iterator<Item = std::result::Result<&'a str, ValueErrorKind>> + 'a {
    literal
        .split(separators)
        .filter(|token| !token.is_empty())
        .map(move |token| match token.chars().find(|c| !c.is_digit(radix)) {
            Some(bad) => Err(ValueErrorKind::InvalidCharacter(bad)),
            None => Ok(token),
        })
}

fn parse_bytes(
    literal: &str,
    radix: u32,
    separators: &[char],
) -> std::result::Result<Value, ValueErrorKind> {
    let mut buf = ByteBuffer::new();
    for token in tokens(literal, radix, separators) {
        let byte = u8::from_str_radix(token?, radix).map_err(|_| ValueErrorKind::ByteOutOfRange)?;
        buf.push(byte)?;
    }
    Ok(Value::OctetString(buf.into_bytes()))
}

/// BITS per RFC 3416 section 2.5: bit `i` is `0x80 >> (i % 8)` of byte `i / 8`.
fn parse_bits(literal: &str) -> std::result::Result<Value, ValueErrorKind> {
    let mut buf = ByteBuffer::new();
    for token in tokens(literal, 10, &[' ', '\t', ',']) {
        let bit: usize = token?.parse().map_err(|_| ValueErrorKind::OutOfRange)?;
        *buf.ensure_index(bit / 8)? |= 0x80 >> (bit % 8);
    }
    Ok(Value::OctetString(buf.into_bytes()))
}

/// Growable byte string used while building octet-string values.
///
/// Owned by the single parse call that fills it.
#[derive(Debug, Default)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow with zero bytes until `index` is valid, then return that byte.
    pub fn ensure_index(&mut self, index: usize) -> std::result::Result<&mut u8, ValueErrorKind> {
        if index >= MAX_OCTETS {
            return Err(ValueErrorKind::OutOfRange);
        }
        if index >= self.bytes.len() {
            self.bytes.resize(index + 1, 0);
        }
        Ok(&mut self.bytes[index])
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) -> std::result::Result<(), ValueErrorKind> {
        *self.ensure_index(self.bytes.len())? = byte;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::oid;

    fn octets(value: Value) -> Vec<u8> {
        value.as_bytes().expect("octet string").to_vec()
    }

    #[test]
    fn test_bits_encoding() {
        let value = parse_value("1.3.6.1.4.1.1", "b", "0 7 15").unwrap();
        assert_eq!(octets(value), vec![0x81, 0x01]);

        let value = parse_value("1.3.6.1.4.1.1", "b", "0,,7\t\t15").unwrap();
        assert_eq!(octets(value), vec![0x81, 0x01]);

        let value = parse_value("1.3.6.1.4.1.1", "b", "9").unwrap();
        assert_eq!(octets(value), vec![0x00, 0x40]);
    }

    #[test]
    fn test_bits_rejects_negative_index() {
        let err = parse_value("1.3", "b", "-1").unwrap_err();
        assert!(matches!(
            err,
            Error::ValueNotation {
                kind: ValueErrorKind::InvalidCharacter('-'),
                ..
            }
        ));
    }

    #[test]
    fn test_hex_tokens() {
        let value = parse_value("1.3", "x", "de ad, be,ef").unwrap();
        assert_eq!(octets(value), vec![0xDE, 0xAD, 0xBE, 0xEF]);

        let value = parse_value("1.3", "x", "").unwrap();
        assert!(octets(value).is_empty());
    }

    #[test]
    fn test_hex_rejects_garbage() {
        let err = parse_value("sysContact.0", "x", "zz").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValueNotation);
        assert!(err.to_string().starts_with("sysContact.0: Bad value notation (zz)"));

        assert!(parse_value("1.3", "x", "100").is_err());
    }

    #[test]
    fn test_decimal_bytes() {
        let value = parse_value("1.3", "d", "10  0\t255").unwrap();
        assert_eq!(octets(value), vec![10, 0, 255]);

        assert!(parse_value("1.3", "d", "256").is_err());
        // comma is not a decimal separator
        assert!(parse_value("1.3", "d", "1,2").is_err());
    }

    #[test]
    fn test_numeric_ranges() {
        assert_eq!(
            parse_value("1.3", "c", "-1").unwrap(),
            Value::Counter32(u32::MAX)
        );
        assert!(parse_value("1.3", "c", "2147483648").is_err());
        assert_eq!(
            parse_value("1.3", "u", "-9000000000").unwrap(),
            Value::Integer(-9_000_000_000)
        );
        assert_eq!(parse_value("1.3", "i", "42").unwrap(), Value::Integer(42));
        assert_eq!(
            parse_value("1.3", "t", "4294967297").unwrap(),
            Value::TimeTicks(1)
        );
        assert!(parse_value("1.3", "t", "soon").is_err());
    }

    #[test]
    fn test_address_oid_null_string() {
        assert_eq!(
            parse_value("1.3", "a", "192.0.2.1").unwrap(),
            Value::IpAddress([192, 0, 2, 1])
        );
        assert!(parse_value("1.3", "a", "192.0.2").is_err());
        assert_eq!(
            parse_value("1.3", "o", "coldStart").unwrap(),
            Value::ObjectIdentifier(oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 1))
        );
        assert!(parse_value("1.3", "o", "nosuchname").is_err());
        assert_eq!(parse_value("1.3", "n", "whatever").unwrap(), Value::Null);
        assert_eq!(parse_value("1.3", "s", "a b,c").unwrap(), Value::from("a b,c"));
    }

    #[test]
    fn test_unknown_tag() {
        let err = parse_value("1.3", "q", "1").unwrap_err();
        assert!(matches!(
            err,
            Error::ValueNotation {
                kind: ValueErrorKind::UnknownType('q'),
                ..
            }
        ));
        // only the first character selects the type
        assert_eq!(parse_value("1.3", "integer", "5").unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_byte_buffer_grows_zero_filled() {
        let mut buf = ByteBuffer::new();
        *buf.ensure_index(3).unwrap() = 0xFF;
        assert_eq!(buf.len(), 4);
        *buf.ensure_index(1).unwrap() |= 0x01;
        assert_eq!(&buf.into_bytes()[..], &[0, 1, 0, 0xFF]);

        let mut buf = ByteBuffer::new();
        assert!(buf.ensure_index(MAX_OCTETS).is_err());
        assert!(buf.is_empty());
    }
}
