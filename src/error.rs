//! Error types for snmpc.
//!
//! A single [`Error`] enum covers every failure a command can hit. Each variant
//! belongs to one [`ErrorCategory`], which is what the command runner uses to
//! decide how a failure is reported.
//!
//! All enums are `#[non_exhaustive]` to allow adding new variants without breaking changes.

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Invalid BER length encoding.
    InvalidLength,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Length field uses more octets than supported.
    LengthTooLong { octets: usize },
    /// Length exceeds maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Integer does not fit the target width.
    IntegerOverflow,
    /// Invalid OID encoding.
    InvalidOidEncoding,
    /// NULL with non-zero length.
    InvalidNull,
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// Unknown SNMP version.
    UnknownVersion(i32),
    /// Unknown PDU type.
    UnknownPduType(u8),
    /// Trailing bytes after the message.
    TrailingData,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::InvalidOidEncoding => write!(f, "invalid OID encoding"),
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
            Self::TrailingData => write!(f, "trailing data after message"),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
    /// First arc must be 0, 1, or 2 to be BER encoded.
    InvalidFirstArc(u32),
    /// Second arc too large for first arc value.
    InvalidSecondArc { first: u32, second: u32 },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
        }
    }
}

/// Reasons a typed value literal is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueErrorKind {
    /// The type tag is not one of `a c u i t o n s x d b`.
    UnknownType(char),
    /// Number does not parse or does not fit the type's range.
    OutOfRange,
    /// Not a dotted IPv4 address.
    InvalidAddress,
    /// Character that is neither a digit of the token's base nor a separator.
    InvalidCharacter(char),
    /// Byte token outside 0..=255.
    ByteOutOfRange,
    /// OID literal that does not resolve.
    UnknownObject,
}

impl std::fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(c) => write!(f, "unknown type '{}'", c),
            Self::OutOfRange => write!(f, "number out of range"),
            Self::InvalidAddress => write!(f, "invalid IPv4 address"),
            Self::InvalidCharacter(c) => write!(f, "invalid character {:?}", c),
            Self::ByteOutOfRange => write!(f, "byte out of range"),
            Self::UnknownObject => write!(f, "unknown object identifier"),
        }
    }
}

/// Argument shape and version constraints a command can violate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UsageErrorKind {
    /// GETBULK and friends on an SNMPv1 session.
    V2PduOnV1,
    /// Non-repeaters larger than the number of OIDs.
    TooFewObjects { non_repeaters: u32, oids: usize },
    /// Traps are SNMPv2c only.
    TrapOnV1,
    /// Trap arguments are not `agent uptime oid` followed by triples.
    TrapArguments,
    /// Command got too few or too many positional arguments.
    Arguments,
    /// Agent specifier that cannot be parsed.
    InvalidAgent,
    /// A `-C` or `-O` flag the command does not accept.
    InvalidFlag { option: char, flag: char },
    /// A numeric `-C` flag argument that does not parse.
    InvalidFlagArgument { flag: char, reason: &'static str },
    /// Unsupported `-v` value.
    InvalidVersion,
    /// A request the agent never answers, such as a trap, given to
    /// [`Session::execute`](crate::Session::execute).
    Unconfirmed,
}

impl std::fmt::Display for UsageErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V2PduOnV1 => write!(f, "Cannot send V2 PDU on V1 session"),
            Self::TooFewObjects { .. } => write!(f, "need more objects than -Cn<num>"),
            Self::TrapOnV1 => write!(f, "trap is not supported for snmp v1"),
            Self::TrapArguments => write!(f, "trap needs agent, uptime, oid and value triples"),
            Self::Arguments => write!(f, "wrong number of arguments"),
            Self::InvalidAgent => write!(f, "invalid agent"),
            Self::InvalidFlag { option, flag } => write!(f, "-{}{}: invalid flag", option, flag),
            Self::InvalidFlagArgument { flag, reason } => write!(f, "-C{}: {}", flag, reason),
            Self::InvalidVersion => write!(f, "-v: Invalid argument"),
            Self::Unconfirmed => write!(f, "request has no response"),
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }

    /// Human-readable reason, as printed after the offending OID.
    pub fn reason(&self) -> String {
        let text = match self {
            Self::NoError => "No error",
            Self::TooBig => "Response too big",
            Self::NoSuchName => "No such object",
            Self::BadValue => "Bad value",
            Self::ReadOnly => "Read only",
            Self::GenErr => "Generic error",
            Self::NoAccess => "Access denied",
            Self::WrongType => "Wrong type",
            Self::WrongLength => "Wrong length",
            Self::WrongEncoding => "Wrong encoding",
            Self::WrongValue => "Wrong value",
            Self::NoCreation => "Can't be created",
            Self::InconsistentValue => "Inconsistent value",
            Self::ResourceUnavailable => "Resource unavailable",
            Self::CommitFailed => "Commit failed",
            Self::UndoFailed => "Undo failed",
            Self::AuthorizationError => "Authorization error",
            Self::NotWritable => "Not writable",
            Self::InconsistentName => "Inconsistent name",
            Self::Unknown(code) => return format!("Unknown error ({})", code),
        };
        text.to_string()
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The agent answered with a non-zero error status.
    Protocol,
    /// The round trip did not complete or the reply was unreadable.
    Transport,
    /// A literal could not be turned into a value or OID.
    ValueNotation,
    /// The agent broke walk ordering.
    WalkIntegrity,
    /// The command was invoked with the wrong arguments.
    Usage,
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during communication.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Request timed out (after retries if configured).
    #[error("timeout after {elapsed:?}{} (request_id={request_id}, retries={retries})", target.map(|t| format!(" waiting for {}", t)).unwrap_or_default())]
    Timeout {
        target: Option<SocketAddr>,
        elapsed: Duration,
        request_id: i32,
        retries: u32,
    },

    /// SNMP error status returned by the agent.
    ///
    /// `oid` is the requested OID the error index points at, or `None` when
    /// the index is zero or out of range.
    #[error("{}", describe_status(status, *index, oid.as_ref()))]
    Snmp {
        target: Option<SocketAddr>,
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// Message exceeds maximum size.
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// Reply carried a PDU other than a Response.
    #[error("unexpected PDU type 0x{actual:02X} in reply")]
    UnexpectedPdu { actual: u8 },

    /// Response version doesn't match request.
    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        expected: crate::version::Version,
        actual: crate::version::Version,
    },

    /// Invalid OID format.
    #[error("invalid OID{}: {kind}", input.as_ref().map(|i| format!(" {}", i)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },

    /// Name that is neither dotted numeric nor in the name table.
    #[error("{name}: Unknown object identifier")]
    UnknownObject { name: Box<str> },

    /// Typed literal rejected by its tag's parse rule.
    #[error("{oid}: Bad value notation ({literal}): {kind}")]
    ValueNotation {
        oid: Box<str>,
        literal: Box<str>,
        kind: ValueErrorKind,
    },

    /// Non-increasing OID detected during walk (agent misbehavior).
    ///
    /// Returned when a walk receives an OID that sorts before the previous
    /// one, which would otherwise loop forever.
    #[error("OID not increasing: {current} after {previous}")]
    NonIncreasingOid { previous: Oid, current: Oid },

    /// Command invoked with arguments it cannot accept.
    #[error("{kind}")]
    Usage { kind: UsageErrorKind },
}

fn describe_status(status: &ErrorStatus, index: u32, oid: Option<&Oid>) -> String {
    match oid {
        Some(oid) => format!("Can't parse oid {}: {}", oid, status.reason()),
        None => format!("{} (index {})", status.reason(), index),
    }
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create a value notation error.
    pub fn value_notation(
        oid: impl Into<Box<str>>,
        literal: impl Into<Box<str>>,
        kind: ValueErrorKind,
    ) -> Self {
        Self::ValueNotation {
            oid: oid.into(),
            literal: literal.into(),
            kind,
        }
    }

    /// Create a usage error.
    pub fn usage(kind: UsageErrorKind) -> Self {
        Self::Usage { kind }
    }

    /// Which part of the taxonomy this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Snmp { .. } => ErrorCategory::Protocol,
            Self::Io { .. }
            | Self::Timeout { .. }
            | Self::Decode { .. }
            | Self::MessageTooLarge { .. }
            | Self::UnexpectedPdu { .. }
            | Self::VersionMismatch { .. } => ErrorCategory::Transport,
            Self::InvalidOid { .. } | Self::UnknownObject { .. } | Self::ValueNotation { .. } => {
                ErrorCategory::ValueNotation
            }
            Self::NonIncreasingOid { .. } => ErrorCategory::WalkIntegrity,
            Self::Usage { .. } => ErrorCategory::Usage,
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            Self::Timeout { target, .. } => *target,
            Self::Snmp { target, .. } => *target,
            _ => None,
        }
    }
}
