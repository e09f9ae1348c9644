//! SNMP version enumeration.

/// Community-based SNMP protocol versions.
///
/// Ordered so that `V1 < V2c`; bulk requests and traps need at least `V2c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Version {
    /// SNMPv1 (RFC 1157)
    V1,
    /// SNMPv2c (RFC 1901)
    #[default]
    V2c,
}

impl Version {
    /// Get the BER-encoded version number.
    pub const fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
        }
    }

    /// Create from BER-encoded version number.
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            _ => None,
        }
    }

    /// Parse the `-v` argument: `1` or `2c`.
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "1" => Some(Version::V1),
            "2c" => Some(Version::V2c),
            _ => None,
        }
    }

    /// True if GETBULK and TRAPv2 PDUs may be sent.
    pub const fn supports_v2_pdus(self) -> bool {
        matches!(self, Version::V2c)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V1 => write!(f, "SNMPv1"),
            Version::V2c => write!(f, "SNMPv2c"),
        }
    }
}
