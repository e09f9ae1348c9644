//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Only the subset of X.690 that SNMPv1/v2c messages use: definite lengths,
//! single-byte tags, primitive scalars and constructed sequences.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
