//! Common test fixtures and constants.

use snmpc::{Oid, Value, oid};

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_object_id() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

// =============================================================================
// Subtree roots (for walks)
// =============================================================================

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// Interfaces subtree root: 1.3.6.1.2.1.2
pub fn interfaces_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2)
}

/// Nonexistent OID for testing NoSuchObject
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

pub const COMMUNITY: &[u8] = b"public";

/// A small agent table: the system group and two interfaces.
pub fn standard_table() -> Vec<(Oid, Value)> {
    vec![
        (sys_descr(), Value::from("OpenBSD gw 7.6 GENERIC.MP#0 amd64")),
        (sys_object_id(), Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 30155, 23, 1))),
        (sys_uptime(), Value::TimeTicks(123456)),
        (sys_contact(), Value::from("noc@example.net")),
        (sys_name(), Value::from("gw")),
        (sys_location(), Value::from("rack 4")),
        (oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(2)),
        (oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1), Value::Integer(1)),
        (oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 2), Value::Integer(2)),
        (oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1), Value::from("em0")),
        (oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 2), Value::from("lo0")),
        (oid!(1, 3, 6, 1, 2, 1, 4, 1, 0), Value::Integer(1)),
    ]
}
