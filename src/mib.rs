//! Built-in name table.
//!
//! A small static table of well-known nodes, enough to resolve and print the
//! usual `system`, `interfaces` and trap objects by name. This is not a MIB
//! compiler: anything outside the table is handled numerically.

use crate::error::{Error, Result};
use crate::oid::Oid;

/// How OIDs are rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// Longest known prefix name plus the remaining arcs (`sysDescr.0`).
    #[default]
    Short,
    /// Every named ancestor from the root (`iso.org.dod.internet...`).
    Full,
    /// Dotted decimal only.
    Numeric,
}

/// Well-known nodes, in OID order.
static NODES: &[(&[u32], &str)] = &[
    (&[1], "iso"),
    (&[1, 3], "org"),
    (&[1, 3, 6], "dod"),
    (&[1, 3, 6, 1], "internet"),
    (&[1, 3, 6, 1, 1], "directory"),
    (&[1, 3, 6, 1, 2], "mgmt"),
    (&[1, 3, 6, 1, 2, 1], "mib_2"),
    // SNMPv2-MIB::system
    (&[1, 3, 6, 1, 2, 1, 1], "system"),
    (&[1, 3, 6, 1, 2, 1, 1, 1], "sysDescr"),
    (&[1, 3, 6, 1, 2, 1, 1, 2], "sysObjectID"),
    (&[1, 3, 6, 1, 2, 1, 1, 3], "sysUpTime"),
    (&[1, 3, 6, 1, 2, 1, 1, 4], "sysContact"),
    (&[1, 3, 6, 1, 2, 1, 1, 5], "sysName"),
    (&[1, 3, 6, 1, 2, 1, 1, 6], "sysLocation"),
    (&[1, 3, 6, 1, 2, 1, 1, 7], "sysServices"),
    (&[1, 3, 6, 1, 2, 1, 1, 8], "sysORLastChange"),
    (&[1, 3, 6, 1, 2, 1, 1, 9], "sysORTable"),
    // IF-MIB::interfaces
    (&[1, 3, 6, 1, 2, 1, 2], "interfaces"),
    (&[1, 3, 6, 1, 2, 1, 2, 1], "ifNumber"),
    (&[1, 3, 6, 1, 2, 1, 2, 2], "ifTable"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1], "ifEntry"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 1], "ifIndex"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2], "ifDescr"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 3], "ifType"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 4], "ifMtu"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 5], "ifSpeed"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 6], "ifPhysAddress"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 7], "ifAdminStatus"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 8], "ifOperStatus"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 9], "ifLastChange"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 10], "ifInOctets"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 11], "ifInUcastPkts"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 12], "ifInNUcastPkts"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 13], "ifInDiscards"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 14], "ifInErrors"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 15], "ifInUnknownProtos"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 16], "ifOutOctets"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 17], "ifOutUcastPkts"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 18], "ifOutNUcastPkts"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 19], "ifOutDiscards"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 20], "ifOutErrors"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 21], "ifOutQLen"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 22], "ifSpecific"),
    (&[1, 3, 6, 1, 2, 1, 3], "at"),
    (&[1, 3, 6, 1, 2, 1, 4], "ip"),
    (&[1, 3, 6, 1, 2, 1, 5], "icmp"),
    (&[1, 3, 6, 1, 2, 1, 6], "tcp"),
    (&[1, 3, 6, 1, 2, 1, 7], "udp"),
    (&[1, 3, 6, 1, 2, 1, 11], "snmp"),
    (&[1, 3, 6, 1, 3], "experimental"),
    (&[1, 3, 6, 1, 4], "private"),
    (&[1, 3, 6, 1, 4, 1], "enterprises"),
    (&[1, 3, 6, 1, 5], "security"),
    (&[1, 3, 6, 1, 6], "snmpV2"),
    (&[1, 3, 6, 1, 6, 3], "snmpModules"),
    // SNMPv2-MIB notifications
    (&[1, 3, 6, 1, 6, 3, 1], "snmpMIB"),
    (&[1, 3, 6, 1, 6, 3, 1, 1], "snmpMIBObjects"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 4], "snmpTrap"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 4, 1], "snmpTrapOID"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5], "snmpTraps"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 1], "coldStart"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 2], "warmStart"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 3], "linkDown"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 4], "linkUp"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 5], "authenticationFailure"),
];

/// Look up the name of an exact node.
pub fn lookup(oid: &Oid) -> Option<&'static str> {
    let arcs = oid.arcs();
    NODES
        .iter()
        .find(|(node, _)| *node == arcs)
        .map(|(_, name)| *name)
}

fn find_name(name: &str) -> Option<&'static [u32]> {
    NODES
        .iter()
        .find(|(_, n)| *n == name)
        .or_else(|| NODES.iter().find(|(_, n)| n.eq_ignore_ascii_case(name)))
        .map(|(arcs, _)| *arcs)
}

/// Resolve OID text: dotted numeric, `name`, or `name.suffix`.
///
/// ```
/// use snmpc::mib;
///
/// let oid = mib::resolve("sysDescr.0").unwrap();
/// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
pub fn resolve(text: &str) -> Result<Oid> {
    if text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Oid::parse(text);
    }

    let (name, suffix) = match text.split_once('.') {
        Some((name, suffix)) => (name, Some(suffix)),
        None => (text, None),
    };
    let Some(base) = find_name(name) else {
        return Err(Error::UnknownObject { name: text.into() });
    };

    let mut oid = Oid::from_slice(base);
    if let Some(suffix) = suffix {
        let tail = Oid::parse(suffix).map_err(|_| Error::UnknownObject { name: text.into() })?;
        oid = oid.extend(tail.arcs());
        oid.validate_length()?;
    }
    Ok(oid)
}

/// Render an OID for display.
pub fn render(oid: &Oid, mode: LookupMode) -> String {
    match mode {
        LookupMode::Numeric => oid.to_string(),
        LookupMode::Short => render_short(oid),
        LookupMode::Full => render_full(oid),
    }
}

fn render_short(oid: &Oid) -> String {
    let arcs = oid.arcs();
    for split in (1..=arcs.len()).rev() {
        if let Some(name) = lookup(&Oid::from_slice(&arcs[..split])) {
            return join(name, &arcs[split..]);
        }
    }
    oid.to_string()
}

fn render_full(oid: &Oid) -> String {
    let arcs = oid.arcs();
    let mut parts = Vec::with_capacity(arcs.len());
    for (i, arc) in arcs.iter().enumerate() {
        match lookup(&Oid::from_slice(&arcs[..=i])) {
            Some(name) => parts.push(name.to_string()),
            None => parts.push(arc.to_string()),
        }
    }
    parts.join(".")
}

fn join(name: &str, rest: &[u32]) -> String {
    let mut out = name.to_string();
    for arc in rest {
        out.push('.');
        out.push_str(&arc.to_string());
    }
    out
}

/// Every node in the table, in OID order.
pub fn entries() -> impl Iterator<Item = Oid> {
    NODES.iter().map(|(arcs, _)| Oid::from_slice(arcs))
}
