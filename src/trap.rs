//! Trap assembly.
//!
//! Builds the bindings of a TRAPv2 from `(oid, type, value)` triples as typed
//! on the command line. Assembly is all or nothing: the first bad triple
//! aborts and nothing is sent.

use crate::error::{Error, Result, UsageErrorKind, ValueErrorKind};
use crate::mib;
use crate::notation::parse_value;
use crate::oid::Oid;
use crate::session::Session;
use crate::transport::Transport;
use crate::varbind::VarBind;

/// sysUpTime value for a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Uptime {
    /// Host uptime at the moment of sending.
    #[default]
    Now,
    /// Explicit value in hundredths of a second.
    Ticks(u64),
}

impl Uptime {
    /// Parse the uptime argument: empty means now, otherwise `0..=i64::MAX`.
    pub fn parse(arg: &str) -> Result<Self> {
        if arg.is_empty() {
            return Ok(Uptime::Now);
        }
        match arg.parse::<i64>() {
            Ok(ticks) if ticks >= 0 => Ok(Uptime::Ticks(ticks as u64)),
            _ => Err(Error::value_notation("uptime", arg, ValueErrorKind::OutOfRange)),
        }
    }

    /// Ticks as sent on the wire, truncated to 32 bits.
    pub fn resolve(self, now_ticks: u64) -> u32 {
        match self {
            Uptime::Now => now_ticks as u32,
            Uptime::Ticks(ticks) => ticks as u32,
        }
    }
}

/// Host uptime in hundredths of a second.
pub fn host_uptime_ticks() -> u64 {
    sysinfo::System::uptime().saturating_mul(100)
}

/// One user binding as typed: OID text, type tag and literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapBinding {
    pub oid: String,
    pub tag: String,
    pub value: String,
}

impl TrapBinding {
    pub fn new(oid: impl Into<String>, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// A fully assembled notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Trap {
    pub uptime: Uptime,
    pub trap_oid: Oid,
    pub varbinds: Vec<VarBind>,
}

impl Trap {
    /// Send the notification. sysUpTime and snmpTrapOID are prepended.
    pub async fn send<T: Transport>(&self, session: &Session<T>) -> Result<()> {
        let ticks = self.uptime.resolve(host_uptime_ticks());
        tracing::debug!(
            target: "snmpc::trap",
            { snmp.trap_oid = %self.trap_oid, snmp.uptime = ticks, snmp.varbind_count = self.varbinds.len() },
            "sending trap"
        );
        session.trap(ticks, &self.trap_oid, &self.varbinds).await
    }
}

/// Split flat `oid type value` arguments into triples.
pub fn triples(args: &[String]) -> Result<Vec<TrapBinding>> {
    if args.len() % 3 != 0 {
        return Err(Error::usage(UsageErrorKind::TrapArguments));
    }
    Ok(args
        .chunks_exact(3)
        .map(|c| TrapBinding::new(&c[0], &c[1], &c[2]))
        .collect())
}

/// Resolve the notification OID and run every binding through the value
/// codec, in input order.
pub fn assemble(uptime: Uptime, trap_oid: &str, bindings: &[TrapBinding]) -> Result<Trap> {
    let trap_oid = mib::resolve(trap_oid)?;
    let varbinds = bindings
        .iter()
        .map(|b| {
            let oid = mib::resolve(&b.oid)?;
            let value = parse_value(&b.oid, &b.tag, &b.value)?;
            Ok(VarBind::new(oid, value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Trap {
        uptime,
        trap_oid,
        varbinds,
    })
}
