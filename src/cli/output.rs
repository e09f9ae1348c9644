//! Output formatting for the `snmp` tool.
//!
//! Text output is one binding per line, `oid = TYPE: value`, shaped by
//! [`OutputOptions`]. JSON output is one object per line.

use crate::config::{OutputFormat, OutputOptions, StringMode};
use crate::error::Error;
use crate::mib::{self, LookupMode};
use crate::{Oid, Value, VarBind};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// A binding as printed in JSON mode.
#[derive(Debug, Serialize)]
pub struct JsonBinding {
    pub oid: String,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    pub value: serde_json::Value,
}

/// Writes bindings to a sink according to [`OutputOptions`].
pub struct Printer<W: Write> {
    out: W,
    options: OutputOptions,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, options: OutputOptions) -> Self {
        Self { out, options }
    }

    pub fn options(&self) -> &OutputOptions {
        &self.options
    }

    /// Print one binding.
    pub fn binding(&mut self, vb: &VarBind) -> io::Result<()> {
        if self.options.format == OutputFormat::Json {
            let json = serde_json::to_string(&json_binding(vb, &self.options))
                .map_err(io::Error::other)?;
            return writeln!(self.out, "{}", json);
        }

        let value = format_value(&vb.value, &self.options);
        if self.options.varbind_only {
            writeln!(self.out, "{}", value)
        } else if self.options.print_equals {
            let oid = mib::render(&vb.oid, self.options.lookup);
            writeln!(self.out, "{} = {}", oid, value)
        } else {
            let oid = mib::render(&vb.oid, self.options.lookup);
            writeln!(self.out, "{} {}", oid, value)
        }
    }

    pub fn bindings(&mut self, varbinds: &[VarBind]) -> io::Result<()> {
        for vb in varbinds {
            self.binding(vb)?;
        }
        Ok(())
    }

    /// Print a bare OID, as `mibtree` does.
    pub fn oid(&mut self, oid: &Oid) -> io::Result<()> {
        writeln!(self.out, "{}", mib::render(oid, self.options.lookup))
    }

    /// `Variables found: N`, after a walk with `-Cp`.
    pub fn summary(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "Variables found: {}", count)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Traversal time line for `-Ct`, with nanosecond precision.
pub fn format_traversal_time(elapsed: Duration) -> String {
    format!(
        "Total traversal time: {}.{:09} seconds",
        elapsed.as_secs(),
        elapsed.subsec_nanos()
    )
}

/// Render a value with or without its type hint.
pub fn format_value(value: &Value, options: &OutputOptions) -> String {
    let hint = options.hints;
    let with_hint = |name: &str, body: String| {
        if hint {
            format!("{}: {}", name, body)
        } else {
            body
        }
    };

    match value {
        Value::Integer(v) => with_hint("INTEGER", v.to_string()),
        Value::OctetString(bytes) => {
            let as_text = match options.strings {
                StringMode::Ascii => true,
                StringMode::Hex => false,
                StringMode::Auto => is_printable(bytes),
            };
            if as_text {
                with_hint("STRING", format!("\"{}\"", String::from_utf8_lossy(bytes)))
            } else {
                with_hint("Hex-STRING", format_hex_string(bytes))
            }
        }
        Value::Null => "NULL".to_string(),
        Value::ObjectIdentifier(oid) => with_hint("OID", mib::render(oid, options.lookup)),
        Value::IpAddress([a, b, c, d]) => with_hint("IpAddress", format!("{a}.{b}.{c}.{d}")),
        Value::Counter32(v) => with_hint("Counter32", v.to_string()),
        Value::Gauge32(v) => with_hint("Gauge32", v.to_string()),
        Value::Counter64(v) => with_hint("Counter64", v.to_string()),
        Value::TimeTicks(v) => {
            if hint {
                format!("Timeticks: ({}) {}", v, format_timeticks(*v))
            } else {
                v.to_string()
            }
        }
        Value::Opaque(bytes) => with_hint("Opaque", format_hex_string(bytes)),
        Value::NoSuchObject => "noSuchObject".to_string(),
        Value::NoSuchInstance => "noSuchInstance".to_string(),
        Value::EndOfMibView => "endOfMibView".to_string(),
        Value::Unknown { tag, data } => {
            with_hint(&format!("Unknown(0x{:02X})", tag), format_hex_string(data))
        }
    }
}

fn json_binding(vb: &VarBind, options: &OutputOptions) -> JsonBinding {
    let value = match &vb.value {
        Value::Integer(v) => (*v).into(),
        Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => (*v).into(),
        Value::Counter64(v) => (*v).into(),
        Value::OctetString(bytes) => {
            let as_text = match options.strings {
                StringMode::Ascii => true,
                StringMode::Hex => false,
                StringMode::Auto => is_printable(bytes),
            };
            if as_text {
                String::from_utf8_lossy(bytes).into_owned().into()
            } else {
                hex_string(bytes).into()
            }
        }
        Value::ObjectIdentifier(oid) => mib::render(oid, options.lookup).into(),
        Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
            serde_json::Value::Null
        }
        Value::Opaque(bytes) | Value::Unknown { data: bytes, .. } => hex_string(bytes).into(),
        other => other.to_string().into(),
    };

    let value_type = match &vb.value {
        Value::OctetString(bytes)
            if options.strings == StringMode::Hex
                || (options.strings == StringMode::Auto && !is_printable(bytes)) =>
        {
            "Hex-STRING"
        }
        other => other.type_name(),
    };

    JsonBinding {
        oid: mib::render(&vb.oid, options.lookup),
        value_type,
        value,
    }
}

/// Error text for stderr, rendering OIDs the way bindings are rendered.
pub fn describe_error(err: &Error, lookup: LookupMode) -> String {
    match err {
        Error::Snmp {
            status,
            oid: Some(oid),
            ..
        } => format!(
            "Can't parse oid {}: {}",
            mib::render(oid, lookup),
            status.reason()
        ),
        other => other.to_string(),
    }
}

/// Check if bytes are printable ASCII.
fn is_printable(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(s) => s
            .chars()
            .all(|c| c.is_ascii_graphic() || c.is_ascii_whitespace()),
        Err(_) => false,
    }
}

/// Format bytes as hex string (lowercase, no separator).
fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Format bytes as spaced hex for display.
fn format_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format TimeTicks as `[D days, ]H:MM:SS.cc`.
fn format_timeticks(centiseconds: u32) -> String {
    let total_seconds = centiseconds / 100;
    let cs = centiseconds % 100;

    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    match days {
        0 => format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs),
        1 => format!("1 day, {}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs),
        _ => format!(
            "{} days, {}:{:02}:{:02}.{:02}",
            days, hours, minutes, seconds, cs
        ),
    }
}
