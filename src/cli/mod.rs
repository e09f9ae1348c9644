//! Command-line front end for the `snmp` tool.
//!
//! Argument parsing, command execution and output formatting. Only
//! available with the `cli` feature.

pub mod args;
pub mod commands;
pub mod output;
