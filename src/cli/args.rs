//! Command-line arguments for the `snmp` tool.
//!
//! Each subcommand takes the common options, then its positional arguments.
//! Options must come before the agent: everything after the first positional
//! is taken literally, so negative integers and empty uptimes pass through.

use crate::config::{CommandKind, Config, OutputFormat, OutputOptions, RequestOptions};
use crate::error::{Error, Result, UsageErrorKind};
use crate::session::SessionConfig;
use crate::version::Version;
use bytes::Bytes;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::time::Duration;

/// SNMP manager: query agents and send notifications.
#[derive(Debug, Parser)]
#[command(name = "snmp", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Retrieve the given objects.
    Get(RequestArgs),
    /// Retrieve the objects following the given ones.
    #[command(name = "getnext")]
    GetNext(RequestArgs),
    /// Retrieve objects with a single GETBULK.
    #[command(name = "bulkget")]
    BulkGet(RequestArgs),
    /// Walk a subtree with GETNEXT.
    Walk(RequestArgs),
    /// Walk a subtree with GETBULK.
    #[command(name = "bulkwalk")]
    BulkWalk(RequestArgs),
    /// Send a TRAPv2 notification.
    Trap(RequestArgs),
    /// Print the known object names.
    #[command(name = "mibtree")]
    MibTree(MibTreeArgs),
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FormatArg {
    /// `oid = TYPE: value` lines
    #[default]
    Text,
    /// One JSON object per binding
    Json,
}

/// Options shared by every command that talks to an agent.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Community string.
    #[arg(short = 'c', value_name = "COMMUNITY", default_value = "public")]
    pub community: String,

    /// Retries after a timeout (UDP only).
    #[arg(short = 'r', value_name = "RETRIES", default_value = "5")]
    pub retries: u32,

    /// Seconds to wait for each reply.
    #[arg(
        short = 't',
        value_name = "SECONDS",
        default_value = "1",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Protocol version: 1 or 2c.
    #[arg(short = 'v', value_name = "VERSION", default_value = "2c")]
    pub version: String,

    /// Output flags (afnqvxSQ).
    #[arg(short = 'O', value_name = "FLAGS")]
    pub output_flags: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Debug logging to stderr (-d debug, -dd trace).
    #[arg(short = 'd', action = ArgAction::Count)]
    pub debug: u8,
}

impl CommonArgs {
    fn session_config(&self) -> Result<SessionConfig> {
        let version = Version::from_arg(&self.version)
            .ok_or_else(|| Error::usage(UsageErrorKind::InvalidVersion))?;
        Ok(SessionConfig {
            version,
            community: Bytes::from(self.community.clone().into_bytes()),
            timeout: Duration::from_secs(self.timeout),
            retries: self.retries,
        })
    }

    fn output_options(&self, command: CommandKind) -> Result<OutputOptions> {
        let mut output = OutputOptions::default();
        for flags in &self.output_flags {
            output.apply_flags(command, flags)?;
        }
        output.format = match self.format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        };
        Ok(output)
    }
}

/// Arguments of the agent-facing commands.
#[derive(Debug, Args)]
pub struct RequestArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Command flags (cIiptEnr, depending on the command).
    #[arg(short = 'C', value_name = "FLAGS")]
    pub command_flags: Vec<String>,

    /// Agent, then the command's objects or values.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments of `mibtree`.
#[derive(Debug, Args)]
pub struct MibTreeArgs {
    /// Output flags (fnS).
    #[arg(short = 'O', value_name = "FLAGS")]
    pub output_flags: Vec<String>,

    /// Debug logging to stderr (-d debug, -dd trace).
    #[arg(short = 'd', action = ArgAction::Count)]
    pub debug: u8,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Get(_) => CommandKind::Get,
            Command::GetNext(_) => CommandKind::GetNext,
            Command::BulkGet(_) => CommandKind::BulkGet,
            Command::Walk(_) => CommandKind::Walk,
            Command::BulkWalk(_) => CommandKind::BulkWalk,
            Command::Trap(_) => CommandKind::Trap,
            Command::MibTree(_) => CommandKind::MibTree,
        }
    }

    /// Number of `-d` flags given.
    pub fn debug_level(&self) -> u8 {
        match self {
            Command::MibTree(args) => args.debug,
            Command::Get(args)
            | Command::GetNext(args)
            | Command::BulkGet(args)
            | Command::Walk(args)
            | Command::BulkWalk(args)
            | Command::Trap(args) => args.common.debug,
        }
    }

    /// Validate everything and build the run configuration.
    pub fn into_config(self) -> Result<Config> {
        let kind = self.kind();
        match self {
            Command::MibTree(args) => {
                let mut output = OutputOptions::default();
                for flags in &args.output_flags {
                    output.apply_flags(kind, flags)?;
                }
                Config::new(
                    kind,
                    SessionConfig::default(),
                    RequestOptions::default(),
                    output,
                    &[],
                )
            }
            Command::Get(args)
            | Command::GetNext(args)
            | Command::BulkGet(args)
            | Command::Walk(args)
            | Command::BulkWalk(args)
            | Command::Trap(args) => {
                let session = args.common.session_config()?;
                let mut output = args.common.output_options(kind)?;
                let mut request = RequestOptions::default();
                for flags in &args.command_flags {
                    request.apply_flags(kind, flags, &mut output)?;
                }
                Config::new(kind, session, request, output, &args.args)
            }
        }
    }
}
