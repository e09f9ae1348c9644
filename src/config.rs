//! Validated run configuration.
//!
//! Everything a command needs is decided once, up front, and passed down
//! explicitly: [`SessionConfig`] for the round trips, [`WalkOptions`] for
//! walks and [`OutputOptions`] for printing. The `-C` and `-O` flag strings
//! are parsed here so that a flag a command does not take is rejected before
//! any packet is sent.

use crate::error::{Error, Result, UsageErrorKind};
use crate::mib::{self, LookupMode};
use crate::oid::Oid;
use crate::session::SessionConfig;
use crate::walk::{BulkParams, WalkOptions};

/// The commands of the `snmp` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Get,
    GetNext,
    BulkGet,
    Walk,
    BulkWalk,
    Trap,
    MibTree,
}

impl CommandKind {
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Get => "get",
            CommandKind::GetNext => "getnext",
            CommandKind::BulkGet => "bulkget",
            CommandKind::Walk => "walk",
            CommandKind::BulkWalk => "bulkwalk",
            CommandKind::Trap => "trap",
            CommandKind::MibTree => "mibtree",
        }
    }

    /// Usage line printed after a usage error.
    pub fn usage(self) -> String {
        const COMMON: &str =
            " [-c community] [-r retries] [-t timeout] [-v version]\n            [-O afnqvxSQ]";
        let args = match self {
            CommandKind::Get | CommandKind::GetNext => "agent oid ...",
            CommandKind::BulkGet => "[-C n<nonrep>r<maxrep>] agent oid ...",
            CommandKind::Walk => "[-C cIipt] [-C E endoid] agent [oid]",
            CommandKind::BulkWalk => "[-C cipn<nonrep>r<maxrep>] agent [oid]",
            CommandKind::Trap => "agent uptime oid [oid type value] ...",
            CommandKind::MibTree => return "usage: snmp mibtree [-O fnS]".to_string(),
        };
        format!("usage: snmp {}{} {}", self.name(), COMMON, args)
    }

    /// `-C` flags this command takes.
    fn accepts_c(self, flag: char) -> bool {
        match flag {
            'c' | 'i' | 'p' => matches!(self, CommandKind::Walk | CommandKind::BulkWalk),
            'n' | 'r' => matches!(self, CommandKind::BulkGet | CommandKind::BulkWalk),
            't' | 'E' | 'I' => self == CommandKind::Walk,
            _ => false,
        }
    }

    /// `-O` flags this command takes.
    fn accepts_o(self, flag: char) -> bool {
        match self {
            CommandKind::MibTree => matches!(flag, 'f' | 'n' | 'S'),
            _ => matches!(flag, 'a' | 'f' | 'n' | 'q' | 'v' | 'x' | 'S' | 'Q'),
        }
    }
}

/// How octet strings are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMode {
    /// Text when printable, hex otherwise.
    #[default]
    Auto,
    /// Always text (`-Oa`).
    Ascii,
    /// Always hex (`-Ox`).
    Hex,
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per binding.
    Json,
}

/// Printing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// How OIDs are rendered (default: short names)
    pub lookup: LookupMode,
    /// How octet strings are rendered (default: auto)
    pub strings: StringMode,
    /// Print `oid = value` rather than `oid value` (default: true)
    pub print_equals: bool,
    /// Print only the value (default: false)
    pub varbind_only: bool,
    /// Print type hints like `INTEGER:` (default: true)
    pub hints: bool,
    /// Print `Variables found: N` after a walk (default: false)
    pub summary: bool,
    /// Print the traversal time after a walk (default: false)
    pub time: bool,
    pub format: OutputFormat,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            lookup: LookupMode::Short,
            strings: StringMode::Auto,
            print_equals: true,
            varbind_only: false,
            hints: true,
            summary: false,
            time: false,
            format: OutputFormat::Text,
        }
    }
}

impl OutputOptions {
    /// Apply one `-O` flag string.
    pub fn apply_flags(&mut self, command: CommandKind, flags: &str) -> Result<()> {
        for flag in flags.chars() {
            if !command.accepts_o(flag) {
                return Err(Error::usage(UsageErrorKind::InvalidFlag { option: 'O', flag }));
            }
            match flag {
                'a' => self.strings = StringMode::Ascii,
                'x' => self.strings = StringMode::Hex,
                'f' => self.lookup = LookupMode::Full,
                'n' => self.lookup = LookupMode::Numeric,
                'S' => self.lookup = LookupMode::Short,
                'q' => {
                    self.print_equals = false;
                    self.hints = false;
                }
                'v' => self.varbind_only = true,
                _ => self.hints = false,
            }
        }
        Ok(())
    }
}

/// Walk and bulk settings gathered from `-C` flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestOptions {
    pub walk: WalkOptions,
    pub bulk: BulkParams,
    /// End OID text from `-CE`, resolved later.
    pub end: Option<EndOid>,
}

/// Where the `-CE` end OID comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOid {
    /// Written right after the `E`, as in `-CE1.3.6.1.2.1.2`.
    Inline(String),
    /// The next command-line argument.
    NextArgument,
}

impl RequestOptions {
    /// Apply one `-C` flag string. Print flags go to `output`.
    pub fn apply_flags(
        &mut self,
        command: CommandKind,
        flags: &str,
        output: &mut OutputOptions,
    ) -> Result<()> {
        let mut chars = flags.char_indices().peekable();
        while let Some((i, flag)) = chars.next() {
            if !command.accepts_c(flag) {
                return Err(Error::usage(UsageErrorKind::InvalidFlag { option: 'C', flag }));
            }
            match flag {
                'c' => self.walk.check_increase = false,
                'i' => self.walk.include_start = true,
                'I' => self.walk.fallback_on_empty = false,
                'p' => output.summary = true,
                't' => output.time = true,
                'E' => {
                    // The rest of the string, if any, is the end OID.
                    let rest = &flags[i + 1..];
                    self.end = Some(if rest.is_empty() {
                        EndOid::NextArgument
                    } else {
                        EndOid::Inline(rest.to_string())
                    });
                    return Ok(());
                }
                'n' | 'r' => {
                    let start = i + 1;
                    let mut end = start;
                    while let Some(&(j, c)) = chars.peek() {
                        if !c.is_ascii_digit() && !(j == start && c == '-') {
                            break;
                        }
                        end = j + c.len_utf8();
                        chars.next();
                    }
                    let value = parse_count(flag, &flags[start..end])?;
                    if flag == 'n' {
                        self.bulk.non_repeaters = value;
                    } else {
                        self.bulk.max_repetitions = value;
                    }
                }
                _ => {
                    return Err(Error::usage(UsageErrorKind::InvalidFlag { option: 'C', flag }));
                }
            }
        }
        Ok(())
    }
}

fn parse_count(flag: char, digits: &str) -> Result<u32> {
    let bad = |reason| Error::usage(UsageErrorKind::InvalidFlagArgument { flag, reason });
    if digits.is_empty() {
        return Err(bad("invalid argument"));
    }
    if digits.starts_with('-') {
        return Err(bad("too small argument"));
    }
    // All digits here, so the only failure is overflow
    digits.parse::<u32>().map_err(|_| bad("too large argument"))
}

/// What a command operates on.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// `get`, `getnext`, `bulkget`.
    Objects(Vec<Oid>),
    /// `walk`, `bulkwalk`.
    Subtree(Oid),
    /// `trap`: raw uptime, notification OID and binding arguments.
    Trap {
        uptime: String,
        trap_oid: String,
        bindings: Vec<String>,
    },
    /// `mibtree`.
    None,
}

/// A fully validated invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub command: CommandKind,
    /// Agent specifier; absent for `mibtree`.
    pub agent: Option<String>,
    pub target: Target,
    pub session: SessionConfig,
    pub walk: WalkOptions,
    pub bulk: BulkParams,
    pub output: OutputOptions,
}

impl Config {
    /// Validate positional arguments against the command and fold the flag
    /// settings in.
    pub fn new(
        command: CommandKind,
        session: SessionConfig,
        mut request: RequestOptions,
        output: OutputOptions,
        positionals: &[String],
    ) -> Result<Self> {
        let arity = || Error::usage(UsageErrorKind::Arguments);
        let mut args = positionals;

        if !session.version.supports_v2_pdus() {
            match command {
                CommandKind::BulkGet | CommandKind::BulkWalk => {
                    return Err(Error::usage(UsageErrorKind::V2PduOnV1));
                }
                CommandKind::Trap => return Err(Error::usage(UsageErrorKind::TrapOnV1)),
                _ => {}
            }
        }

        if let Some(end) = request.end.take() {
            let text = match end {
                EndOid::Inline(text) => text,
                EndOid::NextArgument => {
                    let (first, rest) = args.split_first().ok_or_else(arity)?;
                    args = rest;
                    first.clone()
                }
            };
            request.walk.end = Some(mib::resolve(&text)?);
        }

        let (agent, target) = match command {
            CommandKind::MibTree => {
                if !args.is_empty() {
                    return Err(arity());
                }
                (None, Target::None)
            }
            CommandKind::Get | CommandKind::GetNext | CommandKind::BulkGet => {
                let (agent, oids) = args.split_first().ok_or_else(arity)?;
                if oids.is_empty() {
                    return Err(arity());
                }
                let oids = oids
                    .iter()
                    .map(|o| mib::resolve(o))
                    .collect::<Result<Vec<_>>>()?;
                (Some(agent.clone()), Target::Objects(oids))
            }
            CommandKind::Walk | CommandKind::BulkWalk => {
                let root = match args {
                    [_] => mib::resolve("mib_2")?,
                    [_, oid] => mib::resolve(oid)?,
                    _ => return Err(arity()),
                };
                (Some(args[0].clone()), Target::Subtree(root))
            }
            CommandKind::Trap => {
                if args.len() < 3 || (args.len() - 3) % 3 != 0 {
                    return Err(Error::usage(UsageErrorKind::TrapArguments));
                }
                (
                    Some(args[0].clone()),
                    Target::Trap {
                        uptime: args[1].clone(),
                        trap_oid: args[2].clone(),
                        bindings: args[3..].to_vec(),
                    },
                )
            }
        };

        if command == CommandKind::BulkWalk {
            request.walk.bulk = Some(request.bulk);
        }

        Ok(Self {
            command,
            agent,
            target,
            session,
            walk: request.walk,
            bulk: request.bulk,
            output,
        })
    }
}
