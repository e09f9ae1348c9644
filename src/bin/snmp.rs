//! snmp: query SNMP agents and send notifications.

use clap::Parser;
use snmpc::ErrorCategory;
use snmpc::cli::args::Cli;
use snmpc::cli::commands;
use snmpc::cli::output::describe_error;
use snmpc::config::CommandKind;
use snmpc::mib::LookupMode;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: u8) {
    let level = match debug {
        0 => "snmpc=warn",
        1 => "snmpc=debug",
        _ => "snmpc=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(command: CommandKind, lookup: LookupMode, err: &snmpc::Error) {
    let message = describe_error(err, lookup);
    match err.category() {
        ErrorCategory::Transport => eprintln!("snmp: {}: {}", command.name(), message),
        ErrorCategory::Usage => {
            eprintln!("snmp: {}", message);
            eprintln!("{}", command.usage());
        }
        _ => eprintln!("snmp: {}", message),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.command.debug_level());

    let command = cli.command.kind();
    let config = match cli.command.into_config() {
        Ok(config) => config,
        Err(e) => {
            report(command, LookupMode::default(), &e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = std::io::stdout().lock();
    match commands::run(&config, stdout, std::io::stderr()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(command, config.output.lookup, &e);
            ExitCode::FAILURE
        }
    }
}
